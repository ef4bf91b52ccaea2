//! # Validation Module
//!
//! Input validation for operator-entered stock and sale data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI (clap)                                                   │
//! │  ├── Type parsing (integers, dd/mm/yyyy dates)                         │
//! │  └── Immediate usage errors                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Pharmacy facade                                              │
//! │  └── THIS MODULE: business rules, before any state is touched          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0) on batches                                  │
//! │  └── UNIQUE (name, expiry)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_NAME_LENGTH, MAX_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a medicine name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use pharmacy_core::validation::validate_medicine_name;
///
/// assert_eq!(validate_medicine_name(" Aspirin ").unwrap(), "Aspirin");
/// assert!(validate_medicine_name("").is_err());
/// ```
pub fn validate_medicine_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock or sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_QUANTITY`]
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  pharmacy sell "Paracetamol" 0                                          │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(0) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0?          → "quantity must be positive"             │
/// │       ├── qty > 100,000,000? → "quantity must be between ..."          │
/// │       └── OK → allocation runs                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (zero is allowed for free samples)
/// - Must not exceed [`MAX_UNIT_PRICE`]
///
/// ## Example
/// ```rust
/// use pharmacy_core::money::Money;
/// use pharmacy_core::validation::validate_price;
///
/// assert!(validate_price("sell_price", Money::new(0)).is_ok());
/// assert!(validate_price("sell_price", Money::new(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.units() > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
