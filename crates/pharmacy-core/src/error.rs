//! # Error Types
//!
//! Domain-specific error types for pharmacy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmacy-core errors (this file)                                      │
//! │  ├── CoreError        - Domain failures (not found, bad documents)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pharmacy-db errors (separate crate)                                   │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the operator sees (code + exit status)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! A sale that can only be partly filled is a normal [`SaleOutcome`] with
//! `remaining_unfulfilled > 0`. Callers check the outcome, not an error path.
//!
//! [`SaleOutcome`]: crate::types::SaleOutcome

use chrono::NaiveDate;
use thiserror::Error;

use crate::dates::format_date;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant leaves the Batch Store and Sales Ledger untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No batch with this name has sellable stock.
    ///
    /// ## When This Occurs
    /// - No batch has ever been imported under this name
    /// - Every batch with this name is at quantity 0
    #[error("No sellable stock for medicine: {0}")]
    MedicineNotFound(String),

    /// Delete requested for a `(name, expiry)` pair that does not exist.
    #[error("Batch not found: {name} expiring {}", format_date(*expiry))]
    BatchNotFound { name: String, expiry: NaiveDate },

    /// A legacy JSON document could not be read as a list of records.
    ///
    /// Individual malformed fields are recovered and reported as
    /// diagnostics; this variant is only for documents that are not JSON
    /// arrays of objects at all.
    #[error("Malformed {collection} document: {reason}")]
    MalformedDocument {
        collection: &'static str,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a BatchNotFound error.
    pub fn batch_not_found(name: impl Into<String>, expiry: NaiveDate) -> Self {
        CoreError::BatchNotFound {
            name: name.into(),
            expiry,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Raised before any state is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a date not in dd/mm/yyyy form).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
