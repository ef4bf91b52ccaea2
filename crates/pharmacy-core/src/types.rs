//! # Domain Types
//!
//! Core domain types used throughout the stock tracker.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Batch       │   │   SaleRecord    │   │   SaleOutcome   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name  ┐ key    │   │  id (UUID)      │   │  sold_total     │       │
//! │  │  expiry┘        │──►│  name, expiry   │◄──│  remaining_     │       │
//! │  │  quantity       │   │  quantity       │   │   unfulfilled   │       │
//! │  │  cost/sell      │   │  cost/sell      │   │  records        │       │
//! │  │  import_date    │   │  sold_at        │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ExpiryRisk    │   │  InventoryOrder │   │     Window      │       │
//! │  │  Expired        │   │  RiskPriority   │   │  All / Today    │       │
//! │  │  Critical       │   │  Expiry         │   │  ThisWeek       │       │
//! │  │  Warning        │   └─────────────────┘   │  ThisMonth      │       │
//! │  │  Normal         │                         │  ThisYear       │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `SaleRecord` copies the batch's name, expiry and prices at the moment
//! of sale. Later price changes on the batch never rewrite history.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::validation::{validate_medicine_name, validate_price, validate_quantity};

// =============================================================================
// Batch
// =============================================================================

/// A quantity of one medicine received with one expiry date.
///
/// `(name, expiry)` is the identity of a batch; the Batch Store never holds
/// two batches with the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Medicine name as entered on import.
    pub name: String,

    /// Expiry date (no time component).
    pub expiry: NaiveDate,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Unit cost.
    pub cost_price: Money,

    /// Unit sale price.
    pub sell_price: Money,

    /// Date the batch was first created. Absent for legacy rows that never
    /// recorded it.
    pub import_date: Option<NaiveDate>,
}

impl Batch {
    /// Returns true if this batch has the given identity.
    #[inline]
    pub fn is_keyed(&self, name: &str, expiry: NaiveDate) -> bool {
        self.name == name && self.expiry == expiry
    }

    /// Case-insensitive name comparison used for selling. Surrounding
    /// whitespace in `name` is ignored.
    #[inline]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Returns true if at least one unit can be sold from this batch.
    #[inline]
    pub fn is_sellable(&self) -> bool {
        self.quantity > 0
    }

    /// Whole days from `today` until expiry (negative once expired).
    #[inline]
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.expiry - today).num_days()
    }

    /// Expiry-risk bucket as of `today`.
    #[inline]
    pub fn risk(&self, today: NaiveDate) -> ExpiryRisk {
        ExpiryRisk::from_days_left(self.days_left(today))
    }

    /// Returns true if `quantity <= threshold`.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.quantity <= threshold
    }

    /// Value of the units on hand at cost.
    #[inline]
    pub fn value_at_cost(&self) -> Money {
        self.cost_price.multiply_quantity(self.quantity)
    }

    /// Value of the units on hand at sale price.
    #[inline]
    pub fn value_at_sale(&self) -> Money {
        self.sell_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// New Stock (add_stock input)
// =============================================================================

/// Operator input for an "add stock" intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStock {
    pub name: String,
    pub expiry: NaiveDate,
    pub quantity: i64,
    pub cost_price: Money,
    pub sell_price: Money,
}

impl NewStock {
    /// Validates the input and returns it with the name trimmed.
    ///
    /// ## Rules
    /// - name: non-empty after trimming, at most 200 characters
    /// - quantity: 1 ..= 100,000,000
    /// - prices: 0 ..= 100,000,000 (free samples are allowed)
    pub fn validated(self) -> Result<NewStock, ValidationError> {
        let name = validate_medicine_name(&self.name)?;
        validate_quantity(self.quantity)?;
        validate_price("cost_price", self.cost_price)?;
        validate_price("sell_price", self.sell_price)?;

        Ok(NewStock { name, ..self })
    }
}

// =============================================================================
// Upsert Result
// =============================================================================

/// What `upsert_batch` did with an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChange {
    /// A new `(name, expiry)` batch was inserted.
    Inserted,
    /// Quantity was added to an existing batch and its prices replaced.
    Merged,
}

/// The batch state after an upsert, plus how it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upserted {
    pub change: StockChange,
    pub batch: Batch,
}

// =============================================================================
// Sale Record
// =============================================================================

/// An immutable fact: `quantity` units of one batch were sold at `sold_at`.
///
/// Created only by the allocation engine, one per batch touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Batch name at time of sale (frozen).
    pub name: String,

    /// Batch expiry at time of sale (frozen).
    pub expiry: NaiveDate,

    /// Units taken from the batch.
    pub quantity: i64,

    /// Unit cost at time of sale (frozen).
    pub cost_price: Money,

    /// Unit sale price at time of sale (frozen).
    pub sell_price: Money,

    /// When the sale happened (local wall-clock time).
    pub sold_at: NaiveDateTime,
}

impl SaleRecord {
    /// Snapshots `batch` into a record for `quantity` units sold at `sold_at`.
    pub fn from_batch(batch: &Batch, quantity: i64, sold_at: NaiveDateTime) -> Self {
        SaleRecord {
            id: Uuid::new_v4().to_string(),
            name: batch.name.clone(),
            expiry: batch.expiry,
            quantity,
            cost_price: batch.cost_price,
            sell_price: batch.sell_price,
            sold_at,
        }
    }

    /// Revenue of this line (sell price × quantity).
    #[inline]
    pub fn revenue(&self) -> Money {
        self.sell_price.multiply_quantity(self.quantity)
    }

    /// Cost of goods for this line (cost price × quantity).
    #[inline]
    pub fn cost(&self) -> Money {
        self.cost_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Outcome
// =============================================================================

/// Result of a `sell` request that found at least one sellable batch.
///
/// ## Three Distinguishable Results
/// ```text
/// sell("X", n)
///   ├── Err(MedicineNotFound)            nothing found, nothing changed
///   ├── Ok(outcome) remaining == 0        fully sold
///   └── Ok(outcome) remaining  > 0        partially sold ← MUST be checked
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleOutcome {
    /// Units actually sold across all batches.
    pub sold_total: i64,

    /// Units requested but not available.
    pub remaining_unfulfilled: i64,

    /// One record per batch touched, in FEFO order.
    pub records: Vec<SaleRecord>,
}

impl SaleOutcome {
    /// Returns true if the full requested quantity was sold.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remaining_unfulfilled == 0
    }

    /// Returns true if only part of the request could be filled.
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.remaining_unfulfilled > 0
    }

    /// The quantity originally requested.
    #[inline]
    pub fn requested(&self) -> i64 {
        self.sold_total + self.remaining_unfulfilled
    }
}

// =============================================================================
// Expiry Risk
// =============================================================================

/// Expiry-risk bucket used for the default inventory display order.
///
/// ## Buckets
/// | days_left     | bucket   |
/// |---------------|----------|
/// | `< 0`         | Expired  |
/// | `0 ..= 3`     | Critical |
/// | `4 ..= 7`     | Warning  |
/// | `> 7`         | Normal   |
///
/// Variants are declared in priority order so the derived `Ord` sorts the
/// most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryRisk {
    Expired,
    Critical,
    Warning,
    Normal,
}

impl ExpiryRisk {
    /// Buckets a days-until-expiry value.
    pub fn from_days_left(days_left: i64) -> Self {
        match days_left {
            d if d < 0 => ExpiryRisk::Expired,
            0..=3 => ExpiryRisk::Critical,
            4..=7 => ExpiryRisk::Warning,
            _ => ExpiryRisk::Normal,
        }
    }

    /// Numeric priority (0 = most urgent).
    #[inline]
    pub fn priority(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for ExpiryRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryRisk::Expired => write!(f, "expired"),
            ExpiryRisk::Critical => write!(f, "critical"),
            ExpiryRisk::Warning => write!(f, "warning"),
            ExpiryRisk::Normal => write!(f, "normal"),
        }
    }
}

// =============================================================================
// Inventory Views
// =============================================================================

/// Display ordering for the inventory list. Storage order is never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryOrder {
    /// Risk bucket ascending, then expiry ascending.
    #[default]
    RiskPriority,
    /// Plain expiry ascending.
    Expiry,
}

impl std::fmt::Display for InventoryOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryOrder::RiskPriority => write!(f, "risk"),
            InventoryOrder::Expiry => write!(f, "expiry"),
        }
    }
}

impl std::str::FromStr for InventoryOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "risk" | "risk_priority" | "priority" => Ok(InventoryOrder::RiskPriority),
            "expiry" | "fefo" => Ok(InventoryOrder::Expiry),
            other => Err(ValidationError::InvalidFormat {
                field: "order".to_string(),
                reason: format!("unknown order '{}', expected risk or expiry", other),
            }
            .into()),
        }
    }
}

/// One row of the inventory list: the batch plus its computed indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub batch: Batch,
    pub days_left: i64,
    pub risk: ExpiryRisk,
    pub low_stock: bool,
}

impl InventoryItem {
    /// Computes the indicators for `batch` as of `today`.
    pub fn new(batch: &Batch, today: NaiveDate, low_stock_threshold: i64) -> Self {
        InventoryItem {
            batch: batch.clone(),
            days_left: batch.days_left(today),
            risk: batch.risk(today),
            low_stock: batch.is_low_stock(low_stock_threshold),
        }
    }
}

// =============================================================================
// Reporting Window
// =============================================================================

/// Named time range used to filter the sales ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    #[default]
    All,
    /// Same calendar date as `now`.
    Today,
    /// Same ISO week number and same calendar year as `now`.
    ThisWeek,
    /// Same month and year as `now`.
    ThisMonth,
    /// Same year as `now`.
    ThisYear,
}

impl Window {
    /// Returns true if a sale at `at` falls inside this window relative to
    /// `now`.
    ///
    /// `ThisWeek` pairs the ISO week number with the *calendar* year, so a
    /// sale on Monday 30/12/2024 (ISO week 1 of 2025) is not counted in
    /// "this week" on Thursday 02/01/2025.
    pub fn contains(&self, at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Window::All => true,
            Window::Today => at.date() == now.date(),
            Window::ThisWeek => {
                at.iso_week().week() == now.iso_week().week() && at.year() == now.year()
            }
            Window::ThisMonth => at.month() == now.month() && at.year() == now.year(),
            Window::ThisYear => at.year() == now.year(),
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Window::All => write!(f, "all"),
            Window::Today => write!(f, "today"),
            Window::ThisWeek => write!(f, "this_week"),
            Window::ThisMonth => write!(f, "this_month"),
            Window::ThisYear => write!(f, "this_year"),
        }
    }
}

impl std::str::FromStr for Window {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Window::All),
            "today" | "day" => Ok(Window::Today),
            "this_week" | "week" => Ok(Window::ThisWeek),
            "this_month" | "month" => Ok(Window::ThisMonth),
            "this_year" | "year" => Ok(Window::ThisYear),
            other => Err(ValidationError::InvalidFormat {
                field: "window".to_string(),
                reason: format!(
                    "unknown window '{}', expected all, today, this_week, this_month or this_year",
                    other
                ),
            }
            .into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: u32, m: u32, y: i32) -> NaiveDateTime {
        date(d, m, y).and_hms_opt(12, 0, 0).unwrap()
    }

    fn batch(quantity: i64) -> Batch {
        Batch {
            name: "Paracetamol".to_string(),
            expiry: date(1, 5, 2025),
            quantity,
            cost_price: Money::new(1000),
            sell_price: Money::new(2000),
            import_date: None,
        }
    }

    #[test]
    fn test_risk_buckets() {
        assert_eq!(ExpiryRisk::from_days_left(-1), ExpiryRisk::Expired);
        assert_eq!(ExpiryRisk::from_days_left(0), ExpiryRisk::Critical);
        assert_eq!(ExpiryRisk::from_days_left(3), ExpiryRisk::Critical);
        assert_eq!(ExpiryRisk::from_days_left(4), ExpiryRisk::Warning);
        assert_eq!(ExpiryRisk::from_days_left(7), ExpiryRisk::Warning);
        assert_eq!(ExpiryRisk::from_days_left(8), ExpiryRisk::Normal);

        assert_eq!(ExpiryRisk::Expired.priority(), 0);
        assert_eq!(ExpiryRisk::Normal.priority(), 3);
        assert!(ExpiryRisk::Expired < ExpiryRisk::Critical);
    }

    #[test]
    fn test_batch_days_left_and_risk() {
        let b = batch(10);
        assert_eq!(b.days_left(date(28, 4, 2025)), 3);
        assert_eq!(b.risk(date(28, 4, 2025)), ExpiryRisk::Critical);
        assert_eq!(b.risk(date(1, 5, 2025)), ExpiryRisk::Critical);
        assert_eq!(b.risk(date(2, 5, 2025)), ExpiryRisk::Expired);
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        assert!(batch(5).is_low_stock(5));
        assert!(batch(0).is_low_stock(5));
        assert!(!batch(6).is_low_stock(5));
    }

    #[test]
    fn test_matches_name_ignores_case() {
        let b = batch(1);
        assert!(b.matches_name("PARACETAMOL"));
        assert!(b.matches_name("  paracetamol "));
        assert!(!b.matches_name("Paracetamol 500"));
        assert!(b.is_keyed("Paracetamol", date(1, 5, 2025)));
        assert!(!b.is_keyed("paracetamol", date(1, 5, 2025)));
    }

    #[test]
    fn test_new_stock_validation() {
        let ok = NewStock {
            name: "  Amoxicillin ".to_string(),
            expiry: date(1, 1, 2026),
            quantity: 5,
            cost_price: Money::new(0),
            sell_price: Money::new(1500),
        }
        .validated()
        .unwrap();
        assert_eq!(ok.name, "Amoxicillin");

        let empty = NewStock {
            name: "   ".to_string(),
            ..ok.clone()
        };
        assert!(empty.validated().is_err());

        let zero_qty = NewStock {
            quantity: 0,
            ..ok.clone()
        };
        assert!(zero_qty.validated().is_err());

        let negative_price = NewStock {
            sell_price: Money::new(-1),
            ..ok
        };
        assert!(negative_price.validated().is_err());
    }

    #[test]
    fn test_sale_record_snapshot() {
        let b = batch(10);
        let record = SaleRecord::from_batch(&b, 4, at(1, 4, 2025));
        assert_eq!(record.name, "Paracetamol");
        assert_eq!(record.quantity, 4);
        assert_eq!(record.revenue(), Money::new(8000));
        assert_eq!(record.cost(), Money::new(4000));
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_outcome_flags() {
        let outcome = SaleOutcome {
            sold_total: 3,
            remaining_unfulfilled: 2,
            records: vec![],
        };
        assert!(outcome.is_partial());
        assert!(!outcome.is_complete());
        assert_eq!(outcome.requested(), 5);
    }

    #[test]
    fn test_window_month_boundary() {
        let now = at(10, 6, 2025);
        assert!(!Window::ThisMonth.contains(at(31, 5, 2025), now));
        assert!(Window::ThisMonth.contains(at(1, 6, 2025), now));
        assert!(!Window::ThisMonth.contains(at(1, 6, 2024), now));
    }

    #[test]
    fn test_window_today_and_year() {
        let now = at(10, 6, 2025);
        let morning = date(10, 6, 2025).and_hms_opt(0, 0, 1).unwrap();
        assert!(Window::Today.contains(morning, now));
        assert!(!Window::Today.contains(at(9, 6, 2025), now));
        assert!(Window::ThisYear.contains(at(1, 1, 2025), now));
        assert!(!Window::ThisYear.contains(at(31, 12, 2024), now));
        assert!(Window::All.contains(at(1, 1, 1999), now));
    }

    #[test]
    fn test_window_week_uses_iso_week_and_calendar_year() {
        // Mon 09/06/2025 .. Sun 15/06/2025 is ISO week 24
        let now = at(12, 6, 2025);
        assert!(Window::ThisWeek.contains(at(9, 6, 2025), now));
        assert!(Window::ThisWeek.contains(at(15, 6, 2025), now));
        assert!(!Window::ThisWeek.contains(at(8, 6, 2025), now));
        // Same ISO week number one year earlier
        assert!(!Window::ThisWeek.contains(at(12, 6, 2024), now));

        // Year edge: 30/12/2024 is ISO week 1 of 2025 but calendar year 2024
        let new_year = at(2, 1, 2025);
        assert!(!Window::ThisWeek.contains(at(30, 12, 2024), new_year));
    }

    #[test]
    fn test_window_parsing() {
        assert_eq!("all".parse::<Window>().unwrap(), Window::All);
        assert_eq!("this-week".parse::<Window>().unwrap(), Window::ThisWeek);
        assert_eq!("MONTH".parse::<Window>().unwrap(), Window::ThisMonth);
        assert!("fortnight".parse::<Window>().is_err());
        assert_eq!(Window::ThisYear.to_string(), "this_year");
    }

    #[test]
    fn test_inventory_order_parsing() {
        assert_eq!(
            "risk".parse::<InventoryOrder>().unwrap(),
            InventoryOrder::RiskPriority
        );
        assert_eq!(
            "fefo".parse::<InventoryOrder>().unwrap(),
            InventoryOrder::Expiry
        );
        assert!("name".parse::<InventoryOrder>().is_err());
        assert_eq!(InventoryOrder::default(), InventoryOrder::RiskPriority);
    }
}
