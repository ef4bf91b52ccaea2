//! # Legacy Record Codec
//!
//! Reads and writes the flat JSON collections kept by the legacy desktop
//! tool: `data.json` (batches) and `sales.json` (ledger).
//!
//! ## Record Shapes
//! ```text
//! data.json                              sales.json
//! [                                      [
//!   {                                      {
//!     "name": "Paracetamol",                 "name": "Paracetamol",
//!     "expiry": "01/05/2025",                "expiry": "01/05/2025",
//!     "quantity": 10,                        "quantity": 4,
//!     "cost_price": 1000,                    "cost_price": 1000,
//!     "sell_price": 2000,                    "sell_price": 2000,
//!     "import_date": "01/04/2025"            "date": "01/04/2025 09:30:00"
//!   }                                      }
//! ]                                      ]
//! ```
//!
//! ## Best-Effort Loading
//! A malformed field never aborts the load. Each record is decoded on its
//! own and every recovery is reported as a [`LoadDiagnostic`] (and logged
//! with `warn!`):
//!
//! | Problem                               | Recovery            |
//! |---------------------------------------|---------------------|
//! | record is not a readable object       | skipped             |
//! | empty `name`                          | skipped             |
//! | bad or missing batch `expiry`         | skipped             |
//! | bad `import_date`                     | defaulted to absent |
//! | negative batch `quantity`             | clamped to 0        |
//! | batch `quantity` over `MAX_QUANTITY`  | clamped to the cap  |
//! | repeated `(name, expiry)`             | merged (capped)     |
//! | price outside `0..=MAX_UNIT_PRICE`    | clamped into range  |
//! | bad sale `date` / `expiry`            | skipped             |
//! | sale `quantity` outside `1..=MAX`     | skipped             |
//!
//! Only a document that is not a JSON array at all is an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::dates::{format_date, format_timestamp, parse_date, parse_timestamp};
use crate::error::{CoreError, CoreResult};
use crate::inventory::BatchStore;
use crate::ledger::SalesLedger;
use crate::money::Money;
use crate::types::{Batch, SaleRecord, StockChange};
use crate::{MAX_QUANTITY, MAX_UNIT_PRICE};

// =============================================================================
// Wire Models
// =============================================================================

/// A price as found in legacy files: usually an integer, sometimes a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyAmount {
    Whole(i64),
    Fractional(f64),
}

impl LegacyAmount {
    /// Converts to [`Money`], truncating any fractional part.
    pub fn to_money(self) -> Money {
        match self {
            LegacyAmount::Whole(units) => Money::new(units),
            LegacyAmount::Fractional(amount) => Money::from_f64_truncated(amount),
        }
    }
}

impl From<Money> for LegacyAmount {
    fn from(money: Money) -> Self {
        LegacyAmount::Whole(money.units())
    }
}


/// One element of `data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyBatch {
    pub name: String,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub cost_price: Option<LegacyAmount>,
    #[serde(default)]
    pub sell_price: Option<LegacyAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_date: Option<String>,
}

impl From<&Batch> for LegacyBatch {
    fn from(batch: &Batch) -> Self {
        LegacyBatch {
            name: batch.name.clone(),
            expiry: Some(format_date(batch.expiry)),
            quantity: batch.quantity,
            cost_price: Some(batch.cost_price.into()),
            sell_price: Some(batch.sell_price.into()),
            import_date: batch.import_date.map(format_date),
        }
    }
}

/// One element of `sales.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySale {
    pub name: String,
    pub expiry: String,
    pub quantity: i64,
    #[serde(default)]
    pub cost_price: Option<LegacyAmount>,
    #[serde(default)]
    pub sell_price: Option<LegacyAmount>,
    pub date: String,
}

impl From<&SaleRecord> for LegacySale {
    fn from(record: &SaleRecord) -> Self {
        LegacySale {
            name: record.name.clone(),
            expiry: format_date(record.expiry),
            quantity: record.quantity,
            cost_price: Some(record.cost_price.into()),
            sell_price: Some(record.sell_price.into()),
            date: format_timestamp(record.sold_at),
        }
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Which legacy file a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Batches,
    Sales,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Batches => "batches",
            Collection::Sales => "sales",
        }
    }
}

/// What was wrong with a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadIssue {
    Unreadable { reason: String },
    MissingName,
    BadExpiry { value: Option<String> },
    BadImportDate { value: String },
    NegativeQuantity { value: i64 },
    ExcessQuantity { value: i64 },
    PriceOutOfRange { field: String, value: i64 },
    DuplicateBatch,
    BadSaleDate { value: String },
    QuantityOutOfRange { value: i64 },
}

/// What the loader did about an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    Skipped,
    Defaulted,
    Clamped,
    Merged,
}

impl LoadIssue {
    pub fn recovery(&self) -> Recovery {
        match self {
            LoadIssue::BadImportDate { .. } => Recovery::Defaulted,
            LoadIssue::NegativeQuantity { .. }
            | LoadIssue::ExcessQuantity { .. }
            | LoadIssue::PriceOutOfRange { .. } => Recovery::Clamped,
            LoadIssue::DuplicateBatch => Recovery::Merged,
            _ => Recovery::Skipped,
        }
    }
}

/// One observable recovery made while loading a legacy collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDiagnostic {
    pub collection: Collection,
    /// Zero-based position of the record in the source array.
    pub index: usize,
    pub name: Option<String>,
    pub issue: LoadIssue,
}

impl LoadDiagnostic {
    fn new(collection: Collection, index: usize, name: Option<&str>, issue: LoadIssue) -> Self {
        let diagnostic = LoadDiagnostic {
            collection,
            index,
            name: name.map(str::to_string),
            issue,
        };
        warn!(
            collection = collection.as_str(),
            index,
            name = diagnostic.name.as_deref().unwrap_or("-"),
            recovery = ?diagnostic.recovery(),
            "Legacy record recovered: {}",
            diagnostic.describe()
        );
        diagnostic
    }

    pub fn recovery(&self) -> Recovery {
        self.issue.recovery()
    }

    fn describe(&self) -> String {
        match &self.issue {
            LoadIssue::Unreadable { reason } => format!("unreadable record ({})", reason),
            LoadIssue::MissingName => "empty name".to_string(),
            LoadIssue::BadExpiry { value: Some(v) } => format!("bad expiry '{}'", v),
            LoadIssue::BadExpiry { value: None } => "missing expiry".to_string(),
            LoadIssue::BadImportDate { value } => format!("bad import_date '{}'", value),
            LoadIssue::NegativeQuantity { value } => format!("negative quantity {}", value),
            LoadIssue::ExcessQuantity { value } => {
                format!("quantity {} above {}", value, MAX_QUANTITY)
            }
            LoadIssue::PriceOutOfRange { field, value } => {
                format!("{} {} outside 0..={}", field, value, MAX_UNIT_PRICE)
            }
            LoadIssue::DuplicateBatch => "duplicate (name, expiry)".to_string(),
            LoadIssue::BadSaleDate { value } => format!("bad sale date '{}'", value),
            LoadIssue::QuantityOutOfRange { value } => {
                format!("quantity {} outside 1..={}", value, MAX_QUANTITY)
            }
        }
    }
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recovery = match self.recovery() {
            Recovery::Skipped => "skipped",
            Recovery::Defaulted => "defaulted",
            Recovery::Clamped => "clamped",
            Recovery::Merged => "merged",
        };
        write!(
            f,
            "{} #{} ({}): {}, {}",
            self.collection.as_str(),
            self.index,
            self.name.as_deref().unwrap_or("-"),
            self.describe(),
            recovery
        )
    }
}

/// A decoded collection plus the recoveries made while decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Vec<LoadDiagnostic>,
}

// =============================================================================
// Decoding
// =============================================================================

fn split_document(collection: Collection, json: &str) -> CoreResult<Vec<serde_json::Value>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<serde_json::Value>>(json).map_err(|e| {
        CoreError::MalformedDocument {
            collection: collection.as_str(),
            reason: e.to_string(),
        }
    })
}

fn record_name(value: &serde_json::Value) -> Option<&str> {
    value.get("name").and_then(serde_json::Value::as_str)
}

/// Reads an optional price, clamping it into `0..=MAX_UNIT_PRICE`.
fn bounded_price(
    collection: Collection,
    index: usize,
    name: &str,
    field: &str,
    amount: Option<LegacyAmount>,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> Money {
    let units = amount.map(LegacyAmount::to_money).unwrap_or_default().units();
    let bounded = units.clamp(0, MAX_UNIT_PRICE);
    if bounded != units {
        diagnostics.push(LoadDiagnostic::new(
            collection,
            index,
            Some(name),
            LoadIssue::PriceOutOfRange {
                field: field.to_string(),
                value: units,
            },
        ));
    }
    Money::new(bounded)
}

/// Decodes `data.json` into a [`BatchStore`].
///
/// ## Example
/// ```rust
/// use pharmacy_core::legacy::decode_batches;
///
/// let json = r#"[
///   {"name": "A", "expiry": "01/05/2025", "quantity": 3, "cost_price": 10, "sell_price": 20},
///   {"name": "B", "expiry": "2025-05-01", "quantity": 3}
/// ]"#;
/// let decoded = decode_batches(json).unwrap();
/// assert_eq!(decoded.value.len(), 1);
/// assert_eq!(decoded.diagnostics.len(), 1);
/// ```
pub fn decode_batches(json: &str) -> CoreResult<Decoded<BatchStore>> {
    const C: Collection = Collection::Batches;

    let mut store = BatchStore::new();
    let mut diagnostics = Vec::new();

    for (index, value) in split_document(C, json)?.into_iter().enumerate() {
        let name_hint = record_name(&value).map(str::to_string);
        let raw: LegacyBatch = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                diagnostics.push(LoadDiagnostic::new(
                    C,
                    index,
                    name_hint.as_deref(),
                    LoadIssue::Unreadable {
                        reason: e.to_string(),
                    },
                ));
                continue;
            }
        };

        let name = raw.name.trim();
        if name.is_empty() {
            diagnostics.push(LoadDiagnostic::new(C, index, None, LoadIssue::MissingName));
            continue;
        }

        let expiry = match raw.expiry.as_deref().map(|v| parse_date("expiry", v)) {
            Some(Ok(expiry)) => expiry,
            _ => {
                diagnostics.push(LoadDiagnostic::new(
                    C,
                    index,
                    Some(name),
                    LoadIssue::BadExpiry {
                        value: raw.expiry.clone(),
                    },
                ));
                continue;
            }
        };

        let import_date = match raw.import_date.as_deref() {
            None => None,
            Some(v) => match parse_date("import_date", v) {
                Ok(d) => Some(d),
                Err(_) => {
                    diagnostics.push(LoadDiagnostic::new(
                        C,
                        index,
                        Some(name),
                        LoadIssue::BadImportDate {
                            value: v.to_string(),
                        },
                    ));
                    None
                }
            },
        };

        let quantity = if raw.quantity < 0 {
            diagnostics.push(LoadDiagnostic::new(
                C,
                index,
                Some(name),
                LoadIssue::NegativeQuantity {
                    value: raw.quantity,
                },
            ));
            0
        } else if raw.quantity > MAX_QUANTITY {
            diagnostics.push(LoadDiagnostic::new(
                C,
                index,
                Some(name),
                LoadIssue::ExcessQuantity {
                    value: raw.quantity,
                },
            ));
            MAX_QUANTITY
        } else {
            raw.quantity
        };

        let cost_price =
            bounded_price(C, index, name, "cost_price", raw.cost_price, &mut diagnostics);
        let sell_price =
            bounded_price(C, index, name, "sell_price", raw.sell_price, &mut diagnostics);

        let merged_total = store.merged_quantity(name, expiry, quantity);
        let batch = Batch {
            name: name.to_string(),
            expiry,
            quantity,
            cost_price,
            sell_price,
            import_date,
        };

        if let (StockChange::Merged, _) = store.absorb(batch) {
            diagnostics.push(LoadDiagnostic::new(
                C,
                index,
                Some(name),
                LoadIssue::DuplicateBatch,
            ));
            if merged_total > MAX_QUANTITY {
                diagnostics.push(LoadDiagnostic::new(
                    C,
                    index,
                    Some(name),
                    LoadIssue::ExcessQuantity {
                        value: merged_total,
                    },
                ));
            }
        }
    }

    Ok(Decoded {
        value: store,
        diagnostics,
    })
}

/// Decodes `sales.json` into a [`SalesLedger`].
///
/// Legacy rows carry no identifier, so each accepted row gets a fresh UUID.
pub fn decode_sales(json: &str) -> CoreResult<Decoded<SalesLedger>> {
    const C: Collection = Collection::Sales;

    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, value) in split_document(C, json)?.into_iter().enumerate() {
        let name_hint = record_name(&value).map(str::to_string);
        let raw: LegacySale = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                diagnostics.push(LoadDiagnostic::new(
                    C,
                    index,
                    name_hint.as_deref(),
                    LoadIssue::Unreadable {
                        reason: e.to_string(),
                    },
                ));
                continue;
            }
        };

        let name = raw.name.trim();
        if name.is_empty() {
            diagnostics.push(LoadDiagnostic::new(C, index, None, LoadIssue::MissingName));
            continue;
        }

        let Ok(expiry) = parse_date("expiry", &raw.expiry) else {
            diagnostics.push(LoadDiagnostic::new(
                C,
                index,
                Some(name),
                LoadIssue::BadExpiry {
                    value: Some(raw.expiry.clone()),
                },
            ));
            continue;
        };

        let Ok(sold_at) = parse_timestamp("date", &raw.date) else {
            diagnostics.push(LoadDiagnostic::new(
                C,
                index,
                Some(name),
                LoadIssue::BadSaleDate {
                    value: raw.date.clone(),
                },
            ));
            continue;
        };

        if !(1..=MAX_QUANTITY).contains(&raw.quantity) {
            diagnostics.push(LoadDiagnostic::new(
                C,
                index,
                Some(name),
                LoadIssue::QuantityOutOfRange {
                    value: raw.quantity,
                },
            ));
            continue;
        }

        let cost_price =
            bounded_price(C, index, name, "cost_price", raw.cost_price, &mut diagnostics);
        let sell_price =
            bounded_price(C, index, name, "sell_price", raw.sell_price, &mut diagnostics);

        records.push(SaleRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            expiry,
            quantity: raw.quantity,
            cost_price,
            sell_price,
            sold_at,
        });
    }

    Ok(Decoded {
        value: SalesLedger::from_records(records),
        diagnostics,
    })
}

// =============================================================================
// Encoding
// =============================================================================

fn to_pretty<T: Serialize>(collection: Collection, rows: &[T]) -> CoreResult<String> {
    serde_json::to_string_pretty(rows).map_err(|e| CoreError::MalformedDocument {
        collection: collection.as_str(),
        reason: e.to_string(),
    })
}

/// Encodes batches in storage order as a pretty `data.json` document.
pub fn encode_batches(store: &BatchStore) -> CoreResult<String> {
    let rows: Vec<LegacyBatch> = store.batches().iter().map(LegacyBatch::from).collect();
    to_pretty(Collection::Batches, &rows)
}

/// Encodes the ledger in append order as a pretty `sales.json` document.
pub fn encode_sales(ledger: &SalesLedger) -> CoreResult<String> {
    let rows: Vec<LegacySale> = ledger.all().iter().map(LegacySale::from).collect();
    to_pretty(Collection::Sales, &rows)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_decode_well_formed_batches() {
        let json = r#"[
            {"name": "Paracetamol", "expiry": "01/05/2025", "quantity": 10,
             "cost_price": 1000, "sell_price": 2000, "import_date": "01/04/2025"},
            {"name": "Vitamin C", "expiry": "31/12/2026", "quantity": 0,
             "cost_price": 500.75, "sell_price": 900}
        ]"#;

        let decoded = decode_batches(json).unwrap();
        assert!(decoded.diagnostics.is_empty());

        let batches = decoded.value.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].import_date, Some(date(1, 4, 2025)));
        assert_eq!(batches[1].cost_price, Money::new(500));
        assert_eq!(batches[1].import_date, None);
    }

    #[test]
    fn test_missing_prices_default_to_zero() {
        let json = r#"[{"name": "X", "expiry": "01/01/2026", "quantity": 2, "sell_price": null}]"#;
        let decoded = decode_batches(json).unwrap();
        let batch = &decoded.value.batches()[0];
        assert_eq!(batch.cost_price, Money::zero());
        assert_eq!(batch.sell_price, Money::zero());
    }

    #[test]
    fn test_batch_recoveries_are_reported() {
        let json = r#"[
            {"name": "Bad expiry", "expiry": "2025/01/01", "quantity": 1},
            {"name": "No expiry", "quantity": 1},
            {"name": "Bad import", "expiry": "01/01/2026", "quantity": 1, "import_date": "yesterday"},
            {"name": "Negative", "expiry": "01/01/2026", "quantity": -4},
            {"name": "Dup", "expiry": "01/01/2026", "quantity": 1, "sell_price": 10},
            {"name": "Dup", "expiry": "01/01/2026", "quantity": 2, "sell_price": 20},
            {"name": "", "expiry": "01/01/2026", "quantity": 1},
            "not an object"
        ]"#;

        let decoded = decode_batches(json).unwrap();
        let issues: Vec<_> = decoded
            .diagnostics
            .iter()
            .map(|d| (d.index, d.recovery()))
            .collect();

        assert_eq!(
            issues,
            vec![
                (0, Recovery::Skipped),
                (1, Recovery::Skipped),
                (2, Recovery::Defaulted),
                (3, Recovery::Clamped),
                (5, Recovery::Merged),
                (6, Recovery::Skipped),
                (7, Recovery::Skipped),
            ]
        );

        let store = decoded.value;
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("Bad import", date(1, 1, 2026)).unwrap().import_date, None);
        assert_eq!(store.get("Negative", date(1, 1, 2026)).unwrap().quantity, 0);

        let dup = store.get("Dup", date(1, 1, 2026)).unwrap();
        assert_eq!(dup.quantity, 3);
        assert_eq!(dup.sell_price, Money::new(20));
    }

    #[test]
    fn test_decode_sales() {
        let json = r#"[
            {"name": "A", "expiry": "01/05/2025", "quantity": 4, "cost_price": 1000,
             "sell_price": 1500, "date": "14/03/2025 08:05:09"},
            {"name": "B", "expiry": "01/05/2025", "quantity": 1, "date": "14/03/2025"},
            {"name": "C", "expiry": "01/05/2025", "quantity": 0, "date": "14/03/2025 08:05:09"},
            {"name": "D", "expiry": "bad", "quantity": 1, "date": "14/03/2025 08:05:09"}
        ]"#;

        let decoded = decode_sales(json).unwrap();
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.diagnostics.len(), 3);
        assert!(decoded
            .diagnostics
            .iter()
            .all(|d| d.recovery() == Recovery::Skipped && d.collection == Collection::Sales));

        let record = &decoded.value.all()[0];
        assert_eq!(record.quantity, 4);
        assert_eq!(format_timestamp(record.sold_at), "14/03/2025 08:05:09");
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_oversized_batch_rows_are_capped_and_reported() {
        let json = r#"[
            {"name": "A", "expiry": "01/05/2030", "quantity": 9223372036854775807},
            {"name": "A", "expiry": "01/05/2030", "quantity": 5},
            {"name": "B", "expiry": "01/05/2030", "quantity": 60000000},
            {"name": "B", "expiry": "01/05/2030", "quantity": 60000000},
            {"name": "C", "expiry": "01/05/2030", "quantity": 1,
             "cost_price": -50, "sell_price": 1e18}
        ]"#;

        let decoded = decode_batches(json).unwrap();
        let issues: Vec<_> = decoded
            .diagnostics
            .iter()
            .map(|d| (d.index, d.issue.clone()))
            .collect();

        assert_eq!(
            issues,
            vec![
                (0, LoadIssue::ExcessQuantity { value: i64::MAX }),
                (1, LoadIssue::DuplicateBatch),
                (1, LoadIssue::ExcessQuantity { value: MAX_QUANTITY + 5 }),
                (3, LoadIssue::DuplicateBatch),
                (3, LoadIssue::ExcessQuantity { value: 120_000_000 }),
                (
                    4,
                    LoadIssue::PriceOutOfRange {
                        field: "cost_price".to_string(),
                        value: -50
                    }
                ),
                (
                    4,
                    LoadIssue::PriceOutOfRange {
                        field: "sell_price".to_string(),
                        value: 1_000_000_000_000_000_000
                    }
                ),
            ]
        );
        assert!(decoded.diagnostics[0].to_string().ends_with("clamped"));

        let store = decoded.value;
        assert_eq!(store.get("A", date(1, 5, 2030)).unwrap().quantity, MAX_QUANTITY);
        assert_eq!(store.get("B", date(1, 5, 2030)).unwrap().quantity, MAX_QUANTITY);

        let c = store.get("C", date(1, 5, 2030)).unwrap();
        assert_eq!(c.cost_price, Money::zero());
        assert_eq!(c.sell_price, Money::new(MAX_UNIT_PRICE));
    }

    #[test]
    fn test_oversized_sale_rows_keep_totals_finite() {
        let json = r#"[
            {"name": "A", "expiry": "01/05/2025", "quantity": 100, "sell_price": 1e18,
             "date": "14/03/2025 08:05:09"},
            {"name": "B", "expiry": "01/05/2025", "quantity": 9223372036854775807,
             "date": "14/03/2025 08:05:09"}
        ]"#;

        let decoded = decode_sales(json).unwrap();
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(
            decoded.diagnostics[0].issue,
            LoadIssue::PriceOutOfRange {
                field: "sell_price".to_string(),
                value: 1_000_000_000_000_000_000
            }
        );
        assert_eq!(decoded.diagnostics[0].recovery(), Recovery::Clamped);
        assert_eq!(
            decoded.diagnostics[1].issue,
            LoadIssue::QuantityOutOfRange { value: i64::MAX }
        );
        assert_eq!(decoded.diagnostics[1].recovery(), Recovery::Skipped);

        let profit = crate::report::total_profit(decoded.value.all());
        assert_eq!(profit, Money::new(100 * MAX_UNIT_PRICE));
    }

    #[test]
    fn test_document_must_be_an_array() {
        let err = decode_batches(r#"{"name": "A"}"#).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MalformedDocument {
                collection: "batches",
                ..
            }
        ));
        assert!(decode_sales("[").is_err());
    }

    #[test]
    fn test_empty_document_is_empty_collection() {
        assert!(decode_batches("").unwrap().value.is_empty());
        assert!(decode_sales("  \n").unwrap().value.is_empty());
        assert!(decode_sales("[]").unwrap().value.is_empty());
    }

    #[test]
    fn test_encode_batches_format() {
        let store = BatchStore::from_batches(vec![Batch {
            name: "Thuốc ho".to_string(),
            expiry: date(1, 5, 2025),
            quantity: 10,
            cost_price: Money::new(1000),
            sell_price: Money::new(2000),
            import_date: Some(date(1, 4, 2025)),
        }]);

        let json = encode_batches(&store).unwrap();
        assert!(json.contains("\"expiry\": \"01/05/2025\""));
        assert!(json.contains("\"cost_price\": 1000"));
        assert!(json.contains("\"import_date\": \"01/04/2025\""));
        // non-ASCII is written as-is
        assert!(json.contains("Thuốc ho"));
        assert!(json.starts_with("[\n  {"));

        let back = decode_batches(&json).unwrap();
        assert!(back.diagnostics.is_empty());
        assert_eq!(back.value, store);
    }

    #[test]
    fn test_encode_sales_format() {
        let ledger = SalesLedger::from_records(vec![SaleRecord {
            id: "ignored".to_string(),
            name: "A".to_string(),
            expiry: date(1, 5, 2025),
            quantity: 2,
            cost_price: Money::new(10),
            sell_price: Money::new(20),
            sold_at: date(2, 4, 2025).and_hms_opt(7, 8, 9).unwrap(),
        }]);

        let json = encode_sales(&ledger).unwrap();
        assert!(json.contains("\"date\": \"02/04/2025 07:08:09\""));
        assert!(!json.contains("ignored"));
    }
}
