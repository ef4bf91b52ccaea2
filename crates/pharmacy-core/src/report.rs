//! # Valuation / Reporting
//!
//! Profit and stock-value arithmetic over the ledger and the Batch Store.
//!
//! ## Profit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SalesLedger ──filter_by_window──► &[SaleRecord]                       │
//! │                                         │                               │
//! │                            profit_of(r) = (sell − cost) × qty           │
//! │                                         │                               │
//! │                                         ▼                               │
//! │                                  total_profit  (Σ, 0 when empty)        │
//! │                                         │                               │
//! │                                         ▼                               │
//! │                                 format_currency → "2.000"               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Profit is never clamped: a sale below cost is a negative value.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Batch, SaleRecord, Window};

// =============================================================================
// Profit
// =============================================================================

/// Profit of a single ledger line: `(sell_price − cost_price) × quantity`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use pharmacy_core::{report::profit_of, Money, SaleRecord};
///
/// let record = SaleRecord {
///     id: "1".into(),
///     name: "X".into(),
///     expiry: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     quantity: 4,
///     cost_price: Money::new(1000),
///     sell_price: Money::new(1500),
///     sold_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
/// };
/// assert_eq!(profit_of(&record), Money::new(2000));
/// ```
pub fn profit_of(record: &SaleRecord) -> Money {
    (record.sell_price - record.cost_price).multiply_quantity(record.quantity)
}

/// Sum of [`profit_of`] over `records`. Zero for an empty sequence.
pub fn total_profit<'a>(records: impl IntoIterator<Item = &'a SaleRecord>) -> Money {
    records.into_iter().map(profit_of).sum()
}

/// Formats an amount with `.` thousands separators and no suffix.
///
/// Negative amounts get a leading `-`: `-2000` → `"-2.000"`. Removing the
/// dots and parsing the result gives back the original integer.
pub fn format_currency(amount: Money) -> String {
    amount.format_grouped()
}

// =============================================================================
// Profit Report
// =============================================================================

/// One ledger line with its computed profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitRow {
    #[serde(flatten)]
    pub record: SaleRecord,
    pub profit: Money,
}

/// Profit summary for a reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitReport {
    pub window: Window,
    pub rows: Vec<ProfitRow>,
    pub total_quantity: i64,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
}

impl ProfitReport {
    /// Builds a report over already-filtered records.
    pub fn build<'a>(window: Window, records: impl IntoIterator<Item = &'a SaleRecord>) -> Self {
        let mut report = ProfitReport {
            window,
            rows: Vec::new(),
            total_quantity: 0,
            revenue: Money::zero(),
            cost: Money::zero(),
            profit: Money::zero(),
        };

        for record in records {
            let profit = profit_of(record);
            report.total_quantity = report.total_quantity.saturating_add(record.quantity);
            report.revenue += record.revenue();
            report.cost += record.cost();
            report.profit += profit;
            report.rows.push(ProfitRow {
                record: record.clone(),
                profit,
            });
        }

        report
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Stock Valuation
// =============================================================================

/// Value of the stock currently on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockValuation {
    /// Number of batches counted (including empty ones).
    pub batch_count: usize,
    /// Units on hand across all batches.
    pub units: i64,
    /// Σ cost_price × quantity.
    pub cost_value: Money,
    /// Σ sell_price × quantity.
    pub retail_value: Money,
}

impl StockValuation {
    pub fn of<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Self {
        batches
            .into_iter()
            .fold(StockValuation::default(), |mut acc, b| {
                acc.batch_count += 1;
                acc.units = acc.units.saturating_add(b.quantity);
                acc.cost_value += b.value_at_cost();
                acc.retail_value += b.value_at_sale();
                acc
            })
    }

    /// Profit if everything on hand sold at its listed price.
    pub fn potential_margin(&self) -> Money {
        self.retail_value - self.cost_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(quantity: i64, cost: i64, sell: i64) -> SaleRecord {
        SaleRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: "X".to_string(),
            expiry: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            quantity,
            cost_price: Money::new(cost),
            sell_price: Money::new(sell),
            sold_at: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_profit_of() {
        assert_eq!(profit_of(&record(4, 1000, 1500)), Money::new(2000));
        assert_eq!(format_currency(profit_of(&record(4, 1000, 1500))), "2.000");
    }

    #[test]
    fn test_profit_can_be_negative_or_zero() {
        assert_eq!(profit_of(&record(2, 1500, 1000)), Money::new(-1000));
        assert_eq!(profit_of(&record(3, 1000, 1000)), Money::zero());
        assert_eq!(format_currency(Money::new(-1000)), "-1.000");
    }

    #[test]
    fn test_total_profit() {
        let records = vec![record(4, 1000, 1500), record(2, 1500, 1000)];
        assert_eq!(total_profit(&records), Money::new(1000));
        assert_eq!(total_profit(&Vec::<SaleRecord>::new()), Money::zero());
    }

    #[test]
    fn test_profit_report_totals() {
        let records = vec![record(4, 1000, 1500), record(1, 200, 500)];
        let report = ProfitReport::build(Window::All, &records);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total_quantity, 5);
        assert_eq!(report.revenue, Money::new(6500));
        assert_eq!(report.cost, Money::new(4200));
        assert_eq!(report.profit, Money::new(2300));
        assert_eq!(report.profit, report.revenue - report.cost);
    }

    #[test]
    fn test_stock_valuation() {
        let batches = vec![
            Batch {
                name: "A".into(),
                expiry: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                quantity: 10,
                cost_price: Money::new(1000),
                sell_price: Money::new(1500),
                import_date: None,
            },
            Batch {
                name: "B".into(),
                expiry: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                quantity: 0,
                cost_price: Money::new(5000),
                sell_price: Money::new(9000),
                import_date: None,
            },
        ];

        let valuation = StockValuation::of(&batches);
        assert_eq!(valuation.batch_count, 2);
        assert_eq!(valuation.units, 10);
        assert_eq!(valuation.cost_value, Money::new(10_000));
        assert_eq!(valuation.retail_value, Money::new(15_000));
        assert_eq!(valuation.potential_margin(), Money::new(5_000));
    }
}
