//! # Output Rendering
//!
//! Turns a [`CommandOutput`] into text for stdout: aligned tables by
//! default, pretty JSON with `--json`. Logging goes to stderr, so stdout
//! carries only this.

use pharmacy_core::dates::{format_date, format_timestamp};
use pharmacy_core::report::{ProfitReport, StockValuation};
use pharmacy_core::{Batch, Money, StockChange, Upserted};

use crate::commands::{
    CommandOutput, ExportSummary, HistoryView, ImportSummary, InventoryView, SaleReceipt,
};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Renderer {
    json: bool,
    currency_symbol: String,
}

impl Renderer {
    pub fn new(json: bool, currency_symbol: impl Into<String>) -> Self {
        Renderer {
            json,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn render(&self, output: &CommandOutput) -> AppResult<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(output)?);
        }

        let text = match output {
            CommandOutput::StockAdded(upserted) => self.stock_added(upserted),
            CommandOutput::Sold(receipt) => self.sold(receipt),
            CommandOutput::BatchDeleted(batch) => self.batch_deleted(batch),
            CommandOutput::Inventory(view) => self.inventory(view),
            CommandOutput::History(view) => self.history(view),
            CommandOutput::Profit(report) => self.profit(report),
            CommandOutput::Valuation(valuation) => self.valuation(valuation),
            CommandOutput::Imported(summary) => imported(summary),
            CommandOutput::Exported(summary) => exported(summary),
        };
        Ok(text)
    }

    /// Error text for stderr, or a JSON error object for stdout.
    pub fn render_error(&self, err: &AppError) -> String {
        if self.json {
            serde_json::to_string_pretty(err).unwrap_or_else(|_| err.message.clone())
        } else {
            format!("error: {}", err.message)
        }
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn stock_added(&self, upserted: &Upserted) -> String {
        let b = &upserted.batch;
        let verb = match upserted.change {
            StockChange::Inserted => "Added new batch",
            StockChange::Merged => "Merged into batch",
        };
        format!(
            "{} {} (exp {}): {} units on hand, cost {}, price {}",
            verb,
            b.name,
            format_date(b.expiry),
            b.quantity,
            self.money(b.cost_price),
            self.money(b.sell_price)
        )
    }

    fn sold(&self, receipt: &SaleReceipt) -> String {
        let outcome = &receipt.outcome;
        let mut lines = Vec::new();

        if outcome.is_partial() {
            lines.push(format!(
                "Partial sale: sold {} of {} {}, {} could not be fulfilled",
                outcome.sold_total,
                outcome.requested(),
                receipt.name,
                outcome.remaining_unfulfilled
            ));
        } else {
            lines.push(format!("Sold {} {}", outcome.sold_total, receipt.name));
        }

        for record in &outcome.records {
            lines.push(format!(
                "  {:>6} from batch exp {} at {}",
                record.quantity,
                format_date(record.expiry),
                self.money(record.sell_price)
            ));
        }

        lines.join("\n")
    }

    fn batch_deleted(&self, batch: &Batch) -> String {
        format!(
            "Deleted batch {} (exp {}) with {} units",
            batch.name,
            format_date(batch.expiry),
            batch.quantity
        )
    }

    // =========================================================================
    // Reports
    // =========================================================================

    fn inventory(&self, view: &InventoryView) -> String {
        if view.items.is_empty() {
            return "No batches in stock.".to_string();
        }

        let width = name_width(view.items.iter().map(|i| i.batch.name.as_str()));
        let mut lines = vec![format!(
            "{:<width$}  {:<10}  {:>5}  {:>8}  {:>14}  {:>14}  {:<8}",
            "NAME",
            "EXPIRY",
            "DAYS",
            "QTY",
            "COST",
            "PRICE",
            "RISK",
            width = width
        )];

        for item in &view.items {
            let b = &item.batch;
            let flag = if item.low_stock { "  LOW STOCK" } else { "" };
            lines.push(format!(
                "{:<width$}  {:<10}  {:>5}  {:>8}  {:>14}  {:>14}  {:<8}{}",
                b.name,
                format_date(b.expiry),
                item.days_left,
                b.quantity,
                self.money(b.cost_price),
                self.money(b.sell_price),
                item.risk.to_string(),
                flag,
                width = width
            ));
        }

        lines.push(format!(
            "{} batches, order: {}, low stock at <= {}",
            view.items.len(),
            view.order,
            view.low_stock_threshold
        ));
        lines.join("\n")
    }

    fn history(&self, view: &HistoryView) -> String {
        if view.records.is_empty() {
            return format!("No sales in window '{}'.", view.window);
        }

        let width = name_width(view.records.iter().map(|r| r.name.as_str()));
        let mut lines = vec![format!(
            "{:<19}  {:<width$}  {:<10}  {:>8}  {:>14}",
            "SOLD AT",
            "NAME",
            "EXPIRY",
            "QTY",
            "PRICE",
            width = width
        )];

        for r in &view.records {
            lines.push(format!(
                "{:<19}  {:<width$}  {:<10}  {:>8}  {:>14}",
                format_timestamp(r.sold_at),
                r.name,
                format_date(r.expiry),
                r.quantity,
                self.money(r.sell_price),
                width = width
            ));
        }

        lines.push(format!("{} records in window '{}'", view.records.len(), view.window));
        lines.join("\n")
    }

    fn profit(&self, report: &ProfitReport) -> String {
        let mut lines = Vec::new();

        if report.is_empty() {
            lines.push(format!("No sales in window '{}'.", report.window));
        } else {
            let width = name_width(report.rows.iter().map(|r| r.record.name.as_str()));
            lines.push(format!(
                "{:<19}  {:<width$}  {:>8}  {:>14}",
                "SOLD AT",
                "NAME",
                "QTY",
                "PROFIT",
                width = width
            ));
            for row in &report.rows {
                lines.push(format!(
                    "{:<19}  {:<width$}  {:>8}  {:>14}",
                    format_timestamp(row.record.sold_at),
                    row.record.name,
                    row.record.quantity,
                    self.money(row.profit),
                    width = width
                ));
            }
            lines.push(String::new());
        }

        lines.push(format!("Window:   {}", report.window));
        lines.push(format!("Units:    {}", report.total_quantity));
        lines.push(format!("Revenue:  {}", self.money(report.revenue)));
        lines.push(format!("Cost:     {}", self.money(report.cost)));
        lines.push(format!("Profit:   {}", self.money(report.profit)));
        lines.join("\n")
    }

    fn valuation(&self, v: &StockValuation) -> String {
        [
            format!("Batches:           {}", v.batch_count),
            format!("Units on hand:     {}", v.units),
            format!("Value at cost:     {}", self.money(v.cost_value)),
            format!("Value at price:    {}", self.money(v.retail_value)),
            format!("Potential margin:  {}", self.money(v.potential_margin())),
        ]
        .join("\n")
    }
}

fn imported(summary: &ImportSummary) -> String {
    let mut lines = vec![format!(
        "Imported {} batches and {} sale records",
        summary.batches, summary.sale_records
    )];
    if !summary.diagnostics.is_empty() {
        lines.push(format!("{} records needed recovery:", summary.diagnostics.len()));
        lines.extend(summary.diagnostics.iter().map(|d| format!("  {}", d)));
    }
    lines.join("\n")
}

fn exported(summary: &ExportSummary) -> String {
    format!(
        "Exported {} batches to {} and {} sale records to {}",
        summary.batches,
        summary.data.display(),
        summary.sale_records,
        summary.sales.display()
    )
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0).max(4)
}
