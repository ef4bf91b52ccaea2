//! # Commands
//!
//! One handler per subcommand. Handlers take the clock as an argument and
//! return a [`CommandOutput`]; printing happens in [`crate::render`].
//!
//! ## Mutation Pattern
//! ```text
//! lock Pharmacy ──► clone ──► mutate clone ──► persist ──► swap clone in
//!                                 │                │
//!                                 ▼                ▼
//!                           CoreError        DbError
//!                    (live state untouched in both cases)
//! ```

pub mod legacy;
pub mod report;
pub mod sale;
pub mod stock;

use chrono::NaiveDateTime;
use serde::Serialize;

use pharmacy_core::report::{ProfitReport, StockValuation};
use pharmacy_core::{Batch, Upserted};

use crate::cli::Command;
use crate::error::{AppResult, PARTIAL_SALE_EXIT_CODE};
use crate::state::AppState;

pub use legacy::{ExportSummary, ImportSummary};
pub use report::HistoryView;
pub use sale::SaleReceipt;
pub use stock::InventoryView;

/// Result of one command, ready to render.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    StockAdded(Upserted),
    Sold(SaleReceipt),
    BatchDeleted(Batch),
    Inventory(InventoryView),
    History(HistoryView),
    Profit(ProfitReport),
    Valuation(StockValuation),
    Imported(ImportSummary),
    Exported(ExportSummary),
}

impl CommandOutput {
    /// Process exit status for a successful command.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandOutput::Sold(receipt) if receipt.outcome.is_partial() => PARTIAL_SALE_EXIT_CODE,
            _ => 0,
        }
    }
}

/// Runs `command` against `state` as of `now`.
pub async fn execute(
    state: &AppState,
    command: Command,
    now: NaiveDateTime,
) -> AppResult<CommandOutput> {
    let today = now.date();

    let output = match command {
        Command::AddStock(args) => CommandOutput::StockAdded(stock::add_stock(state, args, today).await?),
        Command::Sell(args) => CommandOutput::Sold(sale::sell(state, args, now).await?),
        Command::DeleteBatch(args) => {
            CommandOutput::BatchDeleted(stock::delete_batch(state, args).await?)
        }
        Command::Inventory(args) => {
            CommandOutput::Inventory(stock::inventory(state, args.order, today).await)
        }
        Command::History(args) => {
            CommandOutput::History(report::history(state, args.window, now).await)
        }
        Command::Profit(args) => CommandOutput::Profit(report::profit(state, args.window, now).await),
        Command::Valuation => CommandOutput::Valuation(report::valuation(state).await),
        Command::ImportLegacy(args) => {
            CommandOutput::Imported(legacy::import_legacy(state, &args.data, &args.sales).await?)
        }
        Command::ExportLegacy(args) => {
            CommandOutput::Exported(legacy::export_legacy(state, &args.data, &args.sales).await?)
        }
    };

    Ok(output)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::config::AppConfig;
    use crate::state::AppState;

    pub fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn at(d: u32, m: u32, y: i32, h: u32) -> NaiveDateTime {
        date(d, m, y).and_hms_opt(h, 0, 0).unwrap()
    }

    pub async fn state() -> AppState {
        AppState::in_memory(AppConfig::default()).await.unwrap()
    }
}
