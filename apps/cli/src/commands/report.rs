//! # Report Commands
//!
//! `history`, `profit` and `valuation`. Read-only.

use chrono::NaiveDateTime;
use serde::Serialize;

use pharmacy_core::report::{ProfitReport, StockValuation};
use pharmacy_core::{SaleRecord, Window};

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub window: Window,
    pub records: Vec<SaleRecord>,
}

pub async fn history(state: &AppState, window: Window, now: NaiveDateTime) -> HistoryView {
    let pharmacy = state.pharmacy().lock().await;
    HistoryView {
        window,
        records: pharmacy
            .sales_history(window, now)
            .into_iter()
            .cloned()
            .collect(),
    }
}

pub async fn profit(state: &AppState, window: Window, now: NaiveDateTime) -> ProfitReport {
    state.pharmacy().lock().await.profit_report(window, now)
}

pub async fn valuation(state: &AppState) -> StockValuation {
    state.pharmacy().lock().await.valuation()
}
