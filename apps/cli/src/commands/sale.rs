//! # Sale Command
//!
//! ```text
//! pharmacy sell Paracetamol 15
//!       │
//!       ▼
//! Pharmacy::sell on a copy ── MedicineNotFound ──► exit 4, nothing written
//!       │
//!       ▼
//! Database::commit_sale (one transaction: batch quantities + ledger rows)
//!       │
//!       ▼
//! copy replaces live state ──► receipt (exit 0, or 3 when partial)
//! ```

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use pharmacy_core::SaleOutcome;

use crate::cli::SellArgs;
use crate::error::AppResult;
use crate::state::AppState;

/// What a `sell` did.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub name: String,
    pub status: SaleStatus,
    #[serde(flatten)]
    pub outcome: SaleOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Complete,
    Partial,
}

pub async fn sell(state: &AppState, args: SellArgs, now: NaiveDateTime) -> AppResult<SaleReceipt> {
    debug!(name = %args.name, quantity = args.quantity, "sell command");

    let mut pharmacy = state.pharmacy().lock().await;
    let mut next = pharmacy.clone();
    let outcome = next.sell(&args.name, args.quantity, now)?;

    state
        .db()
        .commit_sale(&outcome, &next.touched_batches(&outcome))
        .await?;
    *pharmacy = next;

    let status = if outcome.is_partial() {
        SaleStatus::Partial
    } else {
        SaleStatus::Complete
    };

    Ok(SaleReceipt {
        name: args.name.trim().to_string(),
        status,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AddStockArgs;
    use crate::commands::stock::add_stock;
    use crate::commands::test_support::*;
    use crate::error::ErrorCode;
    use pharmacy_core::Window;

    async fn stocked() -> AppState {
        let state = state().await;
        let today = date(1, 4, 2025);
        for (expiry, cost) in [(date(1, 6, 2025), 1200), (date(1, 5, 2025), 1000)] {
            add_stock(
                &state,
                AddStockArgs {
                    name: "Paracetamol".into(),
                    expiry,
                    quantity: 10,
                    cost,
                    price: 2000,
                },
                today,
            )
            .await
            .unwrap();
        }
        state
    }

    #[tokio::test]
    async fn test_sale_split_across_batches_is_persisted() {
        let state = stocked().await;

        let receipt = sell(
            &state,
            SellArgs {
                name: "Paracetamol".into(),
                quantity: 15,
            },
            at(1, 4, 2025, 10),
        )
        .await
        .unwrap();

        assert_eq!(receipt.status, SaleStatus::Complete);
        assert_eq!(receipt.outcome.records.len(), 2);
        assert_eq!(receipt.outcome.records[0].expiry, date(1, 5, 2025));

        let stored = state.db().batches().list().await.unwrap();
        let quantities: Vec<i64> = stored.iter().map(|b| b.quantity).collect();
        // storage order: the June batch was added first
        assert_eq!(quantities, vec![5, 0]);
        assert_eq!(state.db().sales().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_partial_sale() {
        let state = stocked().await;

        let receipt = sell(
            &state,
            SellArgs {
                name: "PARACETAMOL".into(),
                quantity: 25,
            },
            at(1, 4, 2025, 10),
        )
        .await
        .unwrap();

        assert_eq!(receipt.status, SaleStatus::Partial);
        assert_eq!(receipt.outcome.sold_total, 20);
        assert_eq!(receipt.outcome.remaining_unfulfilled, 5);

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["status"], "partial");
        assert_eq!(json["remaining_unfulfilled"], 5);
    }

    #[tokio::test]
    async fn test_unknown_medicine_writes_nothing() {
        let state = stocked().await;

        let err = sell(
            &state,
            SellArgs {
                name: "Ibuprofen".into(),
                quantity: 1,
            },
            at(1, 4, 2025, 10),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(state.db().sales().count().await.unwrap(), 0);
        assert!(state
            .pharmacy()
            .lock()
            .await
            .sales_history(Window::All, at(1, 4, 2025, 11))
            .is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_rejected() {
        let state = stocked().await;
        let err = sell(
            &state,
            SellArgs {
                name: "Paracetamol".into(),
                quantity: 0,
            },
            at(1, 4, 2025, 10),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
