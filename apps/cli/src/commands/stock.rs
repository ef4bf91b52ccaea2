//! # Stock Commands
//!
//! `add-stock`, `delete-batch` and `inventory`.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use pharmacy_core::{Batch, InventoryItem, InventoryOrder, Money, NewStock, Upserted};

use crate::cli::{AddStockArgs, DeleteBatchArgs};
use crate::error::AppResult;
use crate::state::AppState;

/// Inventory rows plus the parameters they were computed with.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub order: InventoryOrder,
    pub today: NaiveDate,
    pub low_stock_threshold: i64,
    pub items: Vec<InventoryItem>,
}

/// Records incoming stock and persists the resulting batch.
///
/// ## Rules
/// - Same `(name, expiry)` as an existing batch: quantities add up and the
///   new prices replace the old ones
/// - Otherwise a new batch is appended with `today` as its import date
pub async fn add_stock(state: &AppState, args: AddStockArgs, today: NaiveDate) -> AppResult<Upserted> {
    debug!(name = %args.name, quantity = args.quantity, "add_stock command");

    let stock = NewStock {
        name: args.name,
        expiry: args.expiry,
        quantity: args.quantity,
        cost_price: Money::new(args.cost),
        sell_price: Money::new(args.price),
    };

    let mut pharmacy = state.pharmacy().lock().await;
    let mut next = pharmacy.clone();
    let upserted = next.add_stock(stock, today)?;

    state.db().save_batch(&upserted.batch).await?;
    *pharmacy = next;

    Ok(upserted)
}

/// Deletes one batch. Sale records that reference it are kept.
pub async fn delete_batch(state: &AppState, args: DeleteBatchArgs) -> AppResult<Batch> {
    debug!(name = %args.name, expiry = %args.expiry, "delete_batch command");

    let mut pharmacy = state.pharmacy().lock().await;
    let mut next = pharmacy.clone();
    let removed = next.delete_batch(&args.name, args.expiry)?;

    state.db().delete_batch(&removed).await?;
    *pharmacy = next;

    Ok(removed)
}

pub async fn inventory(state: &AppState, order: InventoryOrder, today: NaiveDate) -> InventoryView {
    let pharmacy = state.pharmacy().lock().await;
    InventoryView {
        order,
        today,
        low_stock_threshold: pharmacy.low_stock_threshold(),
        items: pharmacy.inventory_items(order, today),
    }
}
