//! # Legacy Import / Export
//!
//! Moves data between the database and the `data.json` / `sales.json` pair.
//!
//! ## Import Workflow
//! 1. Decode both files, recovering what can be recovered
//! 2. Replace the database contents in one transaction
//! 3. Replace the in-memory engine with the imported state
//! 4. Report every recovery applied along the way

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use pharmacy_core::Pharmacy;
use pharmacy_db::{read_legacy, write_legacy};

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub batches: usize,
    pub sale_records: usize,
    /// One line per recovered record, e.g. `batches #3 (X): ..., skipped`.
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub data: PathBuf,
    pub sales: PathBuf,
    pub batches: usize,
    pub sale_records: usize,
}

pub async fn import_legacy(state: &AppState, data: &Path, sales: &Path) -> AppResult<ImportSummary> {
    let dataset = read_legacy(data, sales).await?;

    let mut pharmacy = state.pharmacy().lock().await;
    let (batches, sale_records) = state
        .db()
        .replace_all(&dataset.store, &dataset.ledger)
        .await?;

    *pharmacy = Pharmacy::new(dataset.store, dataset.ledger)
        .with_low_stock_threshold(state.config().low_stock_threshold);

    info!(
        batches,
        sale_records,
        diagnostics = dataset.diagnostics.len(),
        "Legacy data imported"
    );

    Ok(ImportSummary {
        batches,
        sale_records,
        diagnostics: dataset.diagnostics.iter().map(|d| d.to_string()).collect(),
    })
}

pub async fn export_legacy(state: &AppState, data: &Path, sales: &Path) -> AppResult<ExportSummary> {
    let pharmacy = state.pharmacy().lock().await;
    write_legacy(pharmacy.store(), pharmacy.ledger(), data, sales).await?;

    Ok(ExportSummary {
        data: data.to_path_buf(),
        sales: sales.to_path_buf(),
        batches: pharmacy.store().len(),
        sale_records: pharmacy.ledger().len(),
    })
}
