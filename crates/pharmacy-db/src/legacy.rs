//! # Legacy Files
//!
//! Reads and writes the legacy `data.json` and `sales.json` files.
//! Record-level decoding lives in `pharmacy_core::legacy`; this module only
//! owns the file I/O.
//!
//! A missing file is an empty collection, as on a first start.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use pharmacy_core::legacy::{decode_batches, decode_sales, encode_batches, encode_sales, LoadDiagnostic};
use pharmacy_core::{BatchStore, SalesLedger};

use crate::error::{DbError, DbResult};

/// Everything recovered from a pair of legacy files.
#[derive(Debug, Clone)]
pub struct LegacyDataset {
    pub store: BatchStore,
    pub ledger: SalesLedger,
    /// Recoveries from both files, batches first.
    pub diagnostics: Vec<LoadDiagnostic>,
}

async fn read_or_empty(path: &Path) -> DbResult<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Legacy file not found, treating as empty");
            Ok(String::new())
        }
        Err(e) => Err(DbError::io(path, e)),
    }
}

/// Reads and decodes both legacy files.
///
/// ## Errors
/// - `DbError::Io` if a file exists but can't be read
/// - `DbError::Serialization` if a document is not a JSON array
pub async fn read_legacy(data_path: &Path, sales_path: &Path) -> DbResult<LegacyDataset> {
    let batches = decode_batches(&read_or_empty(data_path).await?)?;
    let sales = decode_sales(&read_or_empty(sales_path).await?)?;

    let mut diagnostics = batches.diagnostics;
    diagnostics.extend(sales.diagnostics);

    info!(
        batches = batches.value.len(),
        sale_records = sales.value.len(),
        diagnostics = diagnostics.len(),
        "Legacy files read"
    );

    Ok(LegacyDataset {
        store: batches.value,
        ledger: sales.value,
        diagnostics,
    })
}

/// Writes both collections in the legacy format (pretty JSON, UTF-8).
pub async fn write_legacy(
    store: &BatchStore,
    ledger: &SalesLedger,
    data_path: &Path,
    sales_path: &Path,
) -> DbResult<()> {
    let data = encode_batches(store)?;
    let sales = encode_sales(ledger)?;

    tokio::fs::write(data_path, data)
        .await
        .map_err(|e| DbError::io(data_path, e))?;
    tokio::fs::write(sales_path, sales)
        .await
        .map_err(|e| DbError::io(sales_path, e))?;

    info!(
        data = %data_path.display(),
        sales = %sales_path.display(),
        batches = store.len(),
        sale_records = ledger.len(),
        "Legacy files written"
    );
    Ok(())
}
