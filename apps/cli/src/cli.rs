//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pharmacy_core::dates::parse_date;
use pharmacy_core::{InventoryOrder, ValidationError, Window};

#[derive(Debug, Parser)]
#[command(
    name = "pharmacy",
    version,
    about = "Pharmacy stock tracker: expiry batches, FEFO sales and profit reports"
)]
pub struct Cli {
    /// Config file (default: pharmacy.toml in the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overrides config and PHARMACY_DB_PATH
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Record incoming stock, merging into an existing batch with the same expiry
    AddStock(AddStockArgs),
    /// Sell units, soonest-expiring batches first
    Sell(SellArgs),
    /// Remove one batch (sales history is kept)
    DeleteBatch(DeleteBatchArgs),
    /// List batches with days left, expiry risk and low-stock flag
    Inventory(InventoryArgs),
    /// List sale records in a time window
    History(WindowArgs),
    /// Profit report for a time window
    Profit(WindowArgs),
    /// Value of the stock on hand
    Valuation,
    /// Replace the database contents with data.json / sales.json
    ImportLegacy(LegacyFilesArgs),
    /// Write the database contents as data.json / sales.json
    ExportLegacy(LegacyFilesArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AddStockArgs {
    /// Medicine name
    pub name: String,

    /// Expiry date, dd/mm/yyyy
    #[arg(value_parser = parse_expiry)]
    pub expiry: NaiveDate,

    /// Units received
    #[arg(allow_negative_numbers = true)]
    pub quantity: i64,

    /// Unit cost price
    #[arg(long, allow_negative_numbers = true)]
    pub cost: i64,

    /// Unit sell price
    #[arg(long, allow_negative_numbers = true)]
    pub price: i64,
}

#[derive(Debug, Clone, Args)]
pub struct SellArgs {
    /// Medicine name (case-insensitive)
    pub name: String,

    /// Units requested
    #[arg(allow_negative_numbers = true)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Args)]
pub struct DeleteBatchArgs {
    /// Medicine name (exact)
    pub name: String,

    /// Expiry date, dd/mm/yyyy
    #[arg(value_parser = parse_expiry)]
    pub expiry: NaiveDate,
}

#[derive(Debug, Clone, Args)]
pub struct InventoryArgs {
    /// risk (expired, critical, warning, normal) or expiry
    #[arg(long, default_value_t = InventoryOrder::RiskPriority)]
    pub order: InventoryOrder,
}

#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// all, today, this_week, this_month or this_year
    #[arg(long, short, default_value_t = Window::All)]
    pub window: Window,
}

#[derive(Debug, Clone, Args)]
pub struct LegacyFilesArgs {
    /// Batches file (data.json)
    pub data: PathBuf,

    /// Sales file (sales.json)
    pub sales: PathBuf,
}

fn parse_expiry(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_date("expiry", value)
}
