//! # Pharmacy CLI Entry Point
//!
//! Delegates to `pharmacy_cli::run()`.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    pharmacy_cli::run().await
}
