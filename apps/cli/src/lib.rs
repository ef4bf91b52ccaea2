//! # Pharmacy CLI Library
//!
//! Everything behind the `pharmacy` binary. `main.rs` only calls [`run`].
//!
//! ## Module Organization
//! ```text
//! pharmacy_cli/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── config.rs       ◄─── AppConfig: defaults ← toml ← env ← flags
//! ├── state.rs        ◄─── AppState: Mutex<Pharmacy> + Database
//! ├── commands/
//! │   ├── mod.rs      ◄─── CommandOutput & execute()
//! │   ├── stock.rs    ◄─── add-stock, delete-batch, inventory
//! │   ├── sale.rs     ◄─── sell
//! │   ├── report.rs   ◄─── history, profit, valuation
//! │   └── legacy.rs   ◄─── import-legacy, export-legacy
//! ├── render.rs       ◄─── text tables / JSON
//! └── error.rs        ◄─── AppError, ErrorCode, exit statuses
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod state;

use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::AppConfig;
use error::AppResult;
use render::Renderer;
use state::AppState;

/// Parses arguments, runs one command and returns the process exit status.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       CLI Startup                                       │
/// │                                                                         │
/// │  1. Parse arguments (clap exits with status 2 on usage errors)         │
/// │  2. Initialize logging to stderr                                       │
/// │  3. Load config: defaults ← pharmacy.toml ← PHARMACY_* ← --db          │
/// │  4. Open database, run migrations, load Batch Store + Sales Ledger     │
/// │  5. Execute the command with the local wall clock                      │
/// │  6. Print the result, close the pool                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let fallback = Renderer::new(cli.json, AppConfig::default().currency_symbol);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => return report_error(&fallback, &err),
    };
    let renderer = Renderer::new(cli.json, config.currency_symbol.clone());

    let state = match AppState::open(config).await {
        Ok(state) => state,
        Err(err) => return report_error(&renderer, &err),
    };

    let now = Local::now().naive_local();
    debug!(command = ?cli.command, %now, "Executing command");

    let result = commands::execute(&state, cli.command, now).await;
    state.close().await;

    let output = match result {
        Ok(output) => output,
        Err(err) => return report_error(&renderer, &err),
    };

    match renderer.render(&output) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::from(output.exit_code())
        }
        Err(err) => report_error(&renderer, &err),
    }
}

fn load_config(cli: &Cli) -> AppResult<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.database_path = Some(db.clone());
    }
    info!(
        database = ?config.database_path,
        low_stock_threshold = config.low_stock_threshold,
        "Configuration loaded"
    );
    Ok(config)
}

fn report_error(renderer: &Renderer, err: &error::AppError) -> ExitCode {
    // JSON consumers read stdout
    let text = renderer.render_error(err);
    if renderer.is_json() {
        println!("{}", text);
    } else {
        eprintln!("{}", text);
    }
    ExitCode::from(err.exit_code())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pharmacy_core=trace` - Trace the engine only
/// - Default: `info,pharmacy=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharmacy=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
