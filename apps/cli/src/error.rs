//! # CLI Error Type
//!
//! Unified error type for `pharmacy` commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  Command Function                                                      │
//! │  AppResult<CommandOutput>                                              │
//! │         │                                                               │
//! │         ├── CoreError::Validation ──────────┐                          │
//! │         ├── CoreError::MedicineNotFound ────┤                          │
//! │         ├── DbError::QueryFailed ───────────┼──► AppError { code,      │
//! │         └── ConfigError::Invalid ───────────┘         message }        │
//! │                                                           │             │
//! │                                                           ▼             │
//! │                               stderr message + exit status per code    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Statuses
//! ```text
//! 0  success
//! 1  internal error
//! 2  invalid input (also clap usage errors)
//! 3  sale only partially fulfilled (not an error, but not a full success)
//! 4  medicine or batch not found
//! 5  configuration error
//! 6  database error
//! 7  file I/O or legacy document error
//! ```

use serde::Serialize;
use thiserror::Error;

use pharmacy_core::CoreError;
use pharmacy_db::DbError;

use crate::config::ConfigError;

/// Exit status of a `sell` that could not be fully satisfied.
pub const PARTIAL_SALE_EXIT_CODE: u8 = 3;

/// Error returned from CLI commands.
///
/// ## Serialization
/// With `--json` a failed command prints:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "No sellable stock for medicine: Ibuprofen"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[error("{message}")]
pub struct AppError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Medicine has no sellable stock, or batch key unknown
    NotFound,

    /// Operator input failed validation
    ValidationError,

    /// Config file or environment is unusable
    ConfigError,

    /// Database operation failed
    DatabaseError,

    /// Reading or writing a file failed
    IoError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit status for this category.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorCode::Internal => 1,
            ErrorCode::ValidationError => 2,
            ErrorCode::NotFound => 4,
            ErrorCode::ConfigError => 5,
            ErrorCode::DatabaseError => 6,
            ErrorCode::IoError => 7,
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.code.exit_code()
    }
}

/// Converts engine errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::MedicineNotFound(_) | CoreError::BatchNotFound { .. } => ErrorCode::NotFound,
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::MalformedDocument { .. } => ErrorCode::IoError,
        };
        AppError::new(code, err.to_string())
    }
}

/// Converts database errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                AppError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::Io { .. } | DbError::Serialization(_) => {
                AppError::new(ErrorCode::IoError, err.to_string())
            }
            DbError::ConnectionFailed(_) | DbError::MigrationFailed(_) | DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, err.to_string())
            }
            DbError::UniqueViolation { .. }
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::Internal(_) => {
                // Log the detail, print a short message
                tracing::error!(error = %err, "Database operation failed");
                AppError::new(
                    ErrorCode::DatabaseError,
                    format!("Database operation failed: {}", err),
                )
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("Failed to render JSON: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
