//! Error types for the sheetcalc shell

use sheetcalc_core::SheetError;
use thiserror::Error;

/// Errors that can occur while running shell commands
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {}", .0.code(), .0)]
    Sheet(#[from] SheetError),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
