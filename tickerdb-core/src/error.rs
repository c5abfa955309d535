//! Top-level error kinds.
//!
//! Each layer owns its error enum (`ProviderError`, `StorageError`,
//! `UsageError`); `Error` is what the ingestor and verifier return.

use crate::provider::ProviderError;
use crate::store::StorageError;
use thiserror::Error;

/// Bad arguments or configuration supplied by the operator.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("ticker symbol must not be empty")]
    EmptyTicker,

    #[error("unknown period '{0}' (valid: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)")]
    UnknownPeriod(String),

    #[error("config error: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Usage(#[from] UsageError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Trim a ticker symbol and reject empty input.
pub fn validate_ticker(ticker: &str) -> std::result::Result<&str, UsageError> {
    let trimmed = ticker.trim();
    if trimmed.is_empty() {
        return Err(UsageError::EmptyTicker);
    }
    Ok(trimmed)
}
