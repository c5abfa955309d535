//! Market-data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the remote source so the ingestor can
//! be driven by Yahoo Finance in production and by fixtures in tests.

pub mod yahoo;

use crate::domain::{InfoPayload, Period, PriceBar};
use thiserror::Error;

pub use yahoo::{YahooConfig, YahooProvider};

/// Structured error types for provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price history returned for {symbol} over period {period}")]
    EmptyHistory { symbol: String, period: Period },
}

/// Source of ticker metadata and daily price history.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the metadata payload for a symbol.
    ///
    /// An unknown symbol is `SymbolNotFound`, never an empty payload.
    fn fetch_info(&self, symbol: &str) -> Result<InfoPayload, ProviderError>;

    /// Fetch daily bars for a symbol over a lookback window, oldest first.
    ///
    /// May return an empty vector; the caller decides whether that is an error.
    fn fetch_history(&self, symbol: &str, period: Period) -> Result<Vec<PriceBar>, ProviderError>;
}
