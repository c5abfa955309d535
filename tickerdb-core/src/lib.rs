//! tickerdb core: ticker metadata and daily price history in SQLite.
//!
//! This crate contains:
//! - Domain types (price bars, ticker metadata, history periods)
//! - The market-data provider trait and the Yahoo Finance provider
//! - The SQLite store with idempotent upserts
//! - The ingestor (fetch + upsert) and the verifier (read-only summary)
//! - TOML configuration and the error kinds shared by all of the above

pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod provider;
pub mod store;
pub mod verify;

pub use config::Config;
pub use domain::{Period, PriceBar, TickerInfo};
pub use error::{Error, Result, UsageError};
pub use ingest::{ingest_ticker, IngestReport};
pub use provider::{DataProvider, ProviderError, YahooProvider};
pub use store::{StorageError, TickerStore};
pub use verify::{check_ticker, summarize, TickerSummary};
