//! Ingestor: fetch one ticker's metadata and history, upsert both.

use crate::domain::{Period, TickerInfo};
use crate::error::{validate_ticker, Result};
use crate::provider::{DataProvider, ProviderError};
use crate::store::TickerStore;
use chrono::NaiveDate;
use log::info;
use std::fmt;

/// Summary of one ingest run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub ticker: String,
    pub period: Period,
    /// Price rows written (inserted + updated).
    pub bars_written: usize,
    pub bars_inserted: usize,
    pub bars_updated: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Upserted {}: {} price rows ({} new, {} updated) from {} to {}",
            self.ticker,
            self.bars_written,
            self.bars_inserted,
            self.bars_updated,
            self.first_date,
            self.last_date
        )
    }
}

/// Fetch `ticker` from the provider and upsert metadata then prices.
///
/// The metadata row is committed before history is requested, so a failure
/// while fetching or writing bars leaves it in place. Running the same
/// ingest twice leaves the store as after the first run.
pub fn ingest_ticker(
    provider: &dyn DataProvider,
    store: &mut TickerStore,
    ticker: &str,
    period: Period,
) -> Result<IngestReport> {
    let ticker = validate_ticker(ticker)?;

    info!("fetching metadata for {ticker} from {}", provider.name());
    let payload = provider.fetch_info(ticker)?;
    if payload.is_empty() {
        return Err(ProviderError::SymbolNotFound {
            symbol: ticker.to_string(),
        }
        .into());
    }
    store.upsert_info(&TickerInfo::from_payload(ticker, payload))?;

    info!("fetching {period} price history for {ticker}");
    let bars = provider.fetch_history(ticker, period)?;
    let dates = bars.iter().map(|b| b.date);
    let Some((first, last)) = dates.clone().min().zip(dates.max()) else {
        return Err(ProviderError::EmptyHistory {
            symbol: ticker.to_string(),
            period,
        }
        .into());
    };

    let counts = store.upsert_prices(ticker, &bars)?;
    let report = IngestReport {
        ticker: ticker.to_string(),
        period,
        bars_written: counts.written,
        bars_inserted: counts.inserted,
        bars_updated: counts.updated,
        first_date: first,
        last_date: last,
    };
    info!("{report} into {}", store.path().display());
    Ok(report)
}
