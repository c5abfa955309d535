//! Verifier: read-only summary of what is stored for a ticker.

use crate::error::{validate_ticker, Result};
use crate::store::{StorageError, TickerStore};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, OptionalExtension};
use std::fmt;
use std::path::Path;

const SUMMARY_SQL: &str = "
SELECT
    p1.ticker,
    COUNT(*) AS row_count,
    MIN(p1.date) AS first_date,
    MAX(p1.date) AS last_date,
    (
        SELECT p2.close
        FROM ticker_prices p2
        WHERE p2.ticker = p1.ticker
        ORDER BY p2.date DESC
        LIMIT 1
    ) AS latest_close,
    i.short_name
FROM ticker_prices p1
LEFT JOIN ticker_info i ON i.ticker = p1.ticker
WHERE p1.ticker = ?1
GROUP BY p1.ticker
";

/// Row count, date range and latest close for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSummary {
    pub ticker: String,
    pub short_name: Option<String>,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Close on `last_date`; `None` when that bar's close is NULL.
    pub latest_close: Option<f64>,
}

impl fmt::Display for TickerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticker)?;
        if let Some(name) = &self.short_name {
            write!(f, " ({name})")?;
        }
        write!(
            f,
            ": {} rows, {} to {}, latest close ",
            self.rows, self.first_date, self.last_date
        )?;
        match self.latest_close {
            Some(close) => write!(f, "{close}"),
            None => write!(f, "n/a"),
        }
    }
}

/// Summarize the stored prices for `ticker`. `None` if it has no rows.
pub fn summarize(store: &TickerStore, ticker: &str) -> Result<Option<TickerSummary>> {
    let ticker = validate_ticker(ticker)?;
    let summary = store
        .conn()
        .query_row(SUMMARY_SQL, params![ticker], |row| {
            Ok(TickerSummary {
                ticker: row.get(0)?,
                rows: row.get::<_, i64>(1)? as usize,
                first_date: row.get(2)?,
                last_date: row.get(3)?,
                latest_close: row.get(4)?,
                short_name: row.get(5)?,
            })
        })
        .optional()
        .map_err(StorageError::from)?;

    debug!("summary for {ticker}: {summary:?}");
    Ok(summary)
}

/// Open the database read-only and summarize `ticker`.
///
/// Fails if the file or its schema does not exist; never creates anything.
pub fn check_ticker(db: &Path, ticker: &str) -> Result<Option<TickerSummary>> {
    let store = TickerStore::open_read_only(db)?;
    let summary = summarize(&store, ticker)?;
    match &summary {
        Some(s) => info!("{} has {} price rows in {}", s.ticker, s.rows, db.display()),
        None => info!("no price rows for {} in {}", ticker.trim(), db.display()),
    }
    Ok(summary)
}
