//! SQLite ticker store.
//!
//! Writes go through single `INSERT ... ON CONFLICT DO UPDATE` statements, so
//! re-ingesting a ticker overwrites rows in place and never duplicates them.
//! The metadata upsert and the price batch are separate transactions.

pub mod schema;

use crate::domain::{PriceBar, TickerInfo};
use log::debug;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("database {} has no {table} table; run ingest first", path.display())]
    SchemaMissing { path: PathBuf, table: &'static str },

    #[error("failed to create directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("ticker metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of one price-batch upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    /// Bars written (inserted + updated).
    pub written: usize,
    /// Bars whose `(ticker, date)` was not present before.
    pub inserted: usize,
    /// Bars that overwrote an existing row.
    pub updated: usize,
}

/// The ticker database.
pub struct TickerStore {
    conn: Connection,
    path: PathBuf,
}

impl TickerStore {
    /// Open (creating if needed) a writable store and ensure the schema exists.
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;
        schema::ensure_schema(&conn)?;
        debug!("opened store {}", path.display());
        Ok(Self { conn, path })
    }

    /// Open an existing store read-only. Never creates the file.
    pub fn open_read_only(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if !path.is_file() {
            return Err(StorageError::DatabaseNotFound(path));
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        for table in [schema::TICKER_PRICES, schema::TICKER_INFO] {
            if !schema::table_exists(&conn, table)? {
                return Err(StorageError::SchemaMissing { path, table });
            }
        }
        Ok(Self { conn, path })
    }

    /// In-memory store with the schema applied.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Upsert the metadata row for `info.ticker`. Commits on its own.
    pub fn upsert_info(&self, info: &TickerInfo) -> Result<(), StorageError> {
        let raw = info.raw_json()?;
        self.conn.execute(
            schema::UPSERT_INFO,
            params![
                info.ticker,
                info.short_name,
                info.long_name,
                info.quote_type,
                info.currency,
                info.exchange,
                info.market_cap,
                info.sector,
                info.industry,
                info.country,
                info.website,
                raw,
            ],
        )?;
        Ok(())
    }

    /// Upsert all bars for a ticker in one transaction.
    ///
    /// Either every bar is written or none is; already-committed metadata is
    /// never touched. When the batch repeats a date, the last bar for that
    /// date wins and counts once.
    pub fn upsert_prices(
        &mut self,
        ticker: &str,
        bars: &[PriceBar],
    ) -> Result<UpsertCounts, StorageError> {
        let by_date: BTreeMap<_, _> = bars.iter().map(|bar| (bar.date, bar)).collect();
        let written = by_date.len();

        let tx = self.conn.transaction()?;
        let before = count_prices(&tx, ticker)?;
        {
            let mut stmt = tx.prepare_cached(schema::UPSERT_PRICE)?;
            for bar in by_date.values() {
                stmt.execute(params![
                    ticker,
                    bar.date,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.adj_close,
                    bar.volume,
                    bar.dividends,
                    bar.stock_splits,
                ])?;
            }
        }
        let after = count_prices(&tx, ticker)?;
        tx.commit()?;

        let inserted = after.saturating_sub(before);
        let counts = UpsertCounts {
            written,
            inserted,
            updated: written.saturating_sub(inserted),
        };
        debug!("{ticker}: {counts:?}");
        Ok(counts)
    }

    /// Number of price rows stored for a ticker.
    pub fn price_count(&self, ticker: &str) -> Result<usize, StorageError> {
        Ok(count_prices(&self.conn, ticker)?)
    }

    /// All price rows for a ticker, oldest first.
    pub fn load_prices(&self, ticker: &str) -> Result<Vec<PriceBar>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, open, high, low, close, adj_close, volume, dividends, stock_splits
             FROM ticker_prices WHERE ticker = ?1 ORDER BY date",
        )?;
        let bars = stmt
            .query_map(params![ticker], |row| {
                Ok(PriceBar {
                    date: row.get(0)?,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    adj_close: row.get(5)?,
                    volume: row.get(6)?,
                    dividends: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
                    stock_splits: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bars)
    }

    /// The stored metadata row for a ticker, if any.
    pub fn load_info(&self, ticker: &str) -> Result<Option<TickerInfo>, StorageError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT raw_info_json FROM ticker_info WHERE ticker = ?1",
                params![ticker],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => {
                let payload = serde_json::from_str(&raw)?;
                Ok(Some(TickerInfo::from_payload(ticker, payload)))
            }
            None => Ok(None),
        }
    }
}

fn count_prices(conn: &Connection, ticker: &str) -> rusqlite::Result<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM ticker_prices WHERE ticker = ?1",
        params![ticker],
        |row| row.get(0),
    )?;
    Ok(n as usize)
}
