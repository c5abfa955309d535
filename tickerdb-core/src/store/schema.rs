//! SQLite schema for the ticker store.
//!
//! `ticker_info` holds one row per ticker; `ticker_prices` one row per
//! `(ticker, date)`. Dates are ISO `YYYY-MM-DD` text so the composite key
//! compares and sorts correctly.

use rusqlite::{params, Connection};

pub const TICKER_INFO: &str = "ticker_info";
pub const TICKER_PRICES: &str = "ticker_prices";

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS ticker_info (
    ticker TEXT PRIMARY KEY,
    short_name TEXT,
    long_name TEXT,
    quote_type TEXT,
    currency TEXT,
    exchange TEXT,
    market_cap REAL,
    sector TEXT,
    industry TEXT,
    country TEXT,
    website TEXT,
    raw_info_json TEXT NOT NULL,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS ticker_prices (
    ticker TEXT NOT NULL,
    date TEXT NOT NULL,
    open REAL,
    high REAL,
    low REAL,
    close REAL,
    adj_close REAL,
    volume INTEGER,
    dividends REAL,
    stock_splits REAL,
    PRIMARY KEY (ticker, date),
    FOREIGN KEY (ticker) REFERENCES ticker_info (ticker)
);
";

/// Insert a metadata row, overwriting every non-key column on conflict.
pub(crate) const UPSERT_INFO: &str = "
INSERT INTO ticker_info (
    ticker, short_name, long_name, quote_type, currency, exchange, market_cap,
    sector, industry, country, website, raw_info_json, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, CURRENT_TIMESTAMP)
ON CONFLICT(ticker) DO UPDATE SET
    short_name = excluded.short_name,
    long_name = excluded.long_name,
    quote_type = excluded.quote_type,
    currency = excluded.currency,
    exchange = excluded.exchange,
    market_cap = excluded.market_cap,
    sector = excluded.sector,
    industry = excluded.industry,
    country = excluded.country,
    website = excluded.website,
    raw_info_json = excluded.raw_info_json,
    updated_at = CURRENT_TIMESTAMP
";

/// Insert a price bar, overwriting the OHLCV columns on `(ticker, date)` conflict.
pub(crate) const UPSERT_PRICE: &str = "
INSERT INTO ticker_prices (
    ticker, date, open, high, low, close, adj_close, volume, dividends, stock_splits
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT(ticker, date) DO UPDATE SET
    open = excluded.open,
    high = excluded.high,
    low = excluded.low,
    close = excluded.close,
    adj_close = excluded.adj_close,
    volume = excluded.volume,
    dividends = excluded.dividends,
    stock_splits = excluded.stock_splits
";

/// Create both tables if they are absent.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLES)
}

pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

/// Primary-key columns of a table, in key order.
pub fn primary_key(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut cols: Vec<(i64, String)> = stmt
        .query_map([], |row| Ok((row.get::<_, i64>("pk")?, row.get::<_, String>("name")?)))?
        .collect::<rusqlite::Result<_>>()?;
    cols.retain(|(pk, _)| *pk > 0);
    cols.sort_by_key(|(pk, _)| *pk);
    Ok(cols.into_iter().map(|(_, name)| name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert!(table_exists(&conn, TICKER_INFO).unwrap());
        assert!(table_exists(&conn, TICKER_PRICES).unwrap());
        assert!(!table_exists(&conn, "nope").unwrap());
    }

    #[test]
    fn price_key_is_ticker_then_date() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(primary_key(&conn, TICKER_PRICES).unwrap(), vec!["ticker", "date"]);
        assert_eq!(primary_key(&conn, TICKER_INFO).unwrap(), vec!["ticker"]);
    }
}
