//! End-to-end ingest/check behavior against a fixture provider.

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tickerdb_core::domain::InfoPayload;
use tickerdb_core::provider::{DataProvider, ProviderError};
use tickerdb_core::store::schema;
use tickerdb_core::{
    check_ticker, ingest_ticker, Error, Period, PriceBar, TickerStore, UsageError,
};

/// In-memory provider: per-symbol metadata and bars, editable between runs.
#[derive(Default)]
struct FixtureProvider {
    info: Mutex<HashMap<String, InfoPayload>>,
    bars: Mutex<HashMap<String, Vec<PriceBar>>>,
}

impl FixtureProvider {
    fn with(self, symbol: &str, name: &str, bars: Vec<PriceBar>) -> Self {
        self.set_info(symbol, name);
        self.bars.lock().unwrap().insert(symbol.to_string(), bars);
        self
    }

    fn set_info(&self, symbol: &str, name: &str) {
        let payload = match json!({ "shortName": name, "currency": "USD", "exchange": "NYQ" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        self.info.lock().unwrap().insert(symbol.to_string(), payload);
    }

    fn set_bars(&self, symbol: &str, bars: Vec<PriceBar>) {
        self.bars.lock().unwrap().insert(symbol.to_string(), bars);
    }
}

impl DataProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch_info(&self, symbol: &str) -> Result<InfoPayload, ProviderError> {
        self.info
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    fn fetch_history(&self, symbol: &str, _period: Period) -> Result<Vec<PriceBar>, ProviderError> {
        Ok(self.bars.lock().unwrap().get(symbol).cloned().unwrap_or_default())
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
}

fn bars(days: std::ops::RangeInclusive<u32>, base: f64) -> Vec<PriceBar> {
    days.map(|d| {
        let close = base + d as f64;
        PriceBar::new(day(d), close - 0.5, close + 1.0, close - 1.0, close, 1_000 * d as i64)
    })
    .collect()
}

fn temp_db() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_data.db");
    (dir, path)
}

#[test]
fn ingest_twice_is_idempotent() {
    let (_dir, path) = temp_db();
    let provider = FixtureProvider::default().with("SPY", "SPDR S&P 500", bars(1..=5, 300.0));
    let mut store = TickerStore::open(&path).unwrap();

    let first = ingest_ticker(&provider, &mut store, "SPY", Period::Max).unwrap();
    let after_first = store.load_prices("SPY").unwrap();
    let info_first = store.load_info("SPY").unwrap();

    let second = ingest_ticker(&provider, &mut store, "SPY", Period::Max).unwrap();

    assert_eq!(first.bars_inserted, 5);
    assert_eq!(first.bars_updated, 0);
    assert_eq!(second.bars_written, 5);
    assert_eq!(second.bars_inserted, 0);
    assert_eq!(second.bars_updated, 5);
    assert_eq!(store.load_prices("SPY").unwrap(), after_first);
    assert_eq!(store.load_info("SPY").unwrap(), info_first);
}

#[test]
fn ingesting_another_ticker_leaves_first_untouched() {
    let (_dir, path) = temp_db();
    let provider = FixtureProvider::default()
        .with("AAA", "Alpha", bars(1..=5, 10.0))
        .with("BBB", "Beta", bars(3..=7, 50.0));
    let mut store = TickerStore::open(&path).unwrap();

    ingest_ticker(&provider, &mut store, "AAA", Period::OneYear).unwrap();
    let aaa_before = store.load_prices("AAA").unwrap();
    let aaa_info_before = store.load_info("AAA").unwrap();

    ingest_ticker(&provider, &mut store, "BBB", Period::OneYear).unwrap();

    assert_eq!(store.load_prices("AAA").unwrap(), aaa_before);
    assert_eq!(store.load_info("AAA").unwrap(), aaa_info_before);
    assert_eq!(store.price_count("BBB").unwrap(), 5);
}

#[test]
fn changed_bar_overwrites_without_duplicating() {
    let (_dir, path) = temp_db();
    let provider = FixtureProvider::default().with("SPY", "Old", bars(1..=3, 100.0));
    let mut store = TickerStore::open(&path).unwrap();
    ingest_ticker(&provider, &mut store, "SPY", Period::Max).unwrap();

    let mut revised = bars(1..=4, 100.0);
    revised[1].close = Some(999.0);
    provider.set_bars("SPY", revised);
    provider.set_info("SPY", "New");

    let report = ingest_ticker(&provider, &mut store, "SPY", Period::Max).unwrap();
    assert_eq!(report.bars_inserted, 1);
    assert_eq!(report.bars_updated, 3);

    let stored = store.load_prices("SPY").unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored.iter().filter(|b| b.date == day(2)).count(), 1);
    assert_eq!(stored[1].close, Some(999.0));
    assert_eq!(
        store.load_info("SPY").unwrap().unwrap().short_name.as_deref(),
        Some("New")
    );
}

#[test]
fn check_reports_summary_after_ingest() {
    let (_dir, path) = temp_db();
    let provider = FixtureProvider::default().with("X", "Example", bars(1..=5, 20.0));
    {
        let mut store = TickerStore::open(&path).unwrap();
        ingest_ticker(&provider, &mut store, "X", Period::Max).unwrap();
    }

    let summary = check_ticker(&path, "X").unwrap().unwrap();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.first_date, day(1));
    assert_eq!(summary.last_date, day(5));
    assert_eq!(summary.latest_close, Some(25.0));
    assert_eq!(summary.short_name.as_deref(), Some("Example"));
}

#[test]
fn check_unknown_ticker_is_none() {
    let (_dir, path) = temp_db();
    let provider = FixtureProvider::default().with("X", "Example", bars(1..=2, 20.0));
    {
        let mut store = TickerStore::open(&path).unwrap();
        ingest_ticker(&provider, &mut store, "X", Period::Max).unwrap();
    }

    assert_eq!(check_ticker(&path, "NEVER").unwrap(), None);
}

#[test]
fn check_missing_database_is_storage_error_and_creates_nothing() {
    let (_dir, path) = temp_db();
    let err = check_ticker(&path, "X").unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(!path.exists());
}

#[test]
fn unknown_symbol_fails_without_touching_other_rows() {
    let (_dir, path) = temp_db();
    let provider = FixtureProvider::default().with("AAA", "Alpha", bars(1..=3, 10.0));
    let mut store = TickerStore::open(&path).unwrap();
    ingest_ticker(&provider, &mut store, "AAA", Period::Max).unwrap();
    let before = store.load_prices("AAA").unwrap();

    let err = ingest_ticker(&provider, &mut store, "ZZZ", Period::Max).unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::SymbolNotFound { .. })
    ));
    assert_eq!(store.load_prices("AAA").unwrap(), before);
    assert!(store.load_info("ZZZ").unwrap().is_none());
}

#[test]
fn empty_history_fails_but_keeps_metadata() {
    let (_dir, path) = temp_db();
    let provider = FixtureProvider::default().with("NEW", "Fresh listing", Vec::new());
    let mut store = TickerStore::open(&path).unwrap();

    let err = ingest_ticker(&provider, &mut store, "NEW", Period::FiveDays).unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::EmptyHistory { period: Period::FiveDays, .. })
    ));
    assert!(store.load_info("NEW").unwrap().is_some());
    assert_eq!(store.price_count("NEW").unwrap(), 0);
}

#[test]
fn blank_ticker_is_usage_error() {
    let mut store = TickerStore::open_in_memory().unwrap();
    let err = ingest_ticker(&FixtureProvider::default(), &mut store, "  ", Period::Max).unwrap_err();
    assert!(matches!(err, Error::Usage(UsageError::EmptyTicker)));
}

#[test]
fn ticker_is_trimmed_before_storing() {
    let provider = FixtureProvider::default().with("SPY", "SPDR", bars(1..=2, 1.0));
    let mut store = TickerStore::open_in_memory().unwrap();
    let report = ingest_ticker(&provider, &mut store, " SPY ", Period::Max).unwrap();
    assert_eq!(report.ticker, "SPY");
    assert_eq!(store.price_count("SPY").unwrap(), 2);
}

#[test]
fn ingest_report_summary_line() {
    let provider = FixtureProvider::default().with("SPY", "SPDR", bars(2..=4, 1.0));
    let mut store = TickerStore::open_in_memory().unwrap();
    let report = ingest_ticker(&provider, &mut store, "SPY", Period::Max).unwrap();
    assert_eq!(
        report.to_string(),
        "Upserted SPY: 3 price rows (3 new, 0 updated) from 2020-01-02 to 2020-01-04"
    );
}

#[test]
fn ingest_creates_database_with_expected_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("prices.db");
    let provider = FixtureProvider::default().with("SPY", "SPDR", bars(1..=1, 1.0));
    let mut store = TickerStore::open(&path).unwrap();
    ingest_ticker(&provider, &mut store, "SPY", Period::Max).unwrap();
    drop(store);

    assert!(path.is_file());
    let conn = rusqlite::Connection::open(&path).unwrap();
    assert_eq!(
        schema::primary_key(&conn, schema::TICKER_PRICES).unwrap(),
        vec!["ticker", "date"]
    );
}
