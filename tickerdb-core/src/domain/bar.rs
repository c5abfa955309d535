//! PriceBar: one daily OHLCV row for a ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar as returned by a provider, before it is keyed by ticker.
///
/// Fields the provider left empty stay `None` and are stored as NULL.
/// `dividends` and `stock_splits` are `0.0` on dates without a corporate action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
    pub dividends: f64,
    pub stock_splits: f64,
}

impl PriceBar {
    /// A bar with every OHLCV field set and no corporate actions.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: i64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            adj_close: Some(close),
            volume: Some(volume),
            dividends: 0.0,
            stock_splits: 0.0,
        }
    }

    /// True when no OHLCV field carries a value (non-trading placeholder).
    pub fn is_empty(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.volume.is_none()
    }

    /// True when some, but not all, OHLCV fields are missing.
    pub fn is_partial(&self) -> bool {
        !self.is_empty()
            && (self.open.is_none()
                || self.high.is_none()
                || self.low.is_none()
                || self.close.is_none()
                || self.volume.is_none())
    }
}
