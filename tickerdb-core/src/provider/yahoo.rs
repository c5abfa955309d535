//! Yahoo Finance data provider.
//!
//! Both metadata and daily bars come from Yahoo's v8 chart API: metadata is
//! the `meta` block of a short-range chart request, history is a daily chart
//! over the requested range with dividend and split events attached.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! Requests are made once; failures are reported, not retried.

use super::{DataProvider, ProviderError};
use crate::domain::{InfoPayload, Period, PriceBar};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Map<String, Value>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
    #[serde(default)]
    events: Events,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Events {
    dividends: HashMap<String, DividendEvent>,
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

/// Connection settings for the Yahoo provider.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: reqwest::Url,
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Result<Self, ProviderError> {
        let base_url = reqwest::Url::parse(&config.base_url).map_err(|e| {
            ProviderError::NetworkUnreachable(format!("invalid base url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::NetworkUnreachable(format!(
                "invalid base url '{}'",
                config.base_url
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| ProviderError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Build the chart API URL: `{base}/v8/finance/chart/{symbol}?{params}`.
    fn chart_url(&self, symbol: &str, params: &[(&str, &str)]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url
    }

    fn get_chart(&self, symbol: &str, params: &[(&str, &str)]) -> Result<ChartData, ProviderError> {
        let url = self.chart_url(symbol, params);
        debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;
        map_status(symbol, resp.status(), resp.headers())?;

        let chart: ChartResponse = resp.json().map_err(|e| {
            ProviderError::MalformedResponse(format!("failed to parse response for {symbol}: {e}"))
        })?;
        extract_chart(symbol, chart)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_info(&self, symbol: &str) -> Result<InfoPayload, ProviderError> {
        let data = self.get_chart(symbol, &[("range", "5d"), ("interval", "1d")])?;
        parse_info(symbol, data)
    }

    fn fetch_history(&self, symbol: &str, period: Period) -> Result<Vec<PriceBar>, ProviderError> {
        let data = self.get_chart(
            symbol,
            &[
                ("range", period.as_str()),
                ("interval", "1d"),
                ("events", "div,splits"),
                ("includeAdjustedClose", "true"),
            ],
        )?;
        parse_history(data)
    }
}

/// Map a non-success HTTP status to a provider error.
fn map_status(
    symbol: &str,
    status: reqwest::StatusCode,
    headers: &reqwest::header::HeaderMap,
) -> Result<(), ProviderError> {
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = headers
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ProviderError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        return Err(ProviderError::Http {
            status: status.as_u16(),
            symbol: symbol.to_string(),
        });
    }

    Ok(())
}

/// Pull the single result out of a chart response, mapping API-level errors.
fn extract_chart(symbol: &str, resp: ChartResponse) -> Result<ChartData, ProviderError> {
    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => ProviderError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => ProviderError::MalformedResponse(format!("{}: {}", err.code, err.description)),
        None => ProviderError::MalformedResponse("empty result with no error".into()),
    })?;

    result
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::SymbolNotFound {
            symbol: symbol.to_string(),
        })
}

/// Turn the chart `meta` block into an info payload.
///
/// The chart API names some fields differently from the quote API; the
/// quote-style keys are filled in so the row mapping sees one vocabulary.
fn parse_info(symbol: &str, data: ChartData) -> Result<InfoPayload, ProviderError> {
    let mut info = data.meta;
    if info.is_empty() {
        return Err(ProviderError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }

    for (from, to) in [("exchangeName", "exchange"), ("instrumentType", "quoteType")] {
        if !info.contains_key(to) {
            if let Some(v) = info.get(from).cloned() {
                info.insert(to.to_string(), v);
            }
        }
    }
    Ok(info)
}

/// Parse the chart data into daily bars in exchange-local dates.
fn parse_history(data: ChartData) -> Result<Vec<PriceBar>, ProviderError> {
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let gmtoffset = data.meta.get("gmtoffset").and_then(Value::as_i64).unwrap_or(0);
    let local_date = |ts: i64| -> Result<NaiveDate, ProviderError> {
        chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| ProviderError::MalformedResponse(format!("invalid timestamp: {ts}")))
    };

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut dividends: HashMap<NaiveDate, f64> = HashMap::new();
    for event in data.events.dividends.values() {
        *dividends.entry(local_date(event.date)?).or_default() += event.amount;
    }
    let mut splits: HashMap<NaiveDate, f64> = HashMap::new();
    for event in data.events.splits.values() {
        if event.denominator != 0.0 {
            splits.insert(local_date(event.date)?, event.numerator / event.denominator);
        }
    }

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = local_date(ts)?;
        let bar = PriceBar {
            date,
            open: quote.open.get(i).copied().flatten(),
            high: quote.high.get(i).copied().flatten(),
            low: quote.low.get(i).copied().flatten(),
            close: quote.close.get(i).copied().flatten(),
            adj_close: adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten()),
            volume: quote.volume.get(i).copied().flatten().map(|v| v.round() as i64),
            dividends: dividends.get(&date).copied().unwrap_or(0.0),
            stock_splits: splits.get(&date).copied().unwrap_or(0.0),
        };

        // Skip bars where all OHLCV are None (holidays/non-trading days)
        if bar.is_empty() {
            debug!("skipping empty bar on {date}");
            continue;
        }
        if bar.is_partial() {
            warn!("partial bar on {date}: missing fields stored as NULL");
        }

        // The live session can repeat the last trading date; keep the newest.
        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }

    Ok(bars)
}
