//! TickerInfo: per-ticker metadata row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw key/value metadata payload from a provider.
pub type InfoPayload = Map<String, Value>;

/// One `ticker_info` row: the mapped columns plus the full payload as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub quote_type: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub raw: InfoPayload,
}

impl TickerInfo {
    /// Map a provider payload onto the row. Missing keys become `None`.
    pub fn from_payload(ticker: &str, payload: InfoPayload) -> Self {
        Self {
            ticker: ticker.to_string(),
            short_name: text(&payload, "shortName"),
            long_name: text(&payload, "longName"),
            quote_type: text(&payload, "quoteType"),
            currency: text(&payload, "currency"),
            exchange: text(&payload, "exchange"),
            market_cap: payload.get("marketCap").and_then(Value::as_f64),
            sector: text(&payload, "sector"),
            industry: text(&payload, "industry"),
            country: text(&payload, "country"),
            website: text(&payload, "website"),
            raw: payload,
        }
    }

    /// The payload serialized as JSON, non-ASCII escaped.
    pub fn raw_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(&self.raw)?;
        Ok(escape_non_ascii(&json))
    }
}

fn text(payload: &InfoPayload, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// serde_json has no ensure_ascii switch; non-ASCII chars only occur inside
// string literals, so \uXXXX escapes keep the JSON valid.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
