//! Wire types shared by the services

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One table row as the server sent it; the schema is view specific
pub type Row = Map<String, Value>;

/// Server-paged response (`{data, totalPages, totalCount}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub total_count: usize,
}

impl<T> Paged<T> {
    /// Wrap a complete, unpaged result
    pub fn complete(data: Vec<T>) -> Self {
        let total_count = data.len();
        Self {
            data,
            total_pages: 1,
            total_count,
        }
    }
}

/// Login / register payload
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Login / register response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// `GET /auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kind of instrument a watchlist entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    UsStock,
    InStock,
    Crypto,
    #[serde(other)]
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::UsStock => "us_stock",
            EntityType::InStock => "in_stock",
            EntityType::Crypto => "crypto",
            EntityType::Other => "other",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us_stock" | "us" => Ok(EntityType::UsStock),
            "in_stock" | "in" => Ok(EntityType::InStock),
            "crypto" => Ok(EntityType::Crypto),
            other => Err(format!("Unknown entity type '{}' (expected us_stock, in_stock or crypto)", other)),
        }
    }
}

/// Quote currency of crypto prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base {
    #[default]
    Usd,
    Eth,
    Btc,
}

impl Base {
    pub fn as_str(&self) -> &'static str {
        match self {
            Base::Usd => "usd",
            Base::Eth => "eth",
            Base::Btc => "btc",
        }
    }

    /// Endpoint suffix for per-base variants (`historical_eth`, `heikin-ashi-btc`, ...)
    pub fn suffix(&self, separator: char) -> String {
        match self {
            Base::Usd => String::new(),
            other => format!("{}{}", separator, other.as_str()),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Base {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usd" => Ok(Base::Usd),
            "eth" => Ok(Base::Eth),
            "btc" => Ok(Base::Btc),
            other => Err(format!("Unknown base currency '{}' (expected usd, eth or btc)", other)),
        }
    }
}

/// Server-owned watchlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub entity_type: EntityType,
    pub symbol: String,
    #[serde(default)]
    pub added_at: Option<String>,
}

/// One point of a historical series (price plus server-computed indicators)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub datetime: String,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub ema: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub force_index_7_week: Option<f64>,
    #[serde(default)]
    pub force_index_52_week: Option<f64>,
    #[serde(default)]
    pub williams_r: Option<f64>,
    #[serde(default)]
    pub williams_r_ema: Option<f64>,
}

/// `GET /{crypto|in_stocks|stocks}/:symbol/historical`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalData {
    #[serde(default)]
    pub stock_name: Option<String>,
    #[serde(default)]
    pub crypto_name: Option<String>,
    #[serde(default)]
    pub current_data: Option<Value>,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
    #[serde(default)]
    pub technical_data: Vec<PricePoint>,
    #[serde(default)]
    pub data: Vec<PricePoint>,
}

impl HistoricalData {
    pub fn name(&self) -> Option<&str> {
        self.stock_name.as_deref().or(self.crypto_name.as_deref())
    }

    /// Chart series; older endpoints return it under `data`
    pub fn points(&self) -> &[PricePoint] {
        if !self.price_history.is_empty() {
            &self.price_history
        } else {
            &self.data
        }
    }

    /// Indicator series, falling back to the price series that carries them inline
    pub fn indicators(&self) -> &[PricePoint] {
        if !self.technical_data.is_empty() {
            &self.technical_data
        } else {
            self.points()
        }
    }
}

/// Heikin-Ashi candle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeikinAshiCandle {
    pub datetime: String,
    pub ha_open: f64,
    pub ha_high: f64,
    pub ha_low: f64,
    pub ha_close: f64,
}

impl HeikinAshiCandle {
    pub fn is_bullish(&self) -> bool {
        self.ha_close > self.ha_open
    }

    pub fn body_top(&self) -> f64 {
        self.ha_open.max(self.ha_close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.ha_open.min(self.ha_close)
    }
}

/// Trend reversal reported alongside the candles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorChange {
    pub datetime: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /crypto/:symbol/heikin-ashi(-eth|-btc)`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeikinAshiData {
    #[serde(default)]
    pub ha_data: Vec<HeikinAshiCandle>,
    #[serde(default)]
    pub color_changes: Vec<ColorChange>,
}

/// Insider track record summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsiderStatsSummary {
    pub total_purchases: u64,
    pub one_month_wins: u64,
    pub three_month_wins: u64,
    pub avg_one_month_return: Option<f64>,
    pub avg_three_month_return: Option<f64>,
}

/// `GET /stocks/insider/stats/:name`
///
/// The summary arrives either nested under `stats` or inline at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsiderStats {
    #[serde(default)]
    pub stats: Option<InsiderStatsSummary>,
    #[serde(flatten)]
    pub inline: InsiderStatsSummary,
    #[serde(default)]
    pub transactions: Vec<Row>,
}

impl InsiderStats {
    pub fn summary(&self) -> &InsiderStatsSummary {
        self.stats.as_ref().unwrap_or(&self.inline)
    }
}
