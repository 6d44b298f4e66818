//! Detail Service
//!
//! Historical price/indicator series and Heikin-Ashi candles for a single
//! symbol.

use crate::api::types::{Base, HeikinAshiData, HistoricalData};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::table::DateRange;
use chrono::Local;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Default chart window in days
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Market a symbol is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    UsStock,
    InStock,
    Crypto(Base),
}

impl Asset {
    fn historical_path(&self, symbol: &str) -> String {
        let symbol = urlencoding::encode(symbol);
        match self {
            Asset::UsStock => format!("stocks/{}/historical", symbol),
            Asset::InStock => format!("in_stocks/{}/historical", symbol),
            Asset::Crypto(base) => format!("crypto/{}/historical{}", symbol, base.suffix('_')),
        }
    }
}

/// Heikin-Ashi aggregation period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    #[default]
    ThreeDays,
    TwoWeeks,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::ThreeDays => "3d",
            Timeframe::TwoWeeks => "2w",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3d" => Ok(Timeframe::ThreeDays),
            "2w" => Ok(Timeframe::TwoWeeks),
            other => Err(format!("Unknown timeframe '{}' (expected 3d or 2w)", other)),
        }
    }
}

pub struct DetailService;

impl DetailService {
    /// Price history and indicators over `range` (last 30 days by default)
    pub async fn historical(
        state: &AppState,
        asset: Asset,
        symbol: &str,
        range: Option<DateRange>,
    ) -> Result<HistoricalData> {
        let symbol = Self::normalize(symbol)?;
        let range = range.unwrap_or_else(|| DateRange::last_days(Local::now().date_naive(), DEFAULT_HISTORY_DAYS));

        info!(
            "DetailService::historical - {:?} {} {} to {}",
            asset, symbol, range.start, range.end
        );

        let query = vec![
            ("start_date".to_string(), range.start.format("%Y-%m-%d").to_string()),
            ("end_date".to_string(), range.end.format("%Y-%m-%d").to_string()),
        ];
        state.client.get(&asset.historical_path(&symbol), query).await
    }

    /// Heikin-Ashi candles and colour changes for a crypto symbol
    pub async fn heikin_ashi(state: &AppState, symbol: &str, base: Base, timeframe: Timeframe) -> Result<HeikinAshiData> {
        let symbol = Self::normalize(symbol)?;
        info!("DetailService::heikin_ashi - {} {} {}", symbol, base, timeframe);

        let path = format!(
            "crypto/{}/heikin-ashi{}",
            urlencoding::encode(&symbol),
            base.suffix('-')
        );
        let data: HeikinAshiData = state
            .client
            .get(&path, vec![("timeframe".to_string(), timeframe.to_string())])
            .await?;

        if data.ha_data.is_empty() {
            return Err(AppError::NotFound(
                "No Heikin-Ashi data available for this timeframe".to_string(),
            ));
        }

        Ok(data)
    }

    fn normalize(symbol: &str) -> Result<String> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(AppError::Validation("Symbol is required".to_string()));
        }
        Ok(symbol.to_uppercase())
    }
}
