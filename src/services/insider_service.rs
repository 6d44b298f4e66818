//! Insider Service
//!
//! Per-insider purchase statistics. The trade table itself is an ordinary
//! view run through [`crate::services::ScreenerService`].

use crate::api::types::InsiderStats;
use crate::error::{AppError, Result};
use crate::state::AppState;
use tracing::info;

pub struct InsiderService;

impl InsiderService {
    /// `GET /stocks/insider/stats/:name`
    pub async fn stats(state: &AppState, insider_name: &str) -> Result<InsiderStats> {
        let name = insider_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Insider name is required".to_string()));
        }

        info!("InsiderService::stats - {}", name);

        let path = format!("stocks/insider/stats/{}", urlencoding::encode(name));
        state.client.get(&path, Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::state;
    use crate::table::format;
    use serde_json::json;

    #[tokio::test]
    async fn test_stats_encodes_name() {
        let (state, transport) = state();
        transport.push(
            200,
            json!({
                "stats": {"totalPurchases": 4, "oneMonthWins": 3, "threeMonthWins": 0},
                "transactions": [{"stock": "AAPL"}]
            }),
        );

        let stats = InsiderService::stats(&state, "COOK TIMOTHY D").await.unwrap();

        assert_eq!(transport.last_request().unwrap().path, "stocks/insider/stats/COOK%20TIMOTHY%20D");
        let summary = stats.summary();
        assert_eq!(
            format::win_rate(summary.one_month_wins, summary.total_purchases),
            "3/4 (75.00%)"
        );
        assert_eq!(stats.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let (state, transport) = state();
        assert!(InsiderService::stats(&state, "  ").await.is_err());
        assert_eq!(transport.request_count(), 0);
    }
}
