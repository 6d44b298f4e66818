//! Screener Service
//!
//! Runs the fetch cycle of a [`TableView`]. The view lock is held only to
//! issue the ticket and to publish the response, never across the request,
//! so a newer fetch can always be issued while an older one is in flight.

use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::state::AppState;
use crate::table::{FetchOutcome, TableView};
use parking_lot::Mutex;
use tracing::info;

pub struct ScreenerService;

impl ScreenerService {
    /// Fetch the view's current request and publish the result
    pub async fn refresh(state: &AppState, view: &Mutex<TableView>) -> FetchOutcome {
        let (ticket, request) = view.lock().begin_fetch();
        info!("ScreenerService::refresh - {} {:?}", request.path, ticket);

        let result = state
            .client
            .execute(ApiRequest::new(Method::Get, request.path).with_query(request.query))
            .await;

        view.lock().complete(ticket, result)
    }

    /// Fetch only when a state change invalidated the dataset
    pub async fn refresh_if_stale(state: &AppState, view: &Mutex<TableView>) -> Option<FetchOutcome> {
        if !view.lock().needs_fetch() {
            return None;
        }
        Some(Self::refresh(state, view).await)
    }

    /// Open a view with its saved preferences restored
    pub fn open(state: &AppState, kind: crate::views::ViewKind) -> Result<TableView> {
        let mut view = kind.open();
        if let Some(prefs) = state.sqlite.load_preferences(view.config().name)? {
            view.restore(prefs);
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiResponse, Transport};
    use crate::config::Config;
    use crate::error::AppError;
    use crate::state::testing::state;
    use crate::table::ViewPreferences;
    use crate::views::ViewKind;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    /// Answers each request after its own delay
    struct DelayedTransport {
        script: parking_lot::Mutex<VecDeque<(u64, Value)>>,
    }

    #[async_trait]
    impl Transport for DelayedTransport {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse> {
            let next = self.script.lock().pop_front();
            let (delay, body) = next.ok_or_else(|| AppError::Network("no scripted response".to_string()))?;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(ApiResponse { status: 200, body })
        }
    }

    fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_date_change_fetches_once_from_first_page() {
        let (state, transport) = state();
        let view = Mutex::new(ViewKind::UsStocks.open());

        transport.push(200, json!({"data": [{"stock": "AAPL"}], "totalPages": 5, "totalCount": 420}));
        assert_eq!(ScreenerService::refresh_if_stale(&state, &view).await, Some(FetchOutcome::Applied));

        view.lock().set_page(3);
        transport.push(200, json!({"data": [{"stock": "MSFT"}], "totalPages": 5, "totalCount": 420}));
        ScreenerService::refresh_if_stale(&state, &view).await;
        assert_eq!(transport.request_count(), 2);

        view.lock().set_date(NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(view.lock().state().window().page, 1);

        transport.push(200, json!({"data": [{"stock": "GOOG"}], "totalPages": 4, "totalCount": 390}));
        ScreenerService::refresh_if_stale(&state, &view).await;
        assert_eq!(ScreenerService::refresh_if_stale(&state, &view).await, None);
        assert_eq!(transport.request_count(), 3);

        let request = transport.last_request().unwrap();
        assert_eq!(request.path, "stocks/latest");
        assert_eq!(query_value(&request.query, "page"), Some("1"));
        assert_eq!(query_value(&request.query, "date"), Some("2024-03-01"));
        assert_eq!(view.lock().total_count(), 390);
    }

    #[tokio::test]
    async fn test_last_issued_request_wins() {
        let transport = Arc::new(DelayedTransport {
            script: parking_lot::Mutex::new(VecDeque::from(vec![
                (50, json!([{"stock": "OLD"}])),
                (0, json!([{"stock": "NEW"}])),
            ])),
        });
        let state = AppState::with_transport(Config::new("/tmp/screener-test"), transport).unwrap();
        let view = Mutex::new(ViewKind::Crypto(crate::api::types::Base::Usd).open());

        let (slow, fast) = tokio::join!(
            ScreenerService::refresh(&state, &view),
            ScreenerService::refresh(&state, &view)
        );

        assert_eq!(slow, FetchOutcome::Superseded);
        assert_eq!(fast, FetchOutcome::Applied);
        assert_eq!(view.lock().rows()[0]["stock"], "NEW");
    }

    #[tokio::test]
    async fn test_failure_keeps_rows_and_reports() {
        let (state, transport) = state();
        let view = Mutex::new(ViewKind::InsiderTrades.open());

        transport.push(200, json!({"data": [{"stock": "AAPL"}], "totalPages": 1, "totalCount": 1}));
        ScreenerService::refresh(&state, &view).await;

        transport.push(500, json!({"error": "Database unavailable"}));
        let outcome = ScreenerService::refresh(&state, &view).await;

        assert_eq!(outcome, FetchOutcome::Failed("Database unavailable".to_string()));
        assert_eq!(view.lock().rows().len(), 1);
        assert_eq!(view.lock().last_error(), Some("Database unavailable"));
    }

    #[tokio::test]
    async fn test_open_restores_saved_preferences() {
        let (state, _) = state();
        let prefs = ViewPreferences {
            page_size: 25,
            hidden_columns: ["stock_name".to_string()].into_iter().collect(),
            ..Default::default()
        };
        state.sqlite.save_preferences("in_stocks", &prefs).unwrap();

        let view = ScreenerService::open(&state, ViewKind::InStocks).unwrap();

        assert_eq!(view.state().window().page_size, 25);
        assert!(view.state().is_hidden("stock_name"));
    }
}
