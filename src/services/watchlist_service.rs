//! Watchlist Service
//!
//! The watchlist is owned by the server. The cached copy in `AppState` is only
//! replaced by a full refetch after every mutation.

use crate::api::types::{EntityType, WatchlistEntry};
use crate::error::{AppError, Result};
use crate::state::AppState;
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use tracing::{info, warn};

const NOT_LOGGED_IN: &str = "Not logged in";
const ALREADY_PRESENT: &str = "Already in watchlist";
const API_ERROR: &str = "API error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkAddFailure {
    pub symbol: String,
    pub reason: String,
}

/// Outcome of a bulk add, per symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkAddResult {
    pub success: Vec<String>,
    pub failures: Vec<BulkAddFailure>,
}

impl BulkAddResult {
    fn fail(&mut self, symbol: &str, reason: &str) {
        self.failures.push(BulkAddFailure {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        });
    }
}

pub struct WatchlistService;

impl WatchlistService {
    /// Cached entries
    pub fn list(state: &AppState) -> Vec<WatchlistEntry> {
        state.watchlist()
    }

    /// Replace the cache with `GET /watchlist`; the cache is kept on failure
    pub async fn refresh(state: &AppState) -> Result<Vec<WatchlistEntry>> {
        info!("WatchlistService::refresh");
        Self::require_login(state)?;

        let entries: Vec<WatchlistEntry> = state.client.get("watchlist", Vec::new()).await?;
        *state.watchlist.write() = entries.clone();
        Ok(entries)
    }

    pub fn contains(state: &AppState, entity_type: EntityType, symbol: &str) -> bool {
        state
            .watchlist
            .read()
            .iter()
            .any(|e| e.entity_type == entity_type && e.symbol == symbol)
    }

    pub async fn add(state: &AppState, entity_type: EntityType, symbol: &str) -> Result<()> {
        info!("WatchlistService::add - {} {}", entity_type, symbol);
        Self::require_login(state)?;

        state
            .client
            .post::<serde_json::Value>("watchlist", Self::body(entity_type, symbol))
            .await?;
        Self::refetch(state).await;
        Ok(())
    }

    pub async fn remove(state: &AppState, entity_type: EntityType, symbol: &str) -> Result<()> {
        info!("WatchlistService::remove - {} {}", entity_type, symbol);
        Self::require_login(state)?;

        state
            .client
            .delete("watchlist", Self::body(entity_type, symbol))
            .await?;
        Self::refetch(state).await;
        Ok(())
    }

    /// Add every symbol in free text (comma or whitespace separated)
    ///
    /// Symbols already present are skipped; the list is refetched once at
    /// the end.
    pub async fn bulk_add(state: &AppState, entity_type: EntityType, text: &str) -> BulkAddResult {
        let symbols = parse_symbols(text);
        info!("WatchlistService::bulk_add - {} {} symbols", entity_type, symbols.len());

        let mut result = BulkAddResult::default();

        if !state.is_authenticated() {
            for symbol in &symbols {
                result.fail(symbol, NOT_LOGGED_IN);
            }
            return result;
        }

        for symbol in &symbols {
            if Self::contains(state, entity_type, symbol) {
                result.fail(symbol, ALREADY_PRESENT);
                continue;
            }

            match state
                .client
                .post::<serde_json::Value>("watchlist", Self::body(entity_type, symbol))
                .await
            {
                Ok(_) => result.success.push(symbol.clone()),
                Err(e) => {
                    warn!("Failed to add {} to watchlist: {}", symbol, e);
                    result.fail(symbol, API_ERROR);
                }
            }
        }

        Self::refetch(state).await;
        result
    }

    async fn refetch(state: &AppState) {
        if let Err(e) = Self::refresh(state).await {
            warn!("Failed to refresh watchlist: {}", e);
        }
    }

    fn require_login(state: &AppState) -> Result<()> {
        if state.is_authenticated() {
            Ok(())
        } else {
            Err(AppError::Auth(NOT_LOGGED_IN.to_string()))
        }
    }

    fn body(entity_type: EntityType, symbol: &str) -> serde_json::Value {
        json!({ "entity_type": entity_type.as_str(), "symbol": symbol })
    }
}

/// Split on commas and whitespace, upper-case, drop empties and repeats
pub fn parse_symbols(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
