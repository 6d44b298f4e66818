//! Application state management

use crate::api::http::HttpTransport;
use crate::api::types::{UserProfile, WatchlistEntry};
use crate::api::{ApiClient, Transport};
use crate::config::Config;
use crate::db::SqliteDb;
use crate::error::Result;
use crate::security::SecurityManager;
use parking_lot::RwLock;
use std::sync::Arc;

/// Logged-in user
#[derive(Debug, Clone)]
pub struct UserSession {
    pub profile: UserProfile,
    pub authenticated_at: chrono::DateTime<chrono::Utc>,
}

/// State shared by every service call
pub struct AppState {
    pub config: Config,

    /// REST client carrying the bearer token
    pub client: ApiClient,

    pub sqlite: Arc<SqliteDb>,

    /// Encryption of the persisted token
    pub security: Arc<SecurityManager>,

    pub user_session: RwLock<Option<UserSession>>,

    /// Cached watchlist, only populated while logged in
    pub watchlist: RwLock<Vec<WatchlistEntry>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        tracing::info!("Data directory: {:?}", config.data_dir);

        let transport = Arc::new(HttpTransport::new(&config)?);
        let sqlite = Arc::new(SqliteDb::new(&config.database_path())?);
        let security = Arc::new(SecurityManager::new(config.data_dir.clone())?);

        Ok(Self::assemble(config, transport, sqlite, security))
    }

    /// State over an arbitrary transport with an in-memory store
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let sqlite = Arc::new(SqliteDb::open_in_memory()?);
        let security = Arc::new(SecurityManager::ephemeral()?);
        Ok(Self::assemble(config, transport, sqlite, security))
    }

    fn assemble(
        config: Config,
        transport: Arc<dyn Transport>,
        sqlite: Arc<SqliteDb>,
        security: Arc<SecurityManager>,
    ) -> Self {
        Self {
            config,
            client: ApiClient::new(transport),
            sqlite,
            security,
            user_session: RwLock::new(None),
            watchlist: RwLock::new(Vec::new()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.has_bearer()
    }

    pub fn get_user_session(&self) -> Option<UserSession> {
        self.user_session.read().clone()
    }

    pub fn set_user_session(&self, session: Option<UserSession>) {
        *self.user_session.write() = session;
    }

    /// Snapshot of the cached watchlist
    pub fn watchlist(&self) -> Vec<WatchlistEntry> {
        self.watchlist.read().clone()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::api::testing::FakeTransport;

    pub fn state() -> (AppState, Arc<FakeTransport>) {
        let transport = FakeTransport::new();
        let state = AppState::with_transport(Config::new("/tmp/screener-test"), transport.clone())
            .unwrap();
        (state, transport)
    }
}
