//! Auth Service
//!
//! Login, registration, logout and start-up session restore. The bearer token
//! is attached to the client and persisted only once `/auth/me` has confirmed
//! it, so a failed login never leaves a half-authenticated state behind.

use crate::api::types::{AuthResponse, Credentials, UserProfile};
use crate::error::{AppError, Result};
use crate::services::WatchlistService;
use crate::state::{AppState, UserSession};
use tracing::{info, warn};

pub struct AuthService;

impl AuthService {
    /// `POST /auth/login`
    pub async fn login(state: &AppState, email: &str, password: &str) -> Result<UserProfile> {
        info!("AuthService::login - {}", email);
        Self::authenticate(state, "auth/login", email, password).await
    }

    /// `POST /auth/register`
    pub async fn register(state: &AppState, email: &str, password: &str) -> Result<UserProfile> {
        info!("AuthService::register - {}", email);
        Self::authenticate(state, "auth/register", email, password).await
    }

    async fn authenticate(state: &AppState, path: &str, email: &str, password: &str) -> Result<UserProfile> {
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(AppError::Validation("Email and password are required".to_string()));
        }

        let response: AuthResponse = state
            .client
            .post(path, serde_json::to_value(&credentials)?)
            .await
            .map_err(Self::auth_error)?;

        state.client.set_bearer(Some(response.token.clone()));

        let profile = match Self::fetch_profile(state).await {
            Ok(profile) => profile,
            Err(e) => {
                state.client.set_bearer(None);
                return Err(Self::auth_error(e));
            }
        };

        if let Err(e) = state.sqlite.store_token(&response.token, &state.security) {
            warn!("Failed to persist session token: {}", e);
        }

        Self::start_session(state, profile.clone()).await;
        Ok(profile)
    }

    /// Drop the token, session and cached watchlist. No server call is made.
    pub fn logout(state: &AppState) -> Result<()> {
        info!("AuthService::logout");

        state.client.set_bearer(None);
        state.set_user_session(None);
        state.watchlist.write().clear();

        state.sqlite.delete_token()
    }

    /// Reattach a persisted token and confirm it with `/auth/me`
    ///
    /// A token that cannot be decrypted, or that the server no longer
    /// accepts, is deleted.
    pub async fn restore_session(state: &AppState) -> Result<Option<UserProfile>> {
        let token = match state.sqlite.load_token(&state.security) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Stored session unreadable: {}", e);
                state.sqlite.delete_token()?;
                return Ok(None);
            }
        };

        info!("AuthService::restore_session");
        state.client.set_bearer(Some(token));

        match Self::fetch_profile(state).await {
            Ok(profile) => {
                Self::start_session(state, profile.clone()).await;
                Ok(Some(profile))
            }
            Err(e) => {
                warn!("Stored session rejected: {}", e);
                state.client.set_bearer(None);
                state.sqlite.delete_token()?;
                Ok(None)
            }
        }
    }

    pub fn current_user(state: &AppState) -> Option<UserProfile> {
        state.get_user_session().map(|s| s.profile)
    }

    async fn fetch_profile(state: &AppState) -> Result<UserProfile> {
        state.client.get("auth/me", Vec::new()).await
    }

    async fn start_session(state: &AppState, profile: UserProfile) {
        state.set_user_session(Some(UserSession {
            profile,
            authenticated_at: chrono::Utc::now(),
        }));

        if let Err(e) = WatchlistService::refresh(state).await {
            warn!("Failed to load watchlist: {}", e);
        }
    }

    fn auth_error(err: AppError) -> AppError {
        warn!("Authentication failed: {}", err);
        AppError::Auth(err.auth_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::SecurityManager;
    use crate::state::testing::state;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_attaches_and_persists_token() {
        let (state, transport) = state();
        transport.push(200, json!({"token": "tok-1", "email": "a@b.c"}));
        transport.push(200, json!({"id": 7, "email": "a@b.c"}));
        transport.push(200, json!([{"entity_type": "us_stock", "symbol": "AAPL"}]));

        let profile = AuthService::login(&state, "a@b.c", "secret").await.unwrap();

        assert_eq!(profile.id, Some(7));
        assert_eq!(state.client.bearer().as_deref(), Some("tok-1"));
        assert_eq!(state.sqlite.load_token(&state.security).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(state.watchlist().len(), 1);

        let requests = transport.requests.lock();
        let login = &requests[0];
        assert_eq!(login.path, "auth/login");
        assert_eq!(login.body, Some(json!({"email": "a@b.c", "password": "secret"})));
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_token_unset() {
        let (state, transport) = state();
        transport.push(401, json!({"error": "Invalid credentials"}));

        let err = AuthService::login(&state, "a@b.c", "wrong").await.unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(!state.is_authenticated());
        assert!(AuthService::current_user(&state).is_none());
        assert_eq!(state.sqlite.load_token(&state.security).unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_conflict_message() {
        let (state, transport) = state();
        transport.push(409, json!({"error": "duplicate"}));

        let err = AuthService::register(&state, "a@b.c", "secret").await.unwrap_err();
        assert_eq!(err.user_message(), "This email is already registered.");
    }

    #[tokio::test]
    async fn test_profile_failure_rolls_back_login() {
        let (state, transport) = state();
        transport.push(200, json!({"token": "tok-1"}));
        transport.push_network_error();

        let err = AuthService::login(&state, "a@b.c", "secret").await.unwrap_err();

        assert_eq!(err.user_message(), "Network error. Please check your connection.");
        assert!(state.client.bearer().is_none());
        assert_eq!(state.sqlite.load_token(&state.security).unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_credentials_are_rejected_locally() {
        let (state, transport) = state();
        let err = AuthService::login(&state, "  ", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let (state, transport) = state();
        transport.push(200, json!({"token": "tok-1"}));
        transport.push(200, json!({"id": 1}));
        transport.push(200, json!([]));
        AuthService::login(&state, "a@b.c", "secret").await.unwrap();

        AuthService::logout(&state).unwrap();

        assert!(!state.is_authenticated());
        assert!(AuthService::current_user(&state).is_none());
        assert_eq!(state.sqlite.load_token(&state.security).unwrap(), None);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_restore_session_with_valid_token() {
        let (state, transport) = state();
        state.sqlite.store_token("saved", &state.security).unwrap();
        transport.push(200, json!({"id": 3, "email": "x@y.z"}));
        transport.push(200, json!([]));

        let profile = AuthService::restore_session(&state).await.unwrap().unwrap();

        assert_eq!(profile.email.as_deref(), Some("x@y.z"));
        assert_eq!(transport.requests.lock()[0].bearer.as_deref(), Some("saved"));
        assert!(AuthService::current_user(&state).is_some());
    }

    #[tokio::test]
    async fn test_restore_session_deletes_rejected_token() {
        let (state, transport) = state();
        state.sqlite.store_token("expired", &state.security).unwrap();
        transport.push(401, json!({"error": "Token expired"}));

        assert!(AuthService::restore_session(&state).await.unwrap().is_none());
        assert!(!state.is_authenticated());
        assert_eq!(state.sqlite.load_token(&state.security).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_without_token_makes_no_request() {
        let (state, transport) = state();
        assert!(AuthService::restore_session(&state).await.unwrap().is_none());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_session_deletes_unreadable_token() {
        let (state, transport) = state();
        let other = SecurityManager::ephemeral().unwrap();
        state.sqlite.store_token("tok-old", &other).unwrap();

        let restored = AuthService::restore_session(&state).await.unwrap();

        assert!(restored.is_none());
        assert_eq!(transport.request_count(), 0);
        assert!(!state.is_authenticated());
        assert_eq!(state.sqlite.load_token(&state.security).unwrap(), None);
    }
}
