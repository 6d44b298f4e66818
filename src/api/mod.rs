//! REST API access
//!
//! `Transport` is the seam between the dashboard and the network: the
//! production implementation is [`http::HttpTransport`], tests script their
//! own. `ApiClient` layers the bearer token, status handling and JSON decoding
//! on top of whichever transport it is given.

pub mod http;
pub mod types;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// HTTP verbs used by the dashboard API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// A request relative to the API base (e.g. `stocks/latest`)
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into().trim_start_matches('/').to_string(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response: status plus decoded JSON body (`Null` when empty)
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-supplied error text (`error` or `message` field)
    pub fn error_message(&self) -> Option<String> {
        ["error", "message"]
            .iter()
            .find_map(|key| self.body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    }
}

/// Transport trait that every HTTP backend must implement
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status, and `AppError::Network` when nothing came back.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Typed API client with an explicit bearer token
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    bearer: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            bearer: RwLock::new(None),
        }
    }

    /// Attach a token to every subsequent request
    pub fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write() = token;
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer.read().clone()
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer.read().is_some()
    }

    /// Send a request and return the body of a 2xx response
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Value> {
        request.bearer = self.bearer();

        tracing::debug!("{:?} {} {:?}", request.method, request.path, request.query);

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(AppError::Api {
                status: response.status,
                message: response.error_message(),
            });
        }

        Ok(response.body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Vec<(String, String)>) -> Result<T> {
        let body = self
            .execute(ApiRequest::new(Method::Get, path).with_query(query))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        let body = self
            .execute(ApiRequest::new(Method::Post, path).with_body(body))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// DELETE with a JSON body; the response body is ignored
    pub async fn delete(&self, path: &str, body: Value) -> Result<()> {
        self.execute(ApiRequest::new(Method::Delete, path).with_body(body))
            .await?;
        Ok(())
    }
}

/// Scripted transport shared by the unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays queued responses in order and records every request
    #[derive(Default)]
    pub struct FakeTransport {
        responses: Mutex<VecDeque<Result<ApiResponse>>>,
        pub requests: Mutex<Vec<ApiRequest>>,
    }

    impl FakeTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push(&self, status: u16, body: Value) {
            self.responses.lock().push_back(Ok(ApiResponse { status, body }));
        }

        pub fn push_network_error(&self) {
            self.responses
                .lock()
                .push_back(Err(AppError::Network("connection refused".to_string())));
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }

        pub fn last_request(&self) -> Option<ApiRequest> {
            self.requests.lock().last().cloned()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().push(request);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Network("no scripted response".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_bearer_attached_once_set() {
        let transport = FakeTransport::new();
        transport.push(200, json!([]));
        transport.push(200, json!([]));
        let client = ApiClient::new(transport.clone());

        let _: Vec<Value> = client.get("watchlist", vec![]).await.unwrap();
        assert!(transport.last_request().unwrap().bearer.is_none());

        client.set_bearer(Some("abc".to_string()));
        let _: Vec<Value> = client.get("/watchlist", vec![]).await.unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.bearer.as_deref(), Some("abc"));
        assert_eq!(request.path, "watchlist");
    }

    #[tokio::test]
    async fn test_non_success_becomes_api_error() {
        let transport = FakeTransport::new();
        transport.push(400, json!({"error": "Email is required"}));
        let client = ApiClient::new(transport);

        let err = client
            .post::<Value>("auth/register", json!({}))
            .await
            .unwrap_err();
        match err {
            AppError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("Email is required"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_network_error_passes_through() {
        let transport = FakeTransport::new();
        transport.push_network_error();
        let client = ApiClient::new(transport);

        let err = client.get::<Value>("auth/me", vec![]).await.unwrap_err();
        assert!(err.is_network());
    }
}
