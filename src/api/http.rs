//! reqwest-backed transport

use crate::api::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Production transport talking to the dashboard backend
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: config.api_base()?,
        })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self
            .base
            .join(&request.path)
            .map_err(|e| AppError::Validation(format!("Invalid request path '{}': {}", request.path, e)))?;

        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        // Error pages are not always JSON; keep the text so callers can show it.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(e) if (200..300).contains(&status) => return Err(e.into()),
                Err(_) => serde_json::json!({ "error": String::from_utf8_lossy(&bytes).trim() }),
            }
        };

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_path_and_query() {
        let config = Config::new("/tmp/screener").with_origin("http://dash.local:8080");
        let transport = HttpTransport::new(&config).unwrap();

        let request = ApiRequest::new(Method::Get, "/stocks/latest").with_query(vec![
            ("date".to_string(), "2024-05-01".to_string()),
            ("force_index_alert_state[]".to_string(), "$$$".to_string()),
        ]);
        let url = transport.url_for(&request).unwrap();

        assert_eq!(url.path(), "/api/stocks/latest");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("date".to_string(), "2024-05-01".to_string()));
        assert_eq!(pairs[1], ("force_index_alert_state[]".to_string(), "$$$".to_string()));
    }
}
