//! Application error types

use serde::Serialize;
use thiserror::Error;

const REGISTERED_MESSAGE: &str = "This email is already registered.";
const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";
const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request never produced a response (connect failure, timeout, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// A table fetch failed; the view kept its previous rows
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when no response was received at all
    pub fn is_network(&self) -> bool {
        match self {
            AppError::Network(_) => true,
            AppError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Message shown by the login/register form
    pub fn auth_message(&self) -> String {
        match self {
            AppError::Api { status: 409, .. } => REGISTERED_MESSAGE.to_string(),
            AppError::Api {
                status: 400,
                message,
            } => message.clone().unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
            AppError::Api { message, .. } => {
                message.clone().unwrap_or_else(|| GENERIC_MESSAGE.to_string())
            }
            e if e.is_network() => NETWORK_MESSAGE.to_string(),
            AppError::Validation(msg) | AppError::Auth(msg) => msg.clone(),
            _ => GENERIC_MESSAGE.to_string(),
        }
    }

    /// Message shown when a data fetch fails and stale rows stay on screen
    pub fn user_message(&self) -> String {
        match self {
            e if e.is_network() => NETWORK_MESSAGE.to_string(),
            AppError::Api {
                status: 401 | 403, ..
            } => "Your session has expired. Please log in again.".to_string(),
            AppError::Api {
                status: 404,
                message,
            } => message
                .clone()
                .unwrap_or_else(|| "No data found.".to_string()),
            AppError::Api {
                message: Some(msg), ..
            } => msg.clone(),
            AppError::Serialization(_) => "The server sent data in an unexpected format.".to_string(),
            AppError::Validation(msg) | AppError::Auth(msg) | AppError::NotFound(msg) | AppError::Fetch(msg) => {
                msg.clone()
            }
            _ => GENERIC_MESSAGE.to_string(),
        }
    }
}

/// Serializable error response for the command line `--json` mode
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let code = match err {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Api { .. } => "API_ERROR",
            AppError::Fetch(_) => "FETCH_ERROR",
            AppError::Encryption(_) => "ENCRYPTION_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: err.user_message(),
            status: err.status(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
