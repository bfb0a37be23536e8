//! Error types for msa-monitor

use std::error::Error as _;

use thiserror::Error;

/// Result type alias for msa-monitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors talking to the storage array or interpreting its answers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Login or password is incorrect.")]
    AuthenticationFailed,

    #[error("Could not connect to {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Cannot parse XML: {0}")]
    Parse(String),

    #[error("Response code from API is {code} ({message})")]
    Vendor { code: String, message: String },

    #[error("Unexpected return code from login: {code} ({message})")]
    UnexpectedReturnCode { code: String, message: String },

    #[error("No such id: '{id}'{}", available_suffix(.available))]
    NotFound { id: String, available: Vec<String> },

    #[error("Object '{object}' has no property '{property}'")]
    MissingProperty { object: String, property: String },
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}

impl ApiError {
    /// Build a network error from a reqwest failure on `url`.
    pub fn network(url: &str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            // Connect errors hide DNS and TLS failures in their source chain
            let mut reason = "connection failed".to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                reason = format!("{}: {}", reason, cause);
                source = cause.source();
            }
            reason
        } else {
            // The request URL may carry the login hash
            err.without_url().to_string()
        };
        ApiError::Network {
            url: url.to_string(),
            reason,
        }
    }
}

impl From<quick_xml::Error> for ApiError {
    fn from(err: quick_xml::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Credentials file not found: {0}")]
    CredentialsFile(String),

    #[error("Credentials file is empty: {0}")]
    EmptyCredentials(String),

    #[error("Missing mandatory argument '{0}'.")]
    MissingArgument(&'static str),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Session cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Invalid expiry timestamp in cache: {0}")]
    InvalidExpiry(i64),

    #[error("Refusing to run destructive statement against the cache: {0}")]
    ForbiddenStatement(String),
}
