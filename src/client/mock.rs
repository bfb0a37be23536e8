//! Mock MSA API client for testing
//!
//! Answers login and data calls from canned values so the session cache and
//! the command layer can be tested without an array.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Envelope, LoginOutcome, MsaApi, RawResponse, StorageHost};
use crate::config::Protocol;
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// ```ignore
/// let mock = MockMsaClient::new()
///     .with_login(LoginOutcome::Session("TOKEN123".into()))
///     .await
///     .with_response("show/disks", fixtures::response(fixtures::DISKS))
///     .await;
/// ```
pub struct MockMsaClient {
    host: StorageHost,
    protocol: Protocol,
    /// Outcome returned from login
    login: Arc<Mutex<LoginOutcome>>,
    /// Response bodies keyed by `/`-joined request path
    responses: Arc<Mutex<HashMap<String, String>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    call_count: Arc<Mutex<CallCounts>>,
    /// Session keys seen on data requests, in call order
    session_keys: Arc<Mutex<Vec<String>>>,
}

impl Default for MockMsaClient {
    fn default() -> Self {
        Self {
            host: StorageHost::new("10.0.0.5", "10.0.0.5", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))),
            protocol: Protocol::Http,
            login: Arc::new(Mutex::new(LoginOutcome::Session("TOKEN123".to_string()))),
            responses: Arc::new(Mutex::new(HashMap::new())),
            error: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            session_keys: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub login: usize,
    pub request: usize,
}

impl MockMsaClient {
    /// Create a mock that grants session key `TOKEN123`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Configure the outcome of every login call.
    pub async fn with_login(self, outcome: LoginOutcome) -> Self {
        *self.login.lock().await = outcome;
        self
    }

    /// Configure the body returned for `path`.
    pub async fn with_response(self, path: &str, body: String) -> Self {
        self.responses.lock().await.insert(path.to_string(), body);
        self
    }

    /// Configure an error to return on the next API call.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn session_keys(&self) -> Vec<String> {
        self.session_keys.lock().await.clone()
    }

    async fn check_error(&self) -> Result<()> {
        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl MsaApi for MockMsaClient {
    fn host(&self) -> &StorageHost {
        &self.host
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn login(&self, _credential_hash: &str) -> Result<LoginOutcome> {
        self.call_count.lock().await.login += 1;
        self.check_error().await?;
        Ok(self.login.lock().await.clone())
    }

    async fn request(&self, path: &[&str], session_key: &str) -> Result<RawResponse> {
        let path = path.join("/");
        self.call_count.lock().await.request += 1;
        self.session_keys.lock().await.push(session_key.to_string());
        self.check_error().await?;

        let body = self
            .responses
            .lock()
            .await
            .get(&path)
            .cloned()
            .ok_or_else(|| ApiError::Vendor {
                code: "-1".to_string(),
                message: format!("no canned response for {}", path),
            })?;
        let envelope = Envelope::parse(body.as_bytes())?;

        Ok(RawResponse {
            body: body.into_bytes(),
            envelope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::fixtures;
    use crate::error::Error;

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let mock = MockMsaClient::new()
            .with_response("show/vdisks", fixtures::response(fixtures::VDISKS))
            .await;

        let outcome = mock.login("hash").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Session("TOKEN123".to_string()));
        mock.request(&["show", "vdisks"], "TOKEN123").await.unwrap();

        let counts = mock.call_counts().await;
        assert_eq!(counts.login, 1);
        assert_eq!(counts.request, 1);
        assert_eq!(mock.session_keys().await, vec!["TOKEN123".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_error_consumed_once() {
        let mock = MockMsaClient::new()
            .with_error(ApiError::Parse("boom".to_string()))
            .await;

        assert!(matches!(
            mock.login("hash").await,
            Err(Error::Api(ApiError::Parse(_)))
        ));
        assert!(mock.login("hash").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_unknown_path_is_vendor_error() {
        let mock = MockMsaClient::new();
        assert!(matches!(
            mock.request(&["show", "fans"], "TOKEN123").await,
            Err(Error::Api(ApiError::Vendor { .. }))
        ));
    }
}
