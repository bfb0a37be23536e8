//! HP MSA XML API client

use async_trait::async_trait;

use crate::config::Protocol;
use crate::error::Result;

pub mod envelope;
pub mod host;
#[cfg(test)]
pub mod mock;
pub mod msa;

pub use envelope::Envelope;
pub use host::StorageHost;
#[cfg(test)]
pub use mock::MockMsaClient;
pub use msa::MsaClient;

/// Operations of the MSA XML API used by the monitor
#[async_trait]
pub trait MsaApi: Send + Sync {
    /// Array this client talks to
    fn host(&self) -> &StorageHost;

    /// Scheme used for every request
    fn protocol(&self) -> Protocol;

    /// Exchange a login hash for a session key
    async fn login(&self, credential_hash: &str) -> Result<LoginOutcome>;

    /// GET `/api/<segment>/<segment>/...` with the session key attached.
    /// Each segment is percent-encoded on its own.
    async fn request(&self, path: &[&str], session_key: &str) -> Result<RawResponse>;
}

/// Result of a login call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session key issued by the array
    Session(String),
    /// The array refused the credentials
    Rejected,
}

/// Body of a data response together with its parsed envelope
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub body: Vec<u8>,
    pub envelope: Envelope,
}
