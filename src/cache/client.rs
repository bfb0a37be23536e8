//! Cache-aware login wrapper around an MSA API client
//!
//! Reuses a live session key from the SQLite store and falls back to one
//! fresh login when the key is missing or stale.

use chrono::Utc;
use std::sync::Mutex;

use super::{SessionStore, session_expiry};
use crate::client::{LoginOutcome, MsaApi, RawResponse, StorageHost};
use crate::config::ClientConfig;
use crate::error::{ApiError, CacheError, Result};

/// Wrapper pairing any [`MsaApi`] implementation with the session store.
///
/// The store is optional so `--no-cache` runs never touch the database.
pub struct SessionClient<C: MsaApi> {
    inner: C,
    cache: Option<Mutex<SessionStore>>,
}

impl<C: MsaApi> SessionClient<C> {
    /// Wrap `inner` with an already opened store (or none).
    pub fn new(inner: C, store: Option<SessionStore>) -> Self {
        Self {
            inner,
            cache: store.map(Mutex::new),
        }
    }

    /// Wrap `inner`, opening the store in `config.cache_dir` when caching is on.
    pub fn open(inner: C, config: &ClientConfig) -> Result<Self> {
        let store = if config.use_cache {
            Some(SessionStore::open_at(&config.cache_dir)?)
        } else {
            None
        };
        Ok(Self::new(inner, store))
    }

    /// Get the wrapped client
    #[allow(dead_code)]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn host(&self) -> &StorageHost {
        self.inner.host()
    }

    fn store(&self) -> Option<Result<std::sync::MutexGuard<'_, SessionStore>>> {
        self.cache.as_ref().map(|cache| {
            cache
                .lock()
                .map_err(|_| CacheError::Io("session cache lock poisoned".to_string()).into())
        })
    }

    /// Session key for the wrapped host.
    ///
    /// A live cached key is returned without any network call. Otherwise one
    /// login is made; a granted key is cached for the session lifetime and a
    /// rejection is returned as is, leaving the cache untouched.
    pub async fn authenticate(&self, credential_hash: &str) -> Result<LoginOutcome> {
        let host = self.inner.host();
        let protocol = self.inner.protocol();

        if let Some(store) = self.store() {
            if let Some(entry) = store?.lookup(host, protocol)? {
                log::debug!(
                    "Cache hit: session key for {} valid until {}",
                    host.dns_name(),
                    entry.expires_at
                );
                return Ok(LoginOutcome::Session(entry.token));
            }
            log::debug!("Cache miss: logging in to {}", host.dns_name());
        }

        let outcome = self.inner.login(credential_hash).await?;

        if let LoginOutcome::Session(ref token) = outcome
            && let Some(store) = self.store()
        {
            store?.store(host, protocol, token, session_expiry(Utc::now()))?;
        }

        Ok(outcome)
    }

    /// Like [`authenticate`](Self::authenticate), with a rejection turned
    /// into [`ApiError::AuthenticationFailed`].
    pub async fn session(&self, credential_hash: &str) -> Result<String> {
        match self.authenticate(credential_hash).await? {
            LoginOutcome::Session(token) => Ok(token),
            LoginOutcome::Rejected => Err(ApiError::AuthenticationFailed.into()),
        }
    }

    pub async fn request(&self, path: &[&str], session_key: &str) -> Result<RawResponse> {
        self.inner.request(path, session_key).await
    }
}
