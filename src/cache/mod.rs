//! Session key cache
//!
//! Keeps MSA session keys in a small SQLite database so consecutive polls of
//! the same array skip the login round trip.

pub mod client;
pub mod guard;
pub mod storage;

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Validity window of a session key after a successful login
pub const SESSION_TTL: Duration = Duration::from_secs(15 * 60); // 15 min

/// Expiry of a session key obtained at `now`
pub fn session_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + chrono::Duration::seconds(SESSION_TTL.as_secs() as i64)
}

// Re-export main types
pub use client::SessionClient;
pub use storage::{SessionEntry, SessionStore};
