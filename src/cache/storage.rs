//! SQLite-backed session key storage
//!
//! One row per (dns name, ip, protocol). Rows are upserted on every
//! successful login and never deleted; stale rows are simply overwritten.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::guard::check_statement;
use crate::client::StorageHost;
use crate::config::Protocol;
use crate::error::CacheError;

type Result<T> = std::result::Result<T, CacheError>;

/// Database file name inside the cache directory
const DB_FILE: &str = "sessions.db";

/// How long a writer waits for another poller holding the database lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS skey_cache (
    dns_name TEXT NOT NULL,
    ip TEXT NOT NULL,
    proto TEXT NOT NULL,
    expired INTEGER NOT NULL,
    skey TEXT NOT NULL,
    PRIMARY KEY (dns_name, ip, proto)
)";

const SELECT_LIVE: &str = "SELECT dns_name, ip, proto, expired, skey FROM skey_cache
    WHERE dns_name = ?1 AND ip = ?2 AND proto = ?3 AND expired > ?4";

const SELECT_ALL: &str = "SELECT dns_name, ip, proto, expired, skey FROM skey_cache
    ORDER BY dns_name, ip, proto";

const UPSERT: &str = "INSERT OR REPLACE INTO skey_cache (dns_name, ip, proto, expired, skey)
    VALUES (?1, ?2, ?3, ?4, ?5)";

/// One cached session key
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub dns_name: String,
    pub ip: String,
    pub protocol: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionEntry {
    /// Whether the entry is still usable at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Persistent (host, protocol) → session key table
pub struct SessionStore {
    conn: Connection,
    path: PathBuf,
}

impl SessionStore {
    /// Open the store in `cache_dir`, creating the directory if needed.
    ///
    /// The table itself is created lazily by the first [`store`](Self::store).
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let path = cache_dir.join(DB_FILE);
        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self { conn, path })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Live session key for `host` over `protocol`, if any.
    pub fn lookup(&self, host: &StorageHost, protocol: Protocol) -> Result<Option<SessionEntry>> {
        check_statement(SELECT_LIVE)?;
        let now = Utc::now().timestamp();

        let row = self
            .conn
            .query_row(
                SELECT_LIVE,
                params![host.dns_name(), host.ip(), protocol.as_str(), now],
                raw_row,
            )
            .optional();

        match row {
            Ok(row) => row.map(into_entry).transpose(),
            Err(e) if is_missing_table(&e) => {
                log::debug!("Session cache has no table yet, treating as empty");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or overwrite the session key for `host` over `protocol`.
    pub fn store(
        &self,
        host: &StorageHost,
        protocol: Protocol,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        check_statement(CREATE_SCHEMA)?;
        self.conn.execute(CREATE_SCHEMA, [])?;

        check_statement(UPSERT)?;
        self.conn.execute(
            UPSERT,
            params![
                host.dns_name(),
                host.ip(),
                protocol.as_str(),
                expires_at.timestamp(),
                token
            ],
        )?;

        log::debug!(
            "Cached session key for {} ({}, {}) until {}",
            host.dns_name(),
            host.ip(),
            protocol.as_str(),
            expires_at
        );
        Ok(())
    }

    /// Every row, live or stale
    pub fn enumerate(&self) -> Result<Vec<SessionEntry>> {
        check_statement(SELECT_ALL)?;

        let mut stmt = match self.conn.prepare(SELECT_ALL) {
            Ok(stmt) => stmt,
            Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let rows = stmt
            .query_map([], raw_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(into_entry).collect()
    }
}

type RawRow = (String, String, String, i64, String);

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn into_entry((dns_name, ip, protocol, expired, token): RawRow) -> Result<SessionEntry> {
    let expires_at =
        DateTime::from_timestamp(expired, 0).ok_or(CacheError::InvalidExpiry(expired))?;

    Ok(SessionEntry {
        dns_name,
        ip,
        protocol,
        token,
        expires_at,
    })
}

/// SQLite reports a missing table only as a generic SQLITE_ERROR, so the
/// message text is the one thing that tells it apart.
fn is_missing_table(err: &rusqlite::Error) -> bool {
    err.to_string().contains("no such table")
}
