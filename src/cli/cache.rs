//! `--show-cache`: dump the session key table

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use tabled::Tabled;

use crate::cache::{SessionEntry, SessionStore};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::output::format_table;

/// One row of the cache dump
#[derive(Debug, Tabled)]
pub struct SessionRow {
    #[tabled(rename = "HOST")]
    pub dns_name: String,
    #[tabled(rename = "IP")]
    pub ip: String,
    #[tabled(rename = "PROTO")]
    pub protocol: String,
    #[tabled(rename = "EXPIRES")]
    pub expires: String,
    #[tabled(rename = "STATE")]
    pub state: String,
    #[tabled(rename = "SESSION KEY")]
    pub token: String,
}

impl SessionRow {
    fn from_entry(entry: SessionEntry, now: DateTime<Utc>) -> Self {
        let state = if entry.is_live(now) { "live" } else { "expired" };
        Self {
            dns_name: entry.dns_name,
            ip: entry.ip,
            protocol: entry.protocol,
            expires: entry
                .expires_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            state: state.to_string(),
            token: entry.token,
        }
    }
}

/// Render every cached session, live or stale.
pub fn show(config: &ClientConfig) -> Result<String> {
    let store = SessionStore::open_at(&config.cache_dir)?;
    let now = Utc::now();
    let rows: Vec<SessionRow> = store
        .enumerate()?
        .into_iter()
        .map(|entry| SessionRow::from_entry(entry, now))
        .collect();

    let header = format!("Session cache: {}", store.path().display());
    Ok(format!(
        "{}\n{}",
        header.bold(),
        format_table(&rows, "No cached sessions.")
    ))
}
