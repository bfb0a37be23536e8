//! Statement guard for the session cache
//!
//! The cache only ever creates, reads and upserts rows. Statement texts are
//! screened for destructive verbs before they reach SQLite.

use crate::error::CacheError;

const FORBIDDEN_VERBS: [&str; 4] = ["DROP", "DELETE", "TRUNCATE", "ALTER"];

/// Reject statements containing a destructive verb as a whole word.
pub fn check_statement(sql: &str) -> Result<(), CacheError> {
    let forbidden = sql
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|word| {
            FORBIDDEN_VERBS
                .iter()
                .any(|verb| word.eq_ignore_ascii_case(verb))
        });

    if forbidden {
        log::error!("Rejected cache statement: {}", sql);
        return Err(CacheError::ForbiddenStatement(sql.trim().to_string()));
    }
    Ok(())
}
