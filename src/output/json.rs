//! JSON output formatting

use serde::Serialize;

/// Format data as compact single-line JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(data)
}
