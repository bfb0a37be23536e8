//! Output formatting for CLI results
//!
//! Poll results are written as a single line on stdout; the session cache
//! dump is the only multi-line output.

pub mod json;
pub mod table;

pub use json::format_json;
pub use table::format_table;
