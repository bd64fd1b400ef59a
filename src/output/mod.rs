//! Output formatting for run results.

pub mod json;
pub mod terminal;

pub use json::{from_json, to_json, to_json_pretty};
pub use terminal::format_output;
