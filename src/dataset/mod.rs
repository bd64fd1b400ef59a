//! Grouped dataset view over tabular input.
//!
//! - [`Table`]: read access to rows addressable by field name
//! - [`Dataset`]: in-memory implementation of [`Table`]
//! - [`GroupedDataset`]: partition of a table into labelled numeric groups

mod grouped;
mod table;

pub use grouped::{Group, GroupedDataset};
pub use table::{Dataset, RowView, Table, Value};
