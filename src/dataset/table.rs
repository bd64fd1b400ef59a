//! Tabular input: rows addressable by field name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;

/// A single cell of a tabular dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Real number.
    Number(f64),
    /// Integer.
    Integer(i64),
    /// Free text. Numeric text is coercible to a number.
    Text(String),
    /// Boolean flag.
    Bool(bool),
    /// Absent value.
    Missing,
}

impl Value {
    /// Coerce the cell to a finite real number.
    ///
    /// Text is parsed after trimming whitespace. Booleans, missing cells and
    /// non-finite numbers are not coercible.
    pub fn as_f64(&self) -> Option<f64> {
        let x = match self {
            Value::Number(x) => *x,
            Value::Integer(i) => *i as f64,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
            Value::Bool(_) | Value::Missing => return None,
        };
        x.is_finite().then_some(x)
    }

    /// Render the cell as a group label, or `None` if it is missing.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Whether the cell is [`Value::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{}", x),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Missing => f.write_str("<missing>"),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

/// Read access to a table whose rows are addressable by field name.
///
/// Implement this for an existing data frame type to group it without
/// copying it into a [`Dataset`] first.
pub trait Table {
    /// Field names, in column order.
    fn fields(&self) -> &[String];

    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Cell at `row` in the column at `field_index`.
    ///
    /// Implementations return `None` when the indices are out of range.
    fn cell(&self, row: usize, field_index: usize) -> Option<&Value>;

    /// Column index for a field name.
    fn field_index(&self, field: &str) -> Option<usize> {
        self.fields().iter().position(|f| f == field)
    }
}

/// In-memory row-oriented table.
///
/// ```
/// use resampled::{Dataset, Value};
///
/// let data = Dataset::new(["dose", "response"])
///     .with_row([Value::from("A"), Value::from(4.0)])
///     .unwrap()
///     .with_row([Value::from("B"), Value::from(7.0)])
///     .unwrap();
/// assert_eq!(data.row_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    fields: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create an empty dataset with the given field names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::RaggedRow`] if the row does not have one
    /// cell per field.
    pub fn push_row<I>(&mut self, row: I) -> Result<(), InvalidInputError>
    where
        I: IntoIterator<Item = Value>,
    {
        let row: Vec<Value> = row.into_iter().collect();
        if row.len() != self.fields.len() {
            return Err(InvalidInputError::RaggedRow {
                row: self.rows.len(),
                expected: self.fields.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style [`push_row`](Self::push_row).
    pub fn with_row<I>(mut self, row: I) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.push_row(row)?;
        Ok(self)
    }

    /// Build a two-column dataset from `(label, value)` pairs.
    pub fn from_pairs<L, V, I>(label_field: &str, value_field: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<Value>,
        V: Into<Value>,
    {
        Self {
            fields: vec![label_field.to_string(), value_field.to_string()],
            rows: pairs
                .into_iter()
                .map(|(l, v)| vec![l.into(), v.into()])
                .collect(),
        }
    }

    /// Row cells by index.
    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Table for Dataset {
    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, row: usize, field_index: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(field_index))
    }
}

/// Borrowed view of one table row, used by row-wise value extractors.
pub struct RowView<'a, T: Table + ?Sized> {
    table: &'a T,
    row: usize,
}

impl<T: Table + ?Sized> Clone for RowView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Table + ?Sized> Copy for RowView<'_, T> {}

impl<'a, T: Table + ?Sized> RowView<'a, T> {
    pub(crate) fn new(table: &'a T, row: usize) -> Self {
        Self { table, row }
    }

    /// Row index in the table.
    pub fn index(&self) -> usize {
        self.row
    }

    /// Cell for a field name, or `None` if the field does not exist.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        let idx = self.table.field_index(field)?;
        self.table.cell(self.row, idx)
    }

    /// Cell for a field name coerced to a finite number.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }
}
