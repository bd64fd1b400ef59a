//! Partition of a table into labelled numeric groups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::table::{RowView, Table};
use crate::error::InvalidInputError;

/// Field name reported for values produced by a row-wise extractor.
const DERIVED_FIELD: &str = "<row-wise value>";

/// The numeric values sharing one group label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    label: String,
    values: Vec<f64>,
}

impl Group {
    /// Group label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Values in row order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of rows in the group.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for groups held by a [`GroupedDataset`].
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read-only view of a dataset partitioned by a group-label field.
///
/// Groups are ordered by first appearance of their label and never empty.
///
/// # Example
///
/// ```
/// use resampled::{Dataset, GroupedDataset};
///
/// let table = Dataset::from_pairs(
///     "dose",
///     "response",
///     [("A", 4.0), ("B", 7.0), ("A", 3.0), ("B", 5.0)],
/// );
/// let groups = GroupedDataset::from_table(&table, "dose", "response").unwrap();
///
/// assert_eq!(groups.labels(), vec!["A", "B"]);
/// assert_eq!(groups.values("A"), Some(&[4.0, 3.0][..]));
/// assert_eq!(groups.row_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedDataset {
    groups: Vec<Group>,
}

impl GroupedDataset {
    /// Group the numeric `value_field` of a table by `group_field`.
    ///
    /// # Errors
    ///
    /// - [`InvalidInputError::MissingField`] if either field is absent
    /// - [`InvalidInputError::MissingLabel`] if a row has no group label
    /// - [`InvalidInputError::NonNumeric`] if a value is not a finite number
    /// - [`InvalidInputError::EmptyDataset`] if the table has no rows
    pub fn from_table<T: Table + ?Sized>(
        table: &T,
        group_field: &str,
        value_field: &str,
    ) -> Result<Self, InvalidInputError> {
        Self::numeric(table, group_field, value_field, None)
    }

    /// Like [`from_table`](Self::from_table), keeping only rows labelled
    /// with one of `labels`.
    ///
    /// Values of other rows are never read, so they may be missing or
    /// non-numeric.
    ///
    /// ```
    /// use resampled::{Dataset, GroupedDataset, Value};
    ///
    /// let table = Dataset::from_pairs(
    ///     "dose",
    ///     "response",
    ///     [("A", Value::from(4.0)), ("C", Value::Missing), ("B", Value::from(7.0))],
    /// );
    /// let groups = GroupedDataset::from_table_for(&table, "dose", "response", &["B", "A"]).unwrap();
    /// assert_eq!(groups.labels(), vec!["A", "B"]);
    /// ```
    ///
    /// # Errors
    ///
    /// As [`from_table`](Self::from_table), plus
    /// [`InvalidInputError::UnknownGroup`] if a requested label does not
    /// occur, and [`InvalidInputError::EmptyDataset`] if `labels` is empty.
    pub fn from_table_for<T: Table + ?Sized>(
        table: &T,
        group_field: &str,
        value_field: &str,
        labels: &[&str],
    ) -> Result<Self, InvalidInputError> {
        let groups = Self::numeric(table, group_field, value_field, Some(labels))?;
        if let Some(missing) = labels.iter().find(|l| groups.index_of(l).is_none()) {
            return Err(InvalidInputError::UnknownGroup {
                label: missing.to_string(),
            });
        }
        if groups.groups.is_empty() {
            return Err(InvalidInputError::EmptyDataset);
        }
        Ok(groups)
    }

    fn numeric<T: Table + ?Sized>(
        table: &T,
        group_field: &str,
        value_field: &str,
        labels: Option<&[&str]>,
    ) -> Result<Self, InvalidInputError> {
        let value_idx = table
            .field_index(value_field)
            .ok_or_else(|| InvalidInputError::MissingField {
                field: value_field.to_string(),
            })?;

        Self::build(table, group_field, labels, |row| {
            let cell = table.cell(row.index(), value_idx);
            cell.and_then(|v| v.as_f64())
                .ok_or_else(|| InvalidInputError::NonNumeric {
                    row: row.index(),
                    field: value_field.to_string(),
                    value: cell.map_or_else(|| "<absent>".to_string(), ToString::to_string),
                })
        })
    }

    /// Group an arbitrary row-wise value by `group_field`.
    ///
    /// The extractor returns `None` for rows whose value cannot be computed,
    /// which is reported as [`InvalidInputError::NonNumeric`].
    ///
    /// ```
    /// use resampled::{Dataset, GroupedDataset, Value};
    ///
    /// let table = Dataset::new(["arm", "before", "after"])
    ///     .with_row([Value::from("A"), Value::from(10.0), Value::from(12.5)])
    ///     .unwrap()
    ///     .with_row([Value::from("B"), Value::from(11.0), Value::from(11.5)])
    ///     .unwrap();
    /// let gains = GroupedDataset::from_table_with(&table, "arm", |row| {
    ///     Some(row.number("after")? - row.number("before")?)
    /// })
    /// .unwrap();
    /// assert_eq!(gains.values("A"), Some(&[2.5][..]));
    /// ```
    pub fn from_table_with<T, F>(
        table: &T,
        group_field: &str,
        mut extract: F,
    ) -> Result<Self, InvalidInputError>
    where
        T: Table + ?Sized,
        F: FnMut(RowView<'_, T>) -> Option<f64>,
    {
        Self::build(table, group_field, None, |row| {
            extract(row)
                .filter(|x| x.is_finite())
                .ok_or_else(|| InvalidInputError::NonNumeric {
                    row: row.index(),
                    field: DERIVED_FIELD.to_string(),
                    value: "<not computable>".to_string(),
                })
        })
    }

    /// Partition rows by label, reading values only for rows kept by
    /// `labels` (all rows when `None`).
    fn build<T, F>(
        table: &T,
        group_field: &str,
        labels: Option<&[&str]>,
        mut value_of: F,
    ) -> Result<Self, InvalidInputError>
    where
        T: Table + ?Sized,
        F: FnMut(RowView<'_, T>) -> Result<f64, InvalidInputError>,
    {
        let group_idx = table
            .field_index(group_field)
            .ok_or_else(|| InvalidInputError::MissingField {
                field: group_field.to_string(),
            })?;

        if table.row_count() == 0 {
            return Err(InvalidInputError::EmptyDataset);
        }

        let mut partition = Partition::default();
        for row in 0..table.row_count() {
            let label = table
                .cell(row, group_idx)
                .and_then(|v| v.as_label())
                .ok_or_else(|| InvalidInputError::MissingLabel {
                    row,
                    field: group_field.to_string(),
                })?;
            if labels.is_some_and(|keep| !keep.contains(&label.as_str())) {
                continue;
            }
            let value = value_of(RowView::new(table, row))?;
            partition.push(label, value);
        }

        Ok(partition.finish())
    }

    /// Build a view directly from `(label, values)` pairs.
    ///
    /// # Errors
    ///
    /// - [`InvalidInputError::EmptyGroup`] if a group has no values
    /// - [`InvalidInputError::DuplicateGroup`] if a label repeats
    /// - [`InvalidInputError::NonNumeric`] if a value is not finite
    /// - [`InvalidInputError::EmptyDataset`] if no groups are given
    pub fn from_groups<I, L, V>(groups: I) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: IntoIterator<Item = f64>,
    {
        let mut out: Vec<Group> = Vec::new();
        let mut row = 0;

        for (label, values) in groups {
            let label: String = label.into();
            if out.iter().any(|g| g.label == label) {
                return Err(InvalidInputError::DuplicateGroup { label });
            }

            let mut collected = Vec::new();
            for value in values {
                if !value.is_finite() {
                    return Err(InvalidInputError::NonNumeric {
                        row,
                        field: label,
                        value: value.to_string(),
                    });
                }
                collected.push(value);
                row += 1;
            }

            if collected.is_empty() {
                return Err(InvalidInputError::EmptyGroup { label });
            }
            out.push(Group {
                label,
                values: collected,
            });
        }

        if out.is_empty() {
            return Err(InvalidInputError::EmptyDataset);
        }
        Ok(Self { groups: out })
    }

    /// A single-group view for ungrouped data.
    pub fn single<V>(label: impl Into<String>, values: V) -> Result<Self, InvalidInputError>
    where
        V: IntoIterator<Item = f64>,
    {
        let label: String = label.into();
        Self::from_groups([(label, values)])
    }

    /// Restrict the view to the given labels, keeping first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::UnknownGroup`] if a label does not occur.
    pub fn select(&self, labels: &[&str]) -> Result<Self, InvalidInputError> {
        if let Some(missing) = labels.iter().find(|l| self.index_of(l).is_none()) {
            return Err(InvalidInputError::UnknownGroup {
                label: missing.to_string(),
            });
        }

        let groups: Vec<Group> = self
            .groups
            .iter()
            .filter(|g| labels.contains(&g.label.as_str()))
            .cloned()
            .collect();

        if groups.is_empty() {
            return Err(InvalidInputError::EmptyDataset);
        }
        Ok(Self { groups })
    }

    /// All groups in first-appearance order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Group labels in first-appearance order.
    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    /// Position of a label in [`labels`](Self::labels).
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.label == label)
    }

    /// Group by label.
    pub fn group(&self, label: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Values of one group.
    pub fn values(&self, label: &str) -> Option<&[f64]> {
        self.group(label).map(Group::values)
    }

    /// Number of rows in one group.
    pub fn group_len(&self, label: &str) -> Option<usize> {
        self.group(label).map(Group::len)
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of rows across all groups.
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// All values concatenated in group order.
    pub fn pooled(&self) -> Vec<f64> {
        self.groups
            .iter()
            .flat_map(|g| g.values.iter().copied())
            .collect()
    }
}

/// Order-preserving accumulation of `(label, value)` rows.
#[derive(Default)]
struct Partition {
    index: HashMap<String, usize>,
    groups: Vec<Group>,
}

impl Partition {
    fn push(&mut self, label: String, value: f64) {
        match self.index.get(&label) {
            Some(&i) => self.groups[i].values.push(value),
            None => {
                self.index.insert(label.clone(), self.groups.len());
                self.groups.push(Group {
                    label,
                    values: vec![value],
                });
            }
        }
    }

    fn finish(self) -> GroupedDataset {
        GroupedDataset {
            groups: self.groups,
        }
    }
}
