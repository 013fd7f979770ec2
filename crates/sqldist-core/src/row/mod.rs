//! Module: row
//! Responsibility: in-memory snapshot of one probed tuple and column identity.
//! Does not own: alias resolution or evaluation (see `row::context`).

mod context;

#[cfg(test)]
mod tests;

use crate::value::{Value, casefold};
use derive_more::IntoIterator;
use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use context::{AliasMap, EvaluationContext};

///
/// ColumnRef
///
/// Optional table qualifier plus column name, both normalized to lower case.
/// Identity is by normalized names.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ColumnRef {
    table: Option<String>,
    column: String,
}

impl ColumnRef {
    #[must_use]
    pub fn new(table: Option<&str>, column: &str) -> Self {
        Self {
            table: table.map(casefold),
            column: casefold(column),
        }
    }

    #[must_use]
    pub fn unqualified(column: &str) -> Self {
        Self::new(None, column)
    }

    #[must_use]
    pub fn qualified(table: &str, column: &str) -> Self {
        Self::new(Some(table), column)
    }

    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

///
/// FieldPresence
///
/// Result of attempting to read a column from a row. This distinguishes
/// between an absent column and a present column whose value is `Null`.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldPresence<'a> {
    /// Column exists and has a value (including `Value::Null`).
    Present(&'a Value),

    /// Column is not present on the row.
    Missing,
}

impl<'a> FieldPresence<'a> {
    #[must_use]
    pub const fn present(self) -> Option<&'a Value> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing => None,
        }
    }
}

///
/// Cell
///
/// One column value of a probed row. `table` is `None` for values whose
/// source table is unknown (computed or projected columns).
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Cell {
    pub table: Option<String>,
    pub column: String,
    pub value: Value,
}

///
/// Row
///
/// Ordered table → column → value snapshot of one probed tuple.
/// Insertion order is kept so subquery results expose their first column.
///

#[derive(Clone, Debug, Default, Deserialize, IntoIterator, PartialEq, Serialize)]
pub struct Row {
    #[into_iterator(owned, ref)]
    cells: Vec<Cell>,
}

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Builder-style insert of a table-qualified cell.
    #[must_use]
    pub fn with(mut self, table: &str, column: &str, value: impl Into<Value>) -> Self {
        self.insert(Some(table), column, value);
        self
    }

    /// Builder-style insert of a cell whose source table is unknown.
    #[must_use]
    pub fn with_unqualified(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(None, column, value);
        self
    }

    /// Insert or replace one cell. Names are normalized.
    pub fn insert(&mut self, table: Option<&str>, column: &str, value: impl Into<Value>) {
        let table = table.map(casefold);
        let column = casefold(column);
        let value = value.into();

        if let Some(cell) = self
            .cells
            .iter_mut()
            .find(|cell| cell.table == table && cell.column == column)
        {
            cell.value = value;
            return;
        }

        self.cells.push(Cell {
            table,
            column,
            value,
        });
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value of the first column, as projected by a subquery.
    #[must_use]
    pub fn first_value(&self) -> Option<&Value> {
        self.cells.first().map(|cell| &cell.value)
    }

    /// Whether any cell is recorded under the given (normalized) table name.
    #[must_use]
    pub fn has_table(&self, table: &str) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.table.as_deref() == Some(table))
    }

    /// Read one column by normalized names.
    ///
    /// A qualified read matches cells of that table and table-less cells;
    /// an unqualified read matches the first cell with that column name.
    #[must_use]
    pub fn field(&self, table: Option<&str>, column: &str) -> FieldPresence<'_> {
        let found = self.cells.iter().find(|cell| {
            cell.column == column
                && match (table, cell.table.as_deref()) {
                    (Some(wanted), Some(actual)) => wanted == actual,
                    _ => true,
                }
        });

        match found {
            Some(cell) => FieldPresence::Present(&cell.value),
            None => FieldPresence::Missing,
        }
    }
}
