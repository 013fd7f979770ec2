use crate::{
    row::{ColumnRef, FieldPresence, Row},
    value::Value,
};
use std::collections::BTreeMap;

///
/// AliasMap
///
/// Table alias → table name, both normalized. Built from `FROM`/`JOIN`
/// clauses when the condition comes from a full statement.
///

pub type AliasMap = BTreeMap<String, String>;

///
/// EvaluationContext
///
/// Borrowed view over one probed row, resolving column references
/// (including table aliases) during distance evaluation.
///

#[derive(Clone, Copy, Debug)]
pub struct EvaluationContext<'a> {
    row: &'a Row,
    aliases: Option<&'a AliasMap>,
}

impl<'a> EvaluationContext<'a> {
    #[must_use]
    pub const fn new(row: &'a Row) -> Self {
        Self { row, aliases: None }
    }

    #[must_use]
    pub const fn with_aliases(row: &'a Row, aliases: &'a AliasMap) -> Self {
        Self {
            row,
            aliases: Some(aliases),
        }
    }

    #[must_use]
    pub const fn row(&self) -> &'a Row {
        self.row
    }

    /// Whether the referenced column exists on the row (its value may be `Null`).
    #[must_use]
    pub fn includes(&self, column: &ColumnRef) -> bool {
        matches!(self.lookup(column), FieldPresence::Present(_))
    }

    /// Value of the referenced column; `None` when the column is absent.
    #[must_use]
    pub fn value_of(&self, column: &ColumnRef) -> Option<&'a Value> {
        self.lookup(column).present()
    }

    // Qualifiers resolve through the alias map first, then as a table name.
    pub(crate) fn lookup(&self, column: &ColumnRef) -> FieldPresence<'a> {
        let Some(qualifier) = column.table() else {
            return self.row.field(None, column.column());
        };

        if let Some(table) = self.aliases.and_then(|aliases| aliases.get(qualifier)) {
            if let found @ FieldPresence::Present(_) =
                self.row.field(Some(table.as_str()), column.column())
            {
                return found;
            }
        }

        self.row.field(Some(qualifier), column.column())
    }
}
