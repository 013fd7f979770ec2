//! Module: condition
//! Responsibility: the closed condition AST and its construction from SQL text.
//! Does not own: distance semantics (see `eval`) or caching (see `cache`).
//! Boundary: `translate` is the only place that touches the grammar parser.

mod fingerprint;
mod translate;


use crate::{
    row::{AliasMap, ColumnRef},
    value::Value,
};
use derive_more::Display;
use std::collections::BTreeSet;

// re-exports
pub use fingerprint::ConditionFingerprint;
pub use translate::{MAX_CONDITION_BYTES, MAX_CONDITION_TOKENS, TranslateError, parse_condition};

///
/// Condition AST
///
/// Pure, row-agnostic representation of a SQL boolean condition.
/// Built once per distinct condition text and never mutated afterwards;
/// all interpretation happens in `eval`.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum CompareOp {
    #[display("=")]
    Eq,
    #[display("<>")]
    Ne,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
}

///
/// ArithmeticOp
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ArithmeticOp {
    #[display("+")]
    Add,
    #[display("-")]
    Subtract,
    #[display("*")]
    Multiply,
    #[display("/")]
    Divide,
    #[display("%")]
    Modulo,
}

///
/// Expr
///
/// Scalar operand of a condition node.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Value),
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl Expr {
    #[must_use]
    pub fn column(name: &str) -> Self {
        Self::Column(ColumnRef::unqualified(name))
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn arithmetic(op: ArithmeticOp, left: Self, right: Self) -> Self {
        Self::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn collect_tables(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Column(column) => {
                if let Some(table) = column.table() {
                    out.insert(table.to_string());
                }
            }
            Self::Literal(_) => {}
            Self::Arithmetic { left, right, .. } => {
                left.collect_tables(out);
                right.collect_tables(out);
            }
        }
    }
}

///
/// ConditionNode
///

#[derive(Clone, Debug, PartialEq)]
pub enum ConditionNode {
    Comparison {
        op: CompareOp,
        left: Expr,
        right: Expr,
    },
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    IsNull {
        expr: Expr,
        negated: bool,
    },
    Between {
        expr: Expr,
        low: Expr,
        high: Expr,
    },
    InList {
        expr: Expr,
        candidates: Vec<Expr>,
    },
    InSubselect {
        expr: Expr,
        subquery: String,
    },
    Like {
        expr: Expr,
        pattern: Expr,
        negated: bool,
        case_insensitive: bool,
    },
    Exists {
        subquery: String,
    },
}

impl ConditionNode {
    #[must_use]
    pub const fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Self::Comparison { op, left, right }
    }

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Distinct table qualifiers referenced anywhere in this condition.
    #[must_use]
    pub fn referenced_tables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_tables(&mut out);

        out
    }

    fn collect_tables(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Comparison { left, right, .. } => {
                left.collect_tables(out);
                right.collect_tables(out);
            }
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_tables(out);
                }
            }
            Self::Not(inner) => inner.collect_tables(out),
            Self::IsNull { expr, .. } | Self::InSubselect { expr, .. } => {
                expr.collect_tables(out);
            }
            Self::Between { expr, low, high } => {
                expr.collect_tables(out);
                low.collect_tables(out);
                high.collect_tables(out);
            }
            Self::InList { expr, candidates } => {
                expr.collect_tables(out);
                for candidate in candidates {
                    candidate.collect_tables(out);
                }
            }
            Self::Like { expr, pattern, .. } => {
                expr.collect_tables(out);
                pattern.collect_tables(out);
            }
            Self::Exists { .. } => {}
        }
    }
}

///
/// ParsedCondition
///
/// Translation result for one condition text: the AST (absent for a
/// statement without `WHERE`), alias bindings, and the probe query used
/// to fetch candidate rows when the caller supplies none.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ParsedCondition {
    condition: Option<ConditionNode>,
    aliases: AliasMap,
    probe_query: Option<String>,
}

impl ParsedCondition {
    /// Wrap a bare condition; the probe query spans its qualified tables.
    #[must_use]
    pub fn from_condition(condition: ConditionNode) -> Self {
        let tables = condition.referenced_tables();
        let probe_query = (!tables.is_empty()).then(|| {
            let from = tables.into_iter().collect::<Vec<_>>().join(", ");
            format!("SELECT * FROM {from}")
        });

        Self {
            condition: Some(condition),
            aliases: AliasMap::new(),
            probe_query,
        }
    }

    pub(crate) const fn from_statement(
        condition: Option<ConditionNode>,
        aliases: AliasMap,
        probe_query: Option<String>,
    ) -> Self {
        Self {
            condition,
            aliases,
            probe_query,
        }
    }

    #[must_use]
    pub const fn condition(&self) -> Option<&ConditionNode> {
        self.condition.as_ref()
    }

    #[must_use]
    pub const fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    #[must_use]
    pub fn probe_query(&self) -> Option<&str> {
        self.probe_query.as_deref()
    }
}
