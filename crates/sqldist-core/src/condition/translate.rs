//! Module: condition::translate
//! Responsibility: map sqlparser's generic expression tree onto the closed AST.
//! Does not own: evaluation or caching.
//! Boundary: any construct outside the supported set is a `TranslateError`.

use crate::{
    condition::{ArithmeticOp, CompareOp, ConditionNode, Expr, ParsedCondition},
    row::{AliasMap, ColumnRef},
    value::{Value, casefold},
};
use sqlparser::{
    ast::{
        self as sql, BinaryOperator, FromTable, SetExpr, Statement, TableFactor, TableWithJoins,
        UnaryOperator,
    },
    dialect::GenericDialect,
    parser::{Parser, ParserError},
    tokenizer::{Token, Tokenizer},
};
use thiserror::Error as ThisError;

const STATEMENT_KEYWORDS: [&str; 4] = ["select", "update", "delete", "with"];

/// Longest condition text accepted, in bytes.
pub const MAX_CONDITION_BYTES: usize = 64 * 1024;

/// Most non-whitespace tokens accepted. Bounds the depth of the trees built
/// while parsing, so oversized input is rejected instead of exhausting the stack.
pub const MAX_CONDITION_TOKENS: usize = 4_096;

///
/// TranslateError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TranslateError {
    #[error("condition text is empty")]
    Empty,

    #[error("sql parse error: {0}")]
    Parse(#[from] ParserError),

    #[error("unexpected trailing input starting at '{token}'")]
    TrailingInput { token: String },

    #[error("expected exactly one statement, found {count}")]
    StatementCount { count: usize },

    #[error("unsupported statement: {kind}")]
    UnsupportedStatement { kind: String },

    #[error("unsupported condition: {construct}")]
    UnsupportedCondition { construct: String },

    #[error("unsupported expression: {construct}")]
    UnsupportedExpression { construct: String },

    #[error("invalid numeric literal '{literal}'")]
    InvalidNumber { literal: String },

    #[error("condition too large: {size} {measure} exceeds the limit of {limit}")]
    TooLarge {
        measure: &'static str,
        size: usize,
        limit: usize,
    },
}

/// Parse condition text (a bare boolean expression or a full
/// `SELECT`/`UPDATE`/`DELETE` statement) into a `ParsedCondition`.
pub fn parse_condition(text: &str) -> Result<ParsedCondition, TranslateError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TranslateError::Empty);
    }

    let tokens = bounded_tokens(text)?;
    if starts_with_statement_keyword(text) {
        parse_statement(tokens)
    } else {
        parse_bare_condition(tokens)
    }
}

// Tokenize once, enforcing the size limits before any tree is built.
fn bounded_tokens(text: &str) -> Result<Vec<Token>, TranslateError> {
    if text.len() > MAX_CONDITION_BYTES {
        return Err(TranslateError::TooLarge {
            measure: "bytes",
            size: text.len(),
            limit: MAX_CONDITION_BYTES,
        });
    }

    let tokens = Tokenizer::new(&GenericDialect {}, text)
        .tokenize()
        .map_err(ParserError::from)?;

    let significant = tokens
        .iter()
        .filter(|token| !matches!(token, Token::Whitespace(_)))
        .count();
    if significant > MAX_CONDITION_TOKENS {
        return Err(TranslateError::TooLarge {
            measure: "tokens",
            size: significant,
            limit: MAX_CONDITION_TOKENS,
        });
    }

    Ok(tokens)
}

fn starts_with_statement_keyword(text: &str) -> bool {
    let head = text
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .map(casefold)
        .unwrap_or_default();

    STATEMENT_KEYWORDS.contains(&head.as_str())
}

fn parse_bare_condition(tokens: Vec<Token>) -> Result<ParsedCondition, TranslateError> {
    let dialect = GenericDialect {};
    let mut parser = Parser::new(&dialect).with_tokens(tokens);
    let expr = parser.parse_expr()?;

    // the whole input must be one expression
    let next = parser.peek_token();
    if next.token != Token::EOF {
        return Err(TranslateError::TrailingInput {
            token: next.token.to_string(),
        });
    }

    Ok(ParsedCondition::from_condition(translate_condition(&expr)?))
}

fn parse_statement(tokens: Vec<Token>) -> Result<ParsedCondition, TranslateError> {
    let dialect = GenericDialect {};
    let mut statements = Parser::new(&dialect).with_tokens(tokens).parse_statements()?;
    if statements.len() != 1 {
        return Err(TranslateError::StatementCount {
            count: statements.len(),
        });
    }

    match statements.remove(0) {
        Statement::Query(query) => match query.body.as_ref() {
            SetExpr::Select(select) => {
                statement_condition(select.selection.as_ref(), &select.from)
            }
            other => Err(TranslateError::UnsupportedStatement {
                kind: format!("set expression '{other}'"),
            }),
        },
        Statement::Update {
            table, selection, ..
        } => statement_condition(selection.as_ref(), std::slice::from_ref(&table)),
        Statement::Delete(delete) => {
            let from = match &delete.from {
                FromTable::WithFromKeyword(from) | FromTable::WithoutKeyword(from) => from,
            };
            statement_condition(delete.selection.as_ref(), from)
        }
        other => Err(TranslateError::UnsupportedStatement {
            kind: statement_kind(&other),
        }),
    }
}

fn statement_kind(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn statement_condition(
    selection: Option<&sql::Expr>,
    from: &[TableWithJoins],
) -> Result<ParsedCondition, TranslateError> {
    let condition = selection.map(translate_condition).transpose()?;
    let aliases = collect_aliases(from);
    let probe_query = (!from.is_empty()).then(|| {
        let from = from
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT * FROM {from}")
    });

    Ok(ParsedCondition::from_statement(
        condition,
        aliases,
        probe_query,
    ))
}

fn collect_aliases(from: &[TableWithJoins]) -> AliasMap {
    let mut aliases = AliasMap::new();
    let factors = from
        .iter()
        .flat_map(|twj| std::iter::once(&twj.relation).chain(twj.joins.iter().map(|j| &j.relation)));

    for factor in factors {
        if let TableFactor::Table {
            name,
            alias: Some(alias),
            ..
        } = factor
        {
            if let Some(table) = name.0.last() {
                aliases.insert(casefold(&alias.name.value), casefold(&table.value));
            }
        }
    }

    aliases
}

// ---- conditions ----------------------------------------------------------

/// Translate one boolean SQL expression into a `ConditionNode`.
pub(crate) fn translate_condition(expr: &sql::Expr) -> Result<ConditionNode, TranslateError> {
    match expr {
        sql::Expr::Nested(inner) => translate_condition(inner),

        sql::Expr::BinaryOp { left, op, right } => match op {
            BinaryOperator::And => Ok(ConditionNode::And(flatten(expr, &BinaryOperator::And)?)),
            BinaryOperator::Or => Ok(ConditionNode::Or(flatten(expr, &BinaryOperator::Or)?)),
            _ => {
                let op = compare_op(op).ok_or_else(|| unsupported_condition(expr))?;
                Ok(ConditionNode::compare(
                    op,
                    translate_expr(left)?,
                    translate_expr(right)?,
                ))
            }
        },

        sql::Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: inner,
        } => Ok(ConditionNode::not(translate_condition(inner)?)),

        sql::Expr::IsNull(inner) => Ok(ConditionNode::IsNull {
            expr: translate_expr(inner)?,
            negated: false,
        }),
        sql::Expr::IsNotNull(inner) => Ok(ConditionNode::IsNull {
            expr: translate_expr(inner)?,
            negated: true,
        }),

        sql::Expr::IsTrue(inner) => truth_test(inner, true, false),
        sql::Expr::IsFalse(inner) => truth_test(inner, false, false),
        sql::Expr::IsNotTrue(inner) => truth_test(inner, true, true),
        sql::Expr::IsNotFalse(inner) => truth_test(inner, false, true),

        sql::Expr::Between {
            expr: inner,
            negated,
            low,
            high,
        } => Ok(negate_if(
            *negated,
            ConditionNode::Between {
                expr: translate_expr(inner)?,
                low: translate_expr(low)?,
                high: translate_expr(high)?,
            },
        )),

        sql::Expr::InList {
            expr: inner,
            list,
            negated,
        } => {
            let candidates = list
                .iter()
                .map(translate_expr)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(negate_if(
                *negated,
                ConditionNode::InList {
                    expr: translate_expr(inner)?,
                    candidates,
                },
            ))
        }

        sql::Expr::InSubquery {
            expr: inner,
            subquery,
            negated,
        } => Ok(negate_if(
            *negated,
            ConditionNode::InSubselect {
                expr: translate_expr(inner)?,
                subquery: subquery.to_string(),
            },
        )),

        sql::Expr::Exists { subquery, negated } => Ok(negate_if(
            *negated,
            ConditionNode::Exists {
                subquery: subquery.to_string(),
            },
        )),

        sql::Expr::Like {
            negated,
            expr: inner,
            pattern,
            escape_char: None,
            ..
        } => Ok(ConditionNode::Like {
            expr: translate_expr(inner)?,
            pattern: translate_expr(pattern)?,
            negated: *negated,
            case_insensitive: false,
        }),
        sql::Expr::ILike {
            negated,
            expr: inner,
            pattern,
            escape_char: None,
            ..
        } => Ok(ConditionNode::Like {
            expr: translate_expr(inner)?,
            pattern: translate_expr(pattern)?,
            negated: *negated,
            case_insensitive: true,
        }),

        // a bare boolean operand is shorthand for `operand = TRUE`
        sql::Expr::Identifier(_)
        | sql::Expr::CompoundIdentifier(_)
        | sql::Expr::Value(sql::Value::Boolean(_)) => Ok(ConditionNode::compare(
            CompareOp::Eq,
            translate_expr(expr)?,
            Expr::Literal(Value::Bool(true)),
        )),

        _ => Err(unsupported_condition(expr)),
    }
}

// Flatten a left-deep chain of one logical operator into its operands.
fn flatten(
    expr: &sql::Expr,
    wanted: &BinaryOperator,
) -> Result<Vec<ConditionNode>, TranslateError> {
    let mut children = Vec::new();
    let mut pending = vec![expr];

    while let Some(current) = pending.pop() {
        match current {
            sql::Expr::BinaryOp { left, op, right } if op == wanted => {
                // right first so the left operand is translated first
                pending.push(right);
                pending.push(left);
            }
            other => children.push(translate_condition(other)?),
        }
    }

    Ok(children)
}

fn truth_test(
    inner: &sql::Expr,
    expected: bool,
    negated: bool,
) -> Result<ConditionNode, TranslateError> {
    Ok(negate_if(
        negated,
        ConditionNode::compare(
            CompareOp::Eq,
            translate_expr(inner)?,
            Expr::Literal(Value::Bool(expected)),
        ),
    ))
}

fn negate_if(negated: bool, node: ConditionNode) -> ConditionNode {
    if negated {
        ConditionNode::not(node)
    } else {
        node
    }
}

const fn compare_op(op: &BinaryOperator) -> Option<CompareOp> {
    match op {
        BinaryOperator::Eq => Some(CompareOp::Eq),
        BinaryOperator::NotEq => Some(CompareOp::Ne),
        BinaryOperator::Lt => Some(CompareOp::Lt),
        BinaryOperator::LtEq => Some(CompareOp::Lte),
        BinaryOperator::Gt => Some(CompareOp::Gt),
        BinaryOperator::GtEq => Some(CompareOp::Gte),
        _ => None,
    }
}

const fn arithmetic_op(op: &BinaryOperator) -> Option<ArithmeticOp> {
    match op {
        BinaryOperator::Plus => Some(ArithmeticOp::Add),
        BinaryOperator::Minus => Some(ArithmeticOp::Subtract),
        BinaryOperator::Multiply => Some(ArithmeticOp::Multiply),
        BinaryOperator::Divide => Some(ArithmeticOp::Divide),
        BinaryOperator::Modulo => Some(ArithmeticOp::Modulo),
        _ => None,
    }
}

fn unsupported_condition(expr: &sql::Expr) -> TranslateError {
    TranslateError::UnsupportedCondition {
        construct: expr.to_string(),
    }
}

fn unsupported_expression(expr: &sql::Expr) -> TranslateError {
    TranslateError::UnsupportedExpression {
        construct: expr.to_string(),
    }
}

// ---- scalar operands -----------------------------------------------------

/// Translate one scalar SQL expression into an `Expr`.
pub(crate) fn translate_expr(expr: &sql::Expr) -> Result<Expr, TranslateError> {
    match expr {
        sql::Expr::Identifier(ident) => Ok(Expr::Column(ColumnRef::unqualified(&ident.value))),

        // schema-qualified names keep only `table.column`
        sql::Expr::CompoundIdentifier(idents) => match idents.as_slice() {
            [.., table, column] => Ok(Expr::Column(ColumnRef::qualified(
                &table.value,
                &column.value,
            ))),
            [column] => Ok(Expr::Column(ColumnRef::unqualified(&column.value))),
            [] => Err(unsupported_expression(expr)),
        },

        sql::Expr::Value(value) => translate_value(value).map(Expr::Literal),

        // typed literals (DATE '..', TIMESTAMP '..') compare through their text
        sql::Expr::TypedString { value, .. } => Ok(Expr::Literal(Value::Text(value.clone()))),

        sql::Expr::Nested(inner) | sql::Expr::Cast { expr: inner, .. } => translate_expr(inner),

        sql::Expr::UnaryOp { op, expr: inner } => match op {
            UnaryOperator::Plus => translate_expr(inner),
            UnaryOperator::Minus => Ok(negate_expr(translate_expr(inner)?)),
            _ => Err(unsupported_expression(expr)),
        },

        sql::Expr::BinaryOp { left, op, right } => {
            let op = arithmetic_op(op).ok_or_else(|| unsupported_expression(expr))?;
            Ok(Expr::arithmetic(
                op,
                translate_expr(left)?,
                translate_expr(right)?,
            ))
        }

        _ => Err(unsupported_expression(expr)),
    }
}

fn negate_expr(expr: Expr) -> Expr {
    match expr {
        Expr::Literal(Value::Int(n)) if n != i64::MIN => Expr::Literal(Value::Int(-n)),
        Expr::Literal(Value::Float(x)) => Expr::Literal(Value::Float(-x)),
        other => Expr::arithmetic(ArithmeticOp::Subtract, Expr::Literal(Value::Int(0)), other),
    }
}

fn translate_value(value: &sql::Value) -> Result<Value, TranslateError> {
    match value {
        sql::Value::Number(literal, _) => parse_number(literal),
        sql::Value::SingleQuotedString(text)
        | sql::Value::DoubleQuotedString(text)
        | sql::Value::EscapedStringLiteral(text)
        | sql::Value::NationalStringLiteral(text) => Ok(Value::Text(text.clone())),
        sql::Value::Boolean(b) => Ok(Value::Bool(*b)),
        sql::Value::Null => Ok(Value::Null),
        other => Err(TranslateError::UnsupportedExpression {
            construct: other.to_string(),
        }),
    }
}

fn parse_number(literal: &str) -> Result<Value, TranslateError> {
    if let Ok(n) = literal.parse::<i64>() {
        return Ok(Value::Int(n));
    }

    literal
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(Value::Float)
        .ok_or_else(|| TranslateError::InvalidNumber {
            literal: literal.to_string(),
        })
}
