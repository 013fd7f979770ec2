//! Module: value::coerce
//! Responsibility: bring two comparison operands onto a common domain.
//! Does not own: distance formulas (see `eval`).
//! Boundary: `eval` consumes `CoercedPair`; `None` means type mismatch.

use crate::value::{
    CoercionFamily, CoercionFamilyExt, Value, parse_instant_millis, parse_time_millis,
};

///
/// CoercedPair
///
/// Two comparison operands projected onto one comparable domain.
/// Temporal text is projected onto `Integer` as milliseconds.
///

#[derive(Clone, Debug, PartialEq)]
pub enum CoercedPair<'a> {
    Null,
    /// Both operands are exact integers; no f64 rounding applies.
    Integer(i64, i64),
    Numeric(f64, f64),
    Text(&'a str, &'a str),
    Bool(bool, bool),
}

/// Coerce two operands for comparison. Returns `None` on type mismatch.
#[must_use]
pub(crate) fn coerce_pair<'a>(left: &'a Value, right: &'a Value) -> Option<CoercedPair<'a>> {
    use CoercionFamily as F;

    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return Some(CoercedPair::Integer(*a, *b));
    }

    match (left.coercion_family(), right.coercion_family()) {
        (F::Null, _) | (_, F::Null) => Some(CoercedPair::Null),
        (F::Numeric, F::Numeric) => Some(CoercedPair::Numeric(left.as_f64()?, right.as_f64()?)),
        (F::Textual, F::Textual) => Some(coerce_text_pair(left.as_text()?, right.as_text()?)),
        (F::Numeric, F::Textual) | (F::Textual, F::Numeric) => Some(CoercedPair::Numeric(
            left.to_f64_coerced()?,
            right.to_f64_coerced()?,
        )),
        (F::Bool, _) | (_, F::Bool) => Some(CoercedPair::Bool(
            left.to_bool_coerced()?,
            right.to_bool_coerced()?,
        )),
    }
}

// Two text operands compare on the time axis only when both parse the same way.
fn coerce_text_pair<'a>(left: &'a str, right: &'a str) -> CoercedPair<'a> {
    if let (Some(a), Some(b)) = (parse_instant_millis(left), parse_instant_millis(right)) {
        return CoercedPair::Integer(a, b);
    }
    if let (Some(a), Some(b)) = (parse_time_millis(left), parse_time_millis(right)) {
        return CoercedPair::Integer(a, b);
    }

    CoercedPair::Text(left, right)
}
