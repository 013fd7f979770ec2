//! Leaf formulas: relational branch distances over coerced operands, and
//! scalar arithmetic.

use crate::{
    condition::{ArithmeticOp, CompareOp},
    config::{DistanceConfig, StringDistanceMode},
    distance::{left_alignment_distance, text_order_gap},
    eval::outcome::{Outcome, UnknownCause},
    value::{CoercedPair, Value, coerce_pair},
};

/// Branch distance of `left op right` for two resolved operands.
pub(crate) fn compare_values(
    config: &DistanceConfig,
    op: CompareOp,
    left: &Value,
    right: &Value,
) -> Outcome {
    let Some(pair) = coerce_pair(left, right) else {
        return Outcome::invalid();
    };

    match pair {
        CoercedPair::Null => Outcome::missing(),
        CoercedPair::Integer(a, b) => relational(config, op, integer_gap(a, b)),
        CoercedPair::Numeric(a, b) => relational(config, op, a - b),
        CoercedPair::Text(a, b) => match op {
            CompareOp::Eq if a == b => Outcome::SATISFIED,
            CompareOp::Eq => match config.string_distance {
                StringDistanceMode::LeftAlignment => Outcome::known(left_alignment_distance(a, b)),
                StringDistanceMode::Constant => Outcome::known(config.not_equal_penalty),
            },
            _ => relational(config, op, text_order_gap(a, b)),
        },
        CoercedPair::Bool(a, b) => match op {
            CompareOp::Eq | CompareOp::Ne => {
                let satisfied = (a == b) == (op == CompareOp::Eq);
                if satisfied {
                    Outcome::SATISFIED
                } else {
                    Outcome::known(config.not_equal_penalty)
                }
            }
            _ => Outcome::invalid(),
        },
    }
}

// Exact difference, rounded only once; a non-zero gap never rounds to zero.
#[expect(clippy::cast_precision_loss)]
fn integer_gap(left: i64, right: i64) -> f64 {
    (i128::from(left) - i128::from(right)) as f64
}

/// Relational formula over the signed gap `left - right`.
pub(crate) fn relational(config: &DistanceConfig, op: CompareOp, gap: f64) -> Outcome {
    if gap.is_nan() {
        return Outcome::invalid();
    }

    let k = config.not_equal_penalty;
    let eps = config.boundary_epsilon;

    let distance = match op {
        CompareOp::Eq => gap.abs(),
        CompareOp::Ne => {
            if gap == 0.0 {
                k
            } else {
                0.0
            }
        }
        CompareOp::Lt => {
            if gap < 0.0 {
                0.0
            } else {
                gap + eps
            }
        }
        CompareOp::Lte => gap.max(0.0),
        CompareOp::Gt => {
            if gap > 0.0 {
                0.0
            } else {
                -gap + eps
            }
        }
        CompareOp::Gte => (-gap).max(0.0),
    };

    Outcome::known(distance)
}

/// Evaluate `left op right`. Integer operations stay integral unless they
/// overflow; division always yields a float.
pub(crate) fn arithmetic(op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value, UnknownCause> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let (a, b) = (*a, *b);
        let exact = match op {
            ArithmeticOp::Add => a.checked_add(b),
            ArithmeticOp::Subtract => a.checked_sub(b),
            ArithmeticOp::Multiply => a.checked_mul(b),
            ArithmeticOp::Modulo if b == 0 => return Err(UnknownCause::Invalid),
            ArithmeticOp::Modulo => a.checked_rem(b),
            ArithmeticOp::Divide => None,
        };
        if let Some(n) = exact {
            return Ok(Value::Int(n));
        }
    }

    let a = left.to_f64_coerced().ok_or(UnknownCause::Invalid)?;
    let b = right.to_f64_coerced().ok_or(UnknownCause::Invalid)?;

    let result = match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Subtract => a - b,
        ArithmeticOp::Multiply => a * b,
        ArithmeticOp::Divide | ArithmeticOp::Modulo if b == 0.0 => {
            return Err(UnknownCause::Invalid);
        }
        ArithmeticOp::Divide => a / b,
        ArithmeticOp::Modulo => a % b,
    };

    if result.is_finite() {
        Ok(Value::Float(result))
    } else {
        Err(UnknownCause::Invalid)
    }
}
