use crate::distance::{Distance, INF_DISTANCE};

///
/// UnknownCause
///
/// Why a subtree could not be scored. `Missing` covers absent columns and
/// null operands; `Invalid` covers type mismatches, failed arithmetic, and
/// failed subqueries.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum UnknownCause {
    Missing,
    Invalid,
}

impl UnknownCause {
    // Invalid dominates: a malformed subtree stays malformed under negation.
    const fn worst(self, other: Self) -> Self {
        match (self, other) {
            (Self::Invalid, _) | (_, Self::Invalid) => Self::Invalid,
            _ => Self::Missing,
        }
    }
}

///
/// Outcome
///
/// Per-subtree evaluation result. `Known` distances are always finite;
/// every `Unknown` surfaces as `INF_DISTANCE`.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Outcome {
    Known(Distance),
    Unknown(UnknownCause),
}

impl Outcome {
    pub(crate) const SATISFIED: Self = Self::Known(Distance::ZERO);

    pub(crate) fn known(value: f64) -> Self {
        Self::Known(Distance::finite(value))
    }

    pub(crate) const fn missing() -> Self {
        Self::Unknown(UnknownCause::Missing)
    }

    pub(crate) const fn invalid() -> Self {
        Self::Unknown(UnknownCause::Invalid)
    }

    pub(crate) const fn distance(self) -> Distance {
        match self {
            Self::Known(d) => d,
            Self::Unknown(_) => INF_DISTANCE,
        }
    }

    pub(crate) fn is_satisfied(self) -> bool {
        matches!(self, Self::Known(d) if d.is_zero())
    }

    /// Conjunction: saturating sum; any unknown child makes the whole unknown.
    pub(crate) fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => Self::Known(a.saturating_add(b)),
            (Self::Unknown(a), Self::Unknown(b)) => Self::Unknown(a.worst(b)),
            (Self::Unknown(cause), Self::Known(_)) | (Self::Known(_), Self::Unknown(cause)) => {
                Self::Unknown(cause)
            }
        }
    }

    /// Disjunction: minimum; unknown only when both sides are unknown.
    pub(crate) fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => Self::Known(a.min(b)),
            (known @ Self::Known(_), Self::Unknown(_))
            | (Self::Unknown(_), known @ Self::Known(_)) => known,
            // any absent branch keeps the disjunction negatable
            (Self::Unknown(a), Self::Unknown(b)) => {
                if a == UnknownCause::Missing || b == UnknownCause::Missing {
                    Self::missing()
                } else {
                    Self::invalid()
                }
            }
        }
    }

    /// Negation with penalty `k` for a satisfied inner predicate.
    pub(crate) fn negate(self, k: f64) -> Self {
        match self {
            Self::Known(d) if d.is_zero() => Self::known(k),
            Self::Known(_) | Self::Unknown(UnknownCause::Missing) => Self::SATISFIED,
            Self::Unknown(UnknownCause::Invalid) => self,
        }
    }
}

///
/// TESTS
///
