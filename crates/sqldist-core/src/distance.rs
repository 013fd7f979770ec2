//! Module: distance
//! Responsibility: the `Distance` scalar and its overflow-safe combinators.
//! Does not own: per-operator distance formulas (see `eval`).

use serde::Serialize;
use std::{cmp::Ordering, fmt};

///
/// CONSTANTS
///

/// Sentinel meaning "unsatisfiable or unknown".
/// Strictly greater than every finite distance, which saturates at `f64::MAX`.
pub const INF_DISTANCE: Distance = Distance(f64::INFINITY);

/// Maximum distance for a single character (2^16).
pub const MAX_CHAR_DISTANCE: u64 = 65_536;

///
/// Distance
///
/// Non-negative branch distance; `0` means the predicate is satisfied.
/// Either `INF_DISTANCE` or a finite value in `[0, f64::MAX]`.
///

#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Distance(f64);

impl Distance {
    pub const ZERO: Self = Self(0.0);

    /// Build a finite distance, saturating on overflow.
    /// Negative inputs clamp to zero; NaN maps to `INF_DISTANCE`.
    #[must_use]
    pub fn finite(value: f64) -> Self {
        if value.is_nan() {
            return INF_DISTANCE;
        }
        if value <= 0.0 {
            return Self::ZERO;
        }

        Self(value.min(f64::MAX))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    #[must_use]
    pub const fn is_inf(self) -> bool {
        self.0.is_infinite()
    }

    /// Add two distances; `INF_DISTANCE` absorbs, finite sums saturate.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        if self.is_inf() || other.is_inf() {
            return INF_DISTANCE;
        }

        Self::finite(self.0 + other.0)
    }

    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 { other } else { self }
    }
}

impl Eq for Distance {}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN never reaches a Distance, so total_cmp agrees with numeric order.
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inf() {
            write!(f, "INF")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<Distance> for f64 {
    fn from(d: Distance) -> Self {
        d.0
    }
}

/// Character-wise distance between two strings aligned on their first char.
///
/// Each unit of length difference costs `MAX_CHAR_DISTANCE`; each aligned
/// position costs the absolute code-point difference.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn left_alignment_distance(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count() as u64;
    let len_b = b.chars().count() as u64;

    let mut dist = len_a.abs_diff(len_b).saturating_mul(MAX_CHAR_DISTANCE);
    for (x, y) in a.chars().zip(b.chars()) {
        dist = dist.saturating_add(u64::from(u32::from(x).abs_diff(u32::from(y))));
    }

    dist as f64
}

/// Signed gap between two strings under lexicographic order.
///
/// Negative when `a < b`, zero when equal, positive when `a > b`.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn text_order_gap(a: &str, b: &str) -> f64 {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return f64::from(u32::from(x)) - f64::from(u32::from(y));
        }
    }

    a.chars().count() as f64 - b.chars().count() as f64
}

///
/// TESTS
///
