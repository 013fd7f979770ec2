//! Coercion-routing family classification for `Value`.
//!
//! This module defines only coarse routing categories used by comparison
//! coercion. It does not define arithmetic or ordering capabilities.

use crate::value::Value;

///
/// CoercionFamily
///
/// Coarse value classification used only for coercion routing.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoercionFamily {
    Numeric, // Int, Float
    Textual, // Text
    Bool,
    Null,
}

///
/// CoercionFamilyExt
///
/// Maps a value to its coercion-routing family.
///
pub trait CoercionFamilyExt {
    /// Returns the coercion-routing family for this value.
    fn coercion_family(&self) -> CoercionFamily;
}

impl CoercionFamilyExt for Value {
    fn coercion_family(&self) -> CoercionFamily {
        match self {
            Self::Int(_) | Self::Float(_) => CoercionFamily::Numeric,
            Self::Text(_) => CoercionFamily::Textual,
            Self::Bool(_) => CoercionFamily::Bool,
            Self::Null => CoercionFamily::Null,
        }
    }
}
