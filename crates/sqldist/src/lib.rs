//! ## Crate layout
//! - `core`: condition translation, distance evaluation, caching, and metrics.
//! - `error`: public error type for the fallible setup surface.
//!
//! Scoring itself is total: `SqlDistanceEngine::calculate` always returns a
//! distance, with `INF_DISTANCE` standing in for every failure.

pub use sqldist_core as core;

pub mod error;

pub use error::Error;

use sqldist_core::{
    condition::{self, ParsedCondition},
    config::DistanceConfig,
    facade::SqlDistanceEngine,
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build an engine from TOML configuration text.
pub fn engine_from_toml(text: &str) -> Result<SqlDistanceEngine, Error> {
    let config = DistanceConfig::from_toml_str(text)?;

    Ok(SqlDistanceEngine::new(config))
}

/// Translate condition text without scoring it.
pub fn parse(text: &str) -> Result<ParsedCondition, Error> {
    Ok(condition::parse_condition(text)?)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::{Error, engine_from_toml, parse};
}
