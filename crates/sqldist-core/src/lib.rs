//! Core runtime for sqldist: condition translation, branch-distance
//! evaluation over probed rows, and the total `calculate` facade.
#![warn(unreachable_pub)]

pub mod cache;
pub mod condition;
pub mod config;
pub mod distance;
pub mod driver;
pub mod error;
pub mod eval;
pub mod facade;
pub mod obs;
pub mod row;
pub mod value;

pub(crate) mod logging;

///
/// Prelude
///
/// Prelude contains only the vocabulary needed to score conditions.
/// No caches, sinks, or error internals are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::DistanceConfig,
        distance::{Distance, INF_DISTANCE},
        driver::{DriverError, QueryResult, SqlDriver},
        facade::{SqlDistance, SqlDistanceEngine},
        row::Row,
        value::Value,
    };
}
