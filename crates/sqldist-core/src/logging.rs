//! Internal logging helpers for structured sqldist events.

use crate::condition::ConditionFingerprint;
use dashmap::DashSet;

/// Single logging target for sqldist.
pub(crate) const LOG_TARGET: &str = "sqldist";

macro_rules! sqldist_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use sqldist_log;

///
/// WarnOnce
///
/// Remembers which (event, condition) pairs were already reported so a
/// search loop re-evaluating the same broken condition logs it once.
///

#[derive(Debug, Default)]
pub(crate) struct WarnOnce {
    seen: DashSet<(&'static str, ConditionFingerprint)>,
}

impl WarnOnce {
    /// Returns `true` the first time a pair is seen.
    pub(crate) fn first(&self, event: &'static str, fingerprint: ConditionFingerprint) -> bool {
        self.seen.insert((event, fingerprint))
    }

    pub(crate) fn clear(&self) {
        self.seen.clear();
    }
}

///
/// TESTS
///
