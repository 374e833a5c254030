//! Runtime configuration, read once from the environment at startup and
//! threaded through the application context.

use std::env;

/// Environment variable toggling debug mode.
pub const DEBUG_ENV_VAR: &str = "WAYPOINT_DEBUG";

/// The debug/production switch.
///
/// Debug mode surfaces dispatch failures as rich diagnostics instead of
/// routing them through the error escalation pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub debug: bool,
}

impl RuntimeConfig {
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Load from the environment. Absent or unrecognized values mean
    /// production mode.
    pub fn from_env() -> Self {
        Self {
            debug: parse_flag(env::var(DEBUG_ENV_VAR).ok().as_deref()),
        }
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    match value {
        Some(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on"
        ),
        None => false,
    }
}
