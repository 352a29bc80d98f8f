//! Optional tracing subscriber setup for rankscope.
//!
//! Every analysis operation opens a span and emits a completion event. This
//! module names those spans consistently and offers a one-call
//! subscriber for consumers who do not bring their own.
//!
//! # Usage
//!
//! ```ignore
//! use rankscope_core::tracing_config::{init_tracing, level_from_env};
//! use tracing::Level;
//!
//! init_tracing(level_from_env(Level::INFO));
//! ```

use tracing::Level;

/// Target prefix used by all rankscope tracing spans and events.
///
/// ```text
/// RUST_LOG=rankscope=debug
/// ```
pub const TARGET_PREFIX: &str = "rankscope";

/// Environment variable consulted by [`level_from_env`].
pub const LOG_LEVEL_ENV: &str = "RANKSCOPE_LOG_LEVEL";

/// Standard span names.
pub mod span_names {
    /// Distribution analysis over one score sample.
    pub const ANALYZE: &str = "rankscope::analyze";
    /// Category grouping.
    pub const AGGREGATE: &str = "rankscope::aggregate";
    /// Whole-report assembly for one query.
    pub const REPORT: &str = "rankscope::report";
    /// Baseline vs. variant diff.
    pub const COMPARE: &str = "rankscope::compare";
    /// Approximate score decomposition.
    pub const EXPLAIN: &str = "rankscope::explain";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Checks `RANKSCOPE_LOG_LEVEL` first, then falls back to `default`.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}

/// Installs a global `tracing-subscriber` fmt subscriber at `level`.
///
/// Returns `false` if a global subscriber was already set; the existing one
/// is left in place.
pub fn init_tracing(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok()
}
