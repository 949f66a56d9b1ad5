//! Common model-level constants.
//!
//! Defaults for the bar layout and engine timings live here so the config layer,
//! the aggregator and the tests agree on a single value.

/// Marker that resets color/style back to the bar default.
///
/// An output ending with this marker keeps it after truncation, so the style does not bleed into neighbouring outputs.
pub const STYLE_TERMINATOR: &str = "^d^";

/// Maximum number of characters of a single output before it is truncated.
pub const DEFAULT_BUDGET: usize = 60;

/// Marker inserted at the split point for two-region displays.
pub const DEFAULT_SPLIT_MARKER: &str = ";";

/// Text shown when no task produced any output.
pub const DEFAULT_PLACEHOLDER: &str = "No output";

/// Text shown once the engine has stopped.
pub const DEFAULT_STOPPED_TEXT: &str = "Statusbar stopped";

/// Aggregator tick in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 500;

/// Grace period given to tasks on shutdown before the process is killed.
pub const DEFAULT_GRACE_SECS: u64 = 5;
