mod module_id;
pub use module_id::ModuleId;

mod constants;
pub use constants::{
    DEFAULT_BUDGET, DEFAULT_GRACE_SECS, DEFAULT_PLACEHOLDER, DEFAULT_SPLIT_MARKER,
    DEFAULT_STOPPED_TEXT, DEFAULT_TICK_MS, STYLE_TERMINATOR,
};

/// Interval between two updates of a task, in seconds.
///
/// `0` means the task runs exactly once and then terminates.
pub type IntervalSecs = u64;
