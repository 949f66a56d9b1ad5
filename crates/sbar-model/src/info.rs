use serde::{Deserialize, Serialize};

use crate::IntervalSecs;

/// Point-in-time status of one task, as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    /// Human-readable display name of the monitor.
    pub name: String,
    /// Seconds since the task loop started; `0` while inactive.
    pub uptime: u64,
    /// Configured interval between updates, in seconds.
    pub interval: IntervalSecs,
    /// Whether the task loop is currently running.
    pub active: bool,
}
