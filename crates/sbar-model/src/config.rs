use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_BUDGET, DEFAULT_GRACE_SECS, DEFAULT_PLACEHOLDER, DEFAULT_SPLIT_MARKER,
    DEFAULT_STOPPED_TEXT, DEFAULT_TICK_MS,
    error::{ModelError, ModelResult},
};

/// How task outputs are joined into the single display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarLayout {
    /// Delimiter placed before each non-empty output.
    pub left: String,
    /// Delimiter placed after each non-empty output.
    pub right: String,
    /// Index of the task after which the split marker is inserted (`None` = no split).
    pub split_after: Option<usize>,
    /// Marker inserted at the split point.
    pub split_marker: String,
    /// Maximum output length in characters before truncation.
    pub budget: usize,
    /// Text shown when the joined output is empty.
    pub placeholder: String,
    /// Text shown once the engine has stopped.
    pub stopped_text: String,
}

impl Default for BarLayout {
    fn default() -> Self {
        Self {
            left: "[".to_string(),
            right: "]".to_string(),
            split_after: None,
            split_marker: DEFAULT_SPLIT_MARKER.to_string(),
            budget: DEFAULT_BUDGET,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            stopped_text: DEFAULT_STOPPED_TEXT.to_string(),
        }
    }
}

impl BarLayout {
    /// Replace the left/right delimiters.
    pub fn with_markers(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left = left.into();
        self.right = right.into();
        self
    }

    /// Insert the split marker after the task at `index`.
    pub fn with_split_after(mut self, index: usize) -> Self {
        self.split_after = Some(index);
        self
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output layout.
    pub layout: BarLayout,
    /// Aggregator tick in milliseconds.
    pub tick_ms: u64,
    /// Shutdown grace period in seconds.
    pub grace_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: BarLayout::default(),
            tick_ms: DEFAULT_TICK_MS,
            grace_secs: DEFAULT_GRACE_SECS,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    ///
    /// Rules:
    /// - `tick_ms` is positive;
    /// - `layout.budget` is positive.
    pub fn validate(&self) -> ModelResult<()> {
        if self.tick_ms == 0 {
            return Err(ModelError::Invalid("tick_ms must be positive".into()));
        }
        if self.layout.budget == 0 {
            return Err(ModelError::Invalid("layout.budget must be positive".into()));
        }
        Ok(())
    }

    /// Aggregator tick as a [`Duration`].
    #[inline]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Shutdown grace period as a [`Duration`].
    #[inline]
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}
