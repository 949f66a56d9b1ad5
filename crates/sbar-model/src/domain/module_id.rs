use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Stable machine identifier of a registered task.
///
/// Used by the control plane to address a single task. Unique within one engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create an id from an explicit value.
    ///
    /// Surrounding whitespace is trimmed; an empty value or one containing `/` is rejected.
    pub fn new(id: impl Into<String>) -> ModelResult<Self> {
        let raw = id.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(ModelError::InvalidModuleId(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive an id from a human-readable display name.
    ///
    /// ASCII alphanumerics are lower-cased and kept, every other run of characters becomes a single `-`.
    ///
    /// ```
    /// use sbar_model::ModuleId;
    ///
    /// assert_eq!(ModuleId::from_display_name("CPU Temp").as_str(), "cpu-temp");
    /// assert_eq!(ModuleId::from_display_name("  ").as_str(), "module");
    /// ```
    pub fn from_display_name(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut pending_dash = false;

        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        if out.is_empty() {
            out.push_str("module");
        }
        Self(out)
    }

    /// Returns the id as `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModuleId {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
