use crate::{
    STYLE_TERMINATOR,
    error::{ModelError, ModelResult},
};

/// Severity used to pick a color out of a [`DisplayConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Warning,
    Error,
}

/// Per-monitor trio of colors used to style its output.
///
/// Built once when a monitor is constructed and owned by it; there is no process-wide color state.
/// Colors are `#RRGGBB` hex codes and are emitted as `^c#RRGGBB^ ... ^d^` sequences.
/// A [`DisplayConfig::plain`] config styles nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayConfig {
    colors: Option<[String; 3]>,
}

impl DisplayConfig {
    /// Create a styled config from `[normal, warning, error]` colors.
    pub fn new<S: AsRef<str>>(colors: [S; 3]) -> ModelResult<Self> {
        let [normal, warning, error] = colors;
        Ok(Self {
            colors: Some([
                parse_color(normal.as_ref())?,
                parse_color(warning.as_ref())?,
                parse_color(error.as_ref())?,
            ]),
        })
    }

    /// Config without any styling.
    pub fn plain() -> Self {
        Self { colors: None }
    }

    /// Returns `true` if this config emits style sequences.
    pub fn is_styled(&self) -> bool {
        self.colors.is_some()
    }

    /// Color for the given tone, if styled.
    pub fn color(&self, tone: Tone) -> Option<&str> {
        let colors = self.colors.as_ref()?;
        let idx = match tone {
            Tone::Normal => 0,
            Tone::Warning => 1,
            Tone::Error => 2,
        };
        Some(colors[idx].as_str())
    }

    /// Wrap `text` into the style sequence for `tone`.
    ///
    /// ```
    /// use sbar_model::{DisplayConfig, Tone};
    ///
    /// let cfg = DisplayConfig::new(["#FFFFFF", "#BB4F2E", "#A1273E"]).unwrap();
    /// assert_eq!(cfg.paint(Tone::Error, "down"), "^c#A1273E^down^d^");
    /// assert_eq!(DisplayConfig::plain().paint(Tone::Error, "down"), "down");
    /// ```
    pub fn paint(&self, tone: Tone, text: &str) -> String {
        match self.color(tone) {
            Some(color) => format!("^c{color}^{text}{STYLE_TERMINATOR}"),
            None => text.to_string(),
        }
    }
}

fn parse_color(s: &str) -> ModelResult<String> {
    let valid = s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(ModelError::InvalidColor(s.to_string()));
    }
    Ok(s.to_string())
}
