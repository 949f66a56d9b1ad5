use std::path::PathBuf;

use async_trait::async_trait;

use sbar_core::prelude::{Flow, Monitor, MonitorError};
use sbar_model::{DisplayConfig, Tone};

const LOADAVG: &str = "/proc/loadavg";

/// 1, 5 and 15 minute load averages from `/proc/loadavg`.
///
/// Any average at or above 1 paints the warning tone, at or above 2 the error tone.
pub struct LoadAvg {
    display: DisplayConfig,
    path: PathBuf,
    loads: Option<[f64; 3]>,
    error: String,
}

impl LoadAvg {
    pub fn new(display: DisplayConfig) -> Self {
        Self::with_path(display, LOADAVG)
    }

    fn with_path(display: DisplayConfig, path: impl Into<PathBuf>) -> Self {
        Self {
            display,
            path: path.into(),
            loads: None,
            error: String::new(),
        }
    }

    fn fail(&mut self, reason: String) -> MonitorError {
        self.error = reason.clone();
        MonitorError::transient(reason)
    }
}

#[async_trait]
impl Monitor for LoadAvg {
    async fn update(&mut self) -> Result<Flow, MonitorError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(format!("{}: {e}", self.path.display()))),
        };
        match parse_loadavg(&raw) {
            Some(loads) => {
                self.loads = Some(loads);
                Ok(Flow::Continue)
            }
            None => Err(self.fail(format!("{}: malformed", self.path.display()))),
        }
    }

    fn render(&self) -> String {
        let Some(loads) = self.loads else {
            return String::new();
        };
        let [one, five, fifteen] = loads;
        let text = format!("{one:.2} {five:.2} {fifteen:.2}");
        self.display.paint(tone(loads), &text)
    }

    fn render_error(&self) -> String {
        self.display.paint(Tone::Error, &self.error)
    }

    fn display_name(&self) -> &str {
        "Load"
    }
}

fn parse_loadavg(raw: &str) -> Option<[f64; 3]> {
    let mut fields = raw.split_whitespace().map(|f| f.parse::<f64>().ok());
    Some([fields.next()??, fields.next()??, fields.next()??])
}

fn tone(loads: [f64; 3]) -> Tone {
    if loads.iter().any(|&l| l >= 2.0) {
        Tone::Error
    } else if loads.iter().any(|&l| l >= 1.0) {
        Tone::Warning
    } else {
        Tone::Normal
    }
}
