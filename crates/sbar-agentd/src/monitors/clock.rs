use async_trait::async_trait;
use time::{OffsetDateTime, UtcOffset};

use sbar_core::prelude::{Flow, Monitor, MonitorError};
use sbar_model::{DisplayConfig, Tone};

/// Date and time, e.g. `Oct 18 14:05`. The separator blinks on odd seconds.
pub struct Clock {
    display: DisplayConfig,
    offset: UtcOffset,
    now: Option<OffsetDateTime>,
}

impl Clock {
    pub fn new(display: DisplayConfig, offset: UtcOffset) -> Self {
        Self {
            display,
            offset,
            now: None,
        }
    }
}

#[async_trait]
impl Monitor for Clock {
    async fn update(&mut self) -> Result<Flow, MonitorError> {
        self.now = Some(OffsetDateTime::now_utc().to_offset(self.offset));
        Ok(Flow::Continue)
    }

    fn render(&self) -> String {
        match self.now {
            Some(now) => self.display.paint(Tone::Normal, &format_clock(now)),
            None => String::new(),
        }
    }

    fn render_error(&self) -> String {
        self.display.paint(Tone::Error, "clock unavailable")
    }

    fn display_name(&self) -> &str {
        "Clock"
    }
}

fn format_clock(at: OffsetDateTime) -> String {
    let sep = if at.second() % 2 == 1 { ' ' } else { ':' };
    let month = at.month().to_string();
    format!(
        "{} {:02} {:02}{sep}{:02}",
        &month[..3],
        at.day(),
        at.hour(),
        at.minute()
    )
}
