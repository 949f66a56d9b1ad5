mod config;
mod error;
mod log;
mod object;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerTimeZone, Rfc3339Timer};

use time::UtcOffset;
use tracing::warn;

/// Install the global tracing subscriber described by `cfg`.
///
/// With [`LoggerTimeZone::Local`], call this before starting any other thread (i.e. before the
/// tokio runtime): the local offset cannot be detected reliably afterwards and UTC is used instead.
///
/// # Examples
/// ```rust
/// use sbar_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    let resolved = cfg.tz.resolve();
    let offset = resolved.unwrap_or(UtcOffset::UTC);

    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg, offset)?,
        LoggerFormat::Json => log::logger_json(cfg, offset)?,
        LoggerFormat::Journald => log::logger_journald(cfg)?,
    }

    if resolved.is_none() {
        warn!(tz = %cfg.tz, "local offset detection failed, timestamps are in UTC");
    }
    Ok(())
}
