pub mod format;
pub use format::LoggerFormat;

pub mod level;
pub use level::LoggerLevel;

pub mod rfc3339;
pub use rfc3339::Rfc3339Timer;

pub mod timezone;
pub use timezone::LoggerTimeZone;
