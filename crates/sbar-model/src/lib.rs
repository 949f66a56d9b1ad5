mod domain;
pub use domain::{
    DEFAULT_BUDGET, DEFAULT_GRACE_SECS, DEFAULT_PLACEHOLDER, DEFAULT_SPLIT_MARKER,
    DEFAULT_STOPPED_TEXT, DEFAULT_TICK_MS, STYLE_TERMINATOR,
};
pub use domain::{IntervalSecs, ModuleId};

mod error;
pub use error::{ModelError, ModelResult};

mod display;
pub use display::{DisplayConfig, Tone};

mod config;
pub use config::{BarLayout, EngineConfig};

mod info;
pub use info::TaskInfo;
