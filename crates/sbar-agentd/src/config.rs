use std::{fs, net::SocketAddr, path::Path};

use anyhow::Context;
use serde::Deserialize;

use sbar_model::{DisplayConfig, EngineConfig, IntervalSecs, ModelResult};
use sbar_observe::LoggerConfig;

use crate::sink::SinkKind;

/// Environment variable holding the path of the JSON config file.
pub const CONFIG_ENV: &str = "SBAR_CONFIG";

/// Daemon configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    pub engine: EngineConfig,
    pub api: ApiConfig,
    pub display: DisplaySection,
    pub modules: ModulesSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub enabled: bool,
    pub listen: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: SocketAddr::from(([127, 0, 0, 1], 8510)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub sink: SinkKind,
    /// `[normal, warning, error]` as `#RRGGBB`; unset means no styling.
    pub colors: Option<[String; 3]>,
}

impl DisplaySection {
    pub fn display_config(&self) -> ModelResult<DisplayConfig> {
        match &self.colors {
            Some(colors) => DisplayConfig::new(colors.clone()),
            None => Ok(DisplayConfig::plain()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModulesSection {
    pub clock_secs: IntervalSecs,
    pub load_secs: IntervalSecs,
}

impl Default for ModulesSection {
    fn default() -> Self {
        Self {
            clock_secs: 1,
            load_secs: 5,
        }
    }
}

impl AgentConfig {
    /// Load from the file named by [`CONFIG_ENV`], or defaults when it is unset.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.engine.validate()?;
        cfg.display.display_config()?;
        Ok(cfg)
    }
}
