//! Configuration for conversation history.

use std::path::Path;

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::history::HistoryLimit;

/// Prefix of environment variables read by [`HistoryConfig::load`].
pub const ENV_PREFIX: &str = "CHAT_HISTORY";

/// Settings consumed by [`crate::history::ConversationStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of messages retained per session. Zero or negative
    /// disables trimming.
    #[serde(default)]
    pub max_history_length: i64,
}

impl HistoryConfig {
    pub fn new(max_history_length: i64) -> Self {
        Self { max_history_length }
    }

    /// Load settings from defaults, an optional TOML file and the environment,
    /// in increasing order of precedence.
    ///
    /// A missing file is not an error. Environment variables use the
    /// `CHAT_HISTORY_` prefix, e.g. `CHAT_HISTORY_MAX_HISTORY_LENGTH=20`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parse an in-memory TOML document. The environment is not consulted.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Retention limit derived from `max_history_length`.
    pub fn limit(&self) -> HistoryLimit {
        HistoryLimit::from_max_length(self.max_history_length)
    }

    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();
        Ok(Config::builder().set_default("max_history_length", defaults.max_history_length)?)
    }
}
