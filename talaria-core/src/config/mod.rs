use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_LIVE_MODEL: &str = "gemini-live-2.5-flash-preview";
const DEFAULT_CONFIG_PATH: &str = "config/live.toml";
const DEFAULT_GREETING: &str =
    "Say 'Hello! Ask me what one plus one is!' and wait for user input.";
const DEFAULT_SYSTEM_INSTRUCTION: &str = "You have access to a onePlusOne function. When the user asks what 1 + 1 is, use the onePlusOne tool to get the answer.";

/// Session configuration: which model to talk to, what to say first, and
/// when the model should reach for the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveConfig {
    pub model: String,
    pub greeting: String,
    pub system_instruction: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    greeting: Option<String>,
    system_instruction: Option<String>,
}

impl LiveConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LIVE_MODEL.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

fn read_config(path: &Path) -> Result<LiveConfig, ConfigError> {
    debug!(path = %path.display(), "Reading live session configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LiveConfig {
        model: parsed.model.unwrap_or_else(|| DEFAULT_LIVE_MODEL.to_string()),
        greeting: parsed
            .greeting
            .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        system_instruction: parsed
            .system_instruction
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
    })
}
