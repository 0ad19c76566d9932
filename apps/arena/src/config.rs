use crate::error::{ArenaError, ArenaErrorExt};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG: &str = "arena";

/// Settings for a single arena run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub logging: LoggingConfig,
    pub border: BorderConfig,
    pub movement: MovementConfig,
    /// Player names, in join order. The first player is kept inside the border.
    pub players: Vec<String>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            border: BorderConfig::default(),
            movement: MovementConfig::default(),
            players: vec!["Player1".to_owned(), "Player2".to_owned()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive, overridable through `RUST_LOG`.
    pub level: String,
    /// Directory for rolling log files; console only when unset.
    pub directory: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directory: None, json: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    /// Largest allowed `|x|` and `|z|`.
    pub size: i32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self { size: 500 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub step: i32,
    pub limit: i32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { step: 200, limit: 1000 }
    }
}

impl LoggingConfig {
    /// Parses [`LoggingConfig::level`].
    ///
    /// # Errors
    /// Returns [`ArenaError::InvalidConfiguration`] for an unknown level name.
    pub fn level_filter(&self) -> Result<LevelFilter, ArenaError> {
        self.level.parse().map_err(|e| ArenaError::InvalidConfiguration {
            message: format!("Invalid log level '{}': {e}", self.level).into(),
            context: None,
        })
    }
}

impl ArenaConfig {
    /// Rejects settings the arena cannot run with.
    ///
    /// # Errors
    /// Returns [`ArenaError::InvalidConfiguration`] naming the offending setting.
    pub fn validate(&self) -> Result<(), ArenaError> {
        self.logging.level_filter()?;

        if self.players.is_empty() {
            return Err(invalid("players cannot be empty"));
        }
        if self.players.iter().any(|name| name.trim().is_empty()) {
            return Err(invalid("player names cannot be blank"));
        }
        if self.movement.step <= 0 {
            return Err(invalid("movement.step must be greater than zero"));
        }
        if self.movement.limit < 0 {
            return Err(invalid("movement.limit cannot be negative"));
        }
        if self.border.size < 0 {
            return Err(invalid("border.size cannot be negative"));
        }

        Ok(())
    }
}

/// Loads [`ArenaConfig`] from an optional file layered under environment overrides.
///
/// 1. **Base File**: `path`, or `arena` (any supported extension, e.g. `arena.toml`)
///    in the working directory. A missing file leaves every setting at its default.
/// 2. **Environment Overrides**: variables prefixed with `HERALD__`, nested with
///    double underscores (e.g. `HERALD__BORDER__SIZE=300` maps to `border.size`).
///
/// # Errors
/// Returns [`ArenaError::Config`] if a source is malformed or does not match
/// [`ArenaConfig`], and [`ArenaError::InvalidConfiguration`] if the result fails
/// [`ArenaConfig::validate`].
pub fn load_config(path: Option<&Path>) -> Result<ArenaConfig, ArenaError> {
    let effective_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), Path::to_path_buf);

    let config = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(path.is_some()))
        .add_source(Environment::with_prefix("HERALD").separator("__"))
        .build()
        .context("Failed to build config")?
        .try_deserialize::<ArenaConfig>()
        .context("Failed to deserialize config")?;

    config.validate()?;
    Ok(config)
}

fn invalid(message: &'static str) -> ArenaError {
    ArenaError::InvalidConfiguration { message: message.into(), context: None }
}
