//! Game configuration loaded from TOML.

use crate::controller::ControllerSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Everything the `play` command needs besides the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Engine executable followed by its arguments.
    #[serde(default = "default_engine_command")]
    engine_command: Vec<String>,

    /// Give up on an engine reply after this many milliseconds.
    #[serde(default)]
    engine_timeout_ms: Option<u64>,

    /// Extra engine requests before the engine's turn is forfeited.
    #[serde(default)]
    engine_retries: u32,

    /// How long to wait for the engine to exit after `quit`.
    #[serde(default = "default_shutdown_grace_ms")]
    shutdown_grace_ms: u64,

    /// Pause after the human's move before the engine is asked.
    #[serde(default = "default_move_delay_ms")]
    move_delay_ms: u64,

    /// How long the result stays on screen.
    #[serde(default = "default_game_over_pause_ms")]
    game_over_pause_ms: u64,

    /// Starting position; the standard one when absent.
    #[serde(default)]
    start_fen: Option<String>,

    /// Where the session log goes.
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

fn default_engine_command() -> Vec<String> {
    vec!["reference_engine".to_string()]
}

fn default_shutdown_grace_ms() -> u64 {
    1000
}

fn default_move_delay_ms() -> u64 {
    400
}

fn default_game_over_pause_ms() -> u64 {
    6000
}

fn default_log_file() -> PathBuf {
    PathBuf::from("chazz.log")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            engine_command: default_engine_command(),
            engine_timeout_ms: None,
            engine_retries: 0,
            shutdown_grace_ms: default_shutdown_grace_ms(),
            move_delay_ms: default_move_delay_ms(),
            game_over_pause_ms: default_game_over_pause_ms(),
            start_fen: None,
            log_file: default_log_file(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(engine = ?config.engine_command, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_command.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::new("engine_command must name a program".to_string()));
        }
        if self.engine_timeout_ms == Some(0) {
            return Err(ConfigError::new("engine_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Replaces the engine command.
    pub fn set_engine_command(&mut self, command: Vec<String>) -> Result<(), ConfigError> {
        self.engine_command = command;
        self.validate()
    }

    /// Replaces the reply timeout.
    pub fn set_engine_timeout_ms(&mut self, timeout_ms: Option<u64>) -> Result<(), ConfigError> {
        self.engine_timeout_ms = timeout_ms;
        self.validate()
    }

    /// Replaces the starting position.
    pub fn set_start_fen(&mut self, fen: Option<String>) {
        self.start_fen = fen;
    }

    /// Reply timeout as a duration.
    pub fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_ms.map(Duration::from_millis)
    }

    /// Grace period for engine shutdown.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Timing and retry settings for the controller.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            move_delay: Duration::from_millis(self.move_delay_ms),
            game_over_pause: Duration::from_millis(self.game_over_pause_ms),
            engine_retries: self.engine_retries,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: GameConfig = toml::from_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.engine_retries(), &0);
        assert_eq!(config.engine_timeout(), None);
    }

    #[test]
    fn test_controller_settings_follow_config() {
        let config: GameConfig = toml::from_str(
            r#"
move_delay_ms = 10
game_over_pause_ms = 20
engine_retries = 2
"#,
        )
        .unwrap();
        let settings = config.controller_settings();
        assert_eq!(settings.move_delay, Duration::from_millis(10));
        assert_eq!(settings.game_over_pause, Duration::from_millis(20));
        assert_eq!(settings.engine_retries, 2);
    }

    #[test]
    fn test_empty_engine_command_rejected() {
        let mut config = GameConfig::default();
        assert!(config.set_engine_command(vec![]).is_err());
        assert!(config.set_engine_command(vec!["  ".to_string()]).is_err());
        assert!(config.set_engine_command(vec!["stockfish".to_string()]).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = GameConfig::default();
        assert!(config.set_engine_timeout_ms(Some(0)).is_err());
        assert!(config.set_engine_timeout_ms(Some(250)).is_ok());
        assert_eq!(config.engine_timeout(), Some(Duration::from_millis(250)));
    }
}
