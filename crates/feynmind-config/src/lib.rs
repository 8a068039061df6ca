//! Configuration for the FeynMind terminal client.
//!
//! A JSON file at `~/.feynmind/config.json` (created with defaults on
//! first run) holds the backend base URL, the dictation command, and
//! the log level. `${VAR}` references in the file are expanded from
//! the environment at load time; `${VAR:-default}` supplies a
//! fallback.

pub mod config;

pub use config::{
    ApiConfig, Config, ConfigError, ConfigResult, LogLevel, LoggingConfig, SpeechConfig,
};

use std::path::PathBuf;

/// The FeynMind dotdir, `~/.feynmind`.
pub fn feynmind_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".feynmind"))
}

/// Default config file path, `~/.feynmind/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    feynmind_dir().map(|dir| dir.join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_config_json() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(".feynmind/config.json"));
        }
    }
}
