//! XDG Base Directory utilities for webpad data and configuration.

use crate::error::ApiError;
use std::path::PathBuf;

/// Get XDG data home directory
///
/// Returns `$XDG_DATA_HOME` if set, otherwise defaults to `$HOME/.local/share`
/// Follows XDG Base Directory Specification
pub fn data_home() -> Option<PathBuf> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        if !xdg_data_home.is_empty() {
            return Some(PathBuf::from(xdg_data_home));
        }
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, ApiError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        ApiError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// Default directory holding the project database
///
/// Returns `$XDG_DATA_HOME/webpad/`, falling back to the platform data dir
/// reported by `directories` when neither XDG nor HOME is available.
pub fn data_dir() -> Result<PathBuf, ApiError> {
    if let Some(data_home) = data_home() {
        return Ok(data_home.join("webpad"));
    }
    directories::ProjectDirs::from("", "webpad", "webpad")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            ApiError::ConfigError("Could not determine platform data directory".to_string())
        })
}

/// Path of the global config file (`$XDG_CONFIG_HOME/webpad/config.toml`)
pub fn config_file_path() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join("webpad").join("config.toml"))
}
