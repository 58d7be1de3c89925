//! Global editor settings
//!
//! A single record shared by every project, replaced wholesale on change and
//! persisted on its own.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Editor color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Autosave interval in seconds; 0 disables autosave
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval: u64,

    #[serde(default = "default_true")]
    pub line_wrap: bool,

    #[serde(default = "default_theme")]
    pub theme: Theme,

    #[serde(default = "default_tab_width")]
    pub tab_width: u32,

    /// Whether the preview may load resources from outside the project
    #[serde(default)]
    pub allow_external_resources: bool,
}

fn default_font_size() -> u32 {
    14
}

fn default_autosave_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_theme() -> Theme {
    Theme::Dark
}

fn default_tab_width() -> u32 {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            autosave_interval: default_autosave_interval(),
            line_wrap: default_true(),
            theme: default_theme(),
            tab_width: default_tab_width(),
            allow_external_resources: false,
        }
    }
}

impl Settings {
    /// Autosave delay, or `None` when autosave is disabled
    pub fn autosave_delay(&self) -> Option<Duration> {
        (self.autosave_interval > 0).then(|| Duration::from_secs(self.autosave_interval))
    }

    /// Return a copy with one field replaced, parsing `value` for that field.
    ///
    /// Keys accept both the camelCase wire names and snake_case.
    pub fn with_field(&self, key: &str, value: &str) -> Result<Settings, ApiError> {
        let mut next = self.clone();
        let invalid =
            |e: &dyn std::fmt::Display| ApiError::ConfigError(format!("Invalid value for {}: {}", key, e));
        match key {
            "fontSize" | "font_size" => next.font_size = value.parse().map_err(|e| invalid(&e))?,
            "autosaveInterval" | "autosave_interval" => {
                next.autosave_interval = value.parse().map_err(|e| invalid(&e))?
            }
            "lineWrap" | "line_wrap" => next.line_wrap = value.parse().map_err(|e| invalid(&e))?,
            "theme" => {
                next.theme = match value {
                    "light" => Theme::Light,
                    "dark" => Theme::Dark,
                    other => return Err(invalid(&format!("unknown theme '{}'", other))),
                }
            }
            "tabWidth" | "tab_width" => next.tab_width = value.parse().map_err(|e| invalid(&e))?,
            "allowExternalResources" | "allow_external_resources" => {
                next.allow_external_resources = value.parse().map_err(|e| invalid(&e))?
            }
            _ => return Err(ApiError::ConfigError(format!("Unknown setting: {}", key))),
        }
        next.validate()?;
        Ok(next)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if !(6..=72).contains(&self.font_size) {
            return Err(ApiError::ConfigError(format!(
                "Font size must be between 6 and 72, got {}",
                self.font_size
            )));
        }
        if !(1..=16).contains(&self.tab_width) {
            return Err(ApiError::ConfigError(format!(
                "Tab width must be between 1 and 16, got {}",
                self.tab_width
            )));
        }
        Ok(())
    }
}
