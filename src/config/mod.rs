//! Configuration
//!
//! Layered application configuration: built-in defaults, the global config file,
//! an optional explicit file, then `WEBPAD__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod storage_paths;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use storage_paths::StorageConfig;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Preview compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Name of the entry document looked up directly under the project root
    #[serde(default = "default_entry_name")]
    pub entry_name: String,

    /// Maximum console entries retained by the host
    #[serde(default = "default_console_capacity")]
    pub console_capacity: usize,

    /// Quiet period after the last edit before the preview is recompiled
    #[serde(default = "default_recompile_debounce_ms")]
    pub recompile_debounce_ms: u64,
}

fn default_entry_name() -> String {
    "index.html".to_string()
}

fn default_console_capacity() -> usize {
    500
}

fn default_recompile_debounce_ms() -> u64 {
    300
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            entry_name: default_entry_name(),
            console_capacity: default_console_capacity(),
            recompile_debounce_ms: default_recompile_debounce_ms(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebpadConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
