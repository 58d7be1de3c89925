//! Tooling & Integration Layer
//!
//! Command-line access to projects stored by the editor.

pub mod cli;

pub use cli::{load_config, Cli, CliContext, Commands, SettingsCommands};
