//! Integration tests for the webpad editor core

mod autosave_timing;
mod cli_contract;
mod preview_scenarios;
mod project_lifecycle;
mod tree_properties;
