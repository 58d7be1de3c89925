//! Config composition: default values and the merge service.

pub mod service;

pub(crate) mod merge_policy {
    use config::builder::DefaultState;
    use config::{ConfigBuilder, ConfigError};

    /// Builder seeded with the defaults every source overlays.
    pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("preview.entry_name", "index.html")?
            .set_default("preview.console_capacity", 500)?
            .set_default("preview.recompile_debounce_ms", 300)
    }

}
