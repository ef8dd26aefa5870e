//! Configuration for apidoc: run settings, sandbox allow-list, analyzer
//! command and per-project overrides, stored as TOML in
//! `~/.apidoc/config.toml`.

pub mod defaults;
pub mod manager;
pub mod security;
pub mod types;

pub use manager::{ConfigError, ConfigManager};
pub use security::{validate_config, SecurityError};
pub use types::{
    AnalyzerCommand, ApidocConfig, OverrideTable, ProjectOverride, SandboxSettings, Settings,
};
