use crate::security::{set_config_permissions, validate_config, SecurityError};
use crate::types::{ApidocConfig, OverrideTable};
use apidoc_fs::{FileSystem, NativeFileSystem};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] apidoc_core::Error),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Config file already exists at {0}")]
    ConfigExists(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Manager for apidoc configuration
///
/// Manages the configuration stored in ~/.apidoc/config.toml. Every loaded
/// configuration has passed [`validate_config`].
pub struct ConfigManager<F: FileSystem = NativeFileSystem> {
    fs: Arc<F>,
    config_path: PathBuf,
    config: ApidocConfig,
}

impl ConfigManager {
    /// Get the default config path (~/.apidoc/config.toml)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".apidoc").join("config.toml"))
    }

    /// Load config from default location
    pub async fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path).await
    }

    /// Load config from `path`, or use built-in defaults if the file is absent.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        match Self::load_from(&config_path).await {
            Err(ConfigError::ConfigNotFound(_)) if path.is_none() => {
                debug!(path = %config_path.display(), "No config file, using defaults");
                let config_dir = parent_dir(&config_path);
                Ok(Self {
                    fs: Arc::new(NativeFileSystem::new(config_dir)?),
                    config_path,
                    config: ApidocConfig::default(),
                })
            }
            other => other,
        }
    }

    /// Load config from specific path (useful for testing)
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let fs = Arc::new(NativeFileSystem::new(parent_dir(path))?);
        ConfigManager::load_with_filesystem(fs, path).await
    }

    /// Initialize a new config file
    pub async fn init() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::init_at(&config_path).await
    }

    /// Initialize config at specific path
    ///
    /// Refuses to overwrite an existing file.
    pub async fn init_at(path: &Path) -> Result<Self, ConfigError> {
        let config_dir = parent_dir(path);
        if !config_dir.exists() {
            tokio::fs::create_dir_all(config_dir).await?;
        }
        let fs = Arc::new(NativeFileSystem::new(config_dir)?);

        if fs.exists(path).await? {
            return Err(ConfigError::ConfigExists(path.to_path_buf()));
        }

        let manager = Self {
            fs,
            config_path: path.to_path_buf(),
            config: ApidocConfig::default(),
        };
        manager.save().await?;
        Ok(manager)
    }
}

impl<F: FileSystem> ConfigManager<F> {
    /// Load config with a custom FileSystem
    pub async fn load_with_filesystem(fs: Arc<F>, path: &Path) -> Result<Self, ConfigError> {
        if !fs.exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs.read_to_string(path).await?;
        let config: ApidocConfig = toml::from_str(&contents)?;
        validate_config(&config)?;
        debug!(path = %path.display(), "Loaded config");

        Ok(Self {
            fs,
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub async fn save(&self) -> Result<(), ConfigError> {
        validate_config(&self.config)?;
        let toml_str = toml::to_string_pretty(&self.config)?;

        let temp_path = self.config_path.with_extension("toml.tmp");
        self.fs.write(&temp_path, &toml_str).await?;
        set_config_permissions(&temp_path)?;
        self.fs.rename(&temp_path, &self.config_path).await?;

        Ok(())
    }

    /// Get reference to config
    pub fn config(&self) -> &ApidocConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut ApidocConfig {
        &mut self.config
    }

    /// Consume the manager, keeping only the configuration.
    pub fn into_config(self) -> ApidocConfig {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Index the configured overrides by normalized project identity.
    pub fn override_table(&self) -> Result<OverrideTable, ConfigError> {
        Ok(OverrideTable::new(&self.config.overrides)?)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
