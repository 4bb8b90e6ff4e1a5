use crate::types::PortioConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Config directory not found")]
    HomeNotFound,

    /// A setting is out of range or unparsable
    #[error("Invalid setting {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Manager for portio configuration
///
/// Manages the configuration stored in `<config dir>/portio/config.toml`.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: PortioConfig,
}

impl ConfigManager {
    /// Get the default config path (`<config dir>/portio/config.toml`)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(base.join("portio").join("config.toml"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from default location, or fall back to the defaults if
    /// no file exists yet
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        match Self::load_from(&config_path) {
            Err(ConfigError::ConfigNotFound(_)) => {
                debug!(path = %config_path.display(), "no config file, using defaults");
                Ok(Self {
                    config_path,
                    config: PortioConfig::default(),
                })
            }
            other => other,
        }
    }

    /// Load config from specific path (useful for testing)
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let config: PortioConfig = toml::from_str(&contents)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Initialize a new config file
    pub fn init() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::init_at(&config_path)
    }

    /// Initialize config at specific path
    pub fn init_at(path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = Self {
            config_path: path.to_path_buf(),
            config: PortioConfig::default(),
        };
        manager.save()?;
        info!(path = %path.display(), "initialized config");

        Ok(manager)
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub fn save(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        let toml_str = toml::to_string_pretty(&self.config)?;

        // Write to temporary file first
        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, toml_str)?;
        set_config_permissions(&temp_path)?;

        // Atomic rename
        fs::rename(&temp_path, &self.config_path)?;
        debug!(path = %self.config_path.display(), "saved config");

        Ok(())
    }

    /// Path this manager loads from and saves to
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get reference to config
    pub fn config(&self) -> &PortioConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut PortioConfig {
        &mut self.config
    }
}

/// Restrict the config file to its owner
#[cfg(unix)]
fn set_config_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_config_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
