use portio_path::FileSystemType;
use portio_stream::{clamp_buffer_size, Endian, ResizeOptions, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use serde::{Deserialize, Serialize};

use crate::manager::ConfigError;

/// Main configuration structure for portio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortioConfig {
    /// Schema version for migrations
    pub version: String,

    /// Stream defaults
    #[serde(default)]
    pub streams: StreamSettings,

    /// Path and file system defaults
    #[serde(default)]
    pub paths: PathSettings,
}

impl Default for PortioConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            streams: StreamSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

impl PortioConfig {
    /// Check every setting, reporting the first one out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.streams.validate()?;
        self.paths.validate()
    }
}

/// Defaults applied when streams are created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamSettings {
    /// Read buffer size for buffered streams, 0 to disable
    #[serde(default = "default_buffer_size")]
    pub read_buffer_size: usize,

    /// Write buffer size for buffered streams, 0 to disable
    #[serde(default = "default_buffer_size")]
    pub write_buffer_size: usize,

    /// Cache the size of wrapped streams
    #[serde(default)]
    pub cache_size: bool,

    /// Byte order for typed values: big, little or local
    #[serde(default = "default_endian")]
    pub default_endian: String,

    /// Buffer used when copying between streams
    #[serde(default = "default_copy_buffer_size")]
    pub copy_buffer_size: usize,

    /// Growth factor of memory streams
    #[serde(default = "default_resize_factor")]
    pub memory_resize_factor: f32,

    /// Bytes added on each memory stream growth
    #[serde(default)]
    pub memory_resize_increment: usize,

    /// Largest memory stream capacity, 0 for unlimited
    #[serde(default)]
    pub memory_resize_maximum: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            read_buffer_size: default_buffer_size(),
            write_buffer_size: default_buffer_size(),
            cache_size: false,
            default_endian: default_endian(),
            copy_buffer_size: default_copy_buffer_size(),
            memory_resize_factor: default_resize_factor(),
            memory_resize_increment: 0,
            memory_resize_maximum: 0,
        }
    }
}

impl StreamSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_buffer_size("streams.read_buffer_size", self.read_buffer_size)?;
        check_buffer_size("streams.write_buffer_size", self.write_buffer_size)?;
        if self.copy_buffer_size == 0 {
            return Err(invalid("streams.copy_buffer_size", "must be at least 1"));
        }
        if self.memory_resize_factor.is_nan() || self.memory_resize_factor < 1.0 {
            return Err(invalid(
                "streams.memory_resize_factor",
                format!("{} is below 1.0", self.memory_resize_factor),
            ));
        }
        self.endian().map(|_| ())
    }

    /// The configured byte order
    pub fn endian(&self) -> Result<Endian, ConfigError> {
        self.default_endian
            .parse()
            .map_err(|e: portio_stream::ParseEndianError| {
                invalid("streams.default_endian", e.to_string())
            })
    }

    /// Growth behavior for new memory streams
    pub fn resize_options(&self) -> ResizeOptions {
        ResizeOptions {
            enabled: true,
            factor: self.memory_resize_factor,
            increment: self.memory_resize_increment,
            maximum: self.memory_resize_maximum,
        }
    }

    /// Buffer sizes as a buffered stream will apply them
    pub fn effective_buffer_sizes(&self) -> (usize, usize) {
        (
            clamp_buffer_size(self.read_buffer_size),
            clamp_buffer_size(self.write_buffer_size),
        )
    }
}

/// Path handling and location defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSettings {
    /// Naming rules to validate against, or "native"
    #[serde(default = "default_file_system")]
    pub file_system: String,

    /// Directory for temporary files, overriding the platform default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_directory: Option<String>,

    /// Directory relative paths resolve against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_directory: Option<String>,

    /// Prefix of generated temporary file names
    #[serde(default = "default_temp_prefix")]
    pub temp_file_prefix: String,

    /// Extension of generated temporary file names, including the dot
    #[serde(default = "default_temp_extension")]
    pub temp_file_extension: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            file_system: default_file_system(),
            temp_directory: None,
            current_directory: None,
            temp_file_prefix: default_temp_prefix(),
            temp_file_extension: default_temp_extension(),
        }
    }
}

impl PathSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fs = self.file_system_type()?;
        if !portio_path::is_file_name_string_valid(&self.temp_file_prefix, fs) {
            return Err(invalid(
                "paths.temp_file_prefix",
                format!("{:?} is not a valid file name on {fs}", self.temp_file_prefix),
            ));
        }
        for (field, dir) in [
            ("paths.temp_directory", &self.temp_directory),
            ("paths.current_directory", &self.current_directory),
        ] {
            if let Some(dir) = dir {
                if portio_path::is_relative(dir) {
                    return Err(invalid(field, format!("{dir:?} is not absolute")));
                }
            }
        }
        Ok(())
    }

    /// The configured file system type
    pub fn file_system_type(&self) -> Result<FileSystemType, ConfigError> {
        self.file_system
            .parse()
            .map_err(|e: portio_path::PathError| invalid("paths.file_system", e.to_string()))
    }
}

fn check_buffer_size(field: &'static str, size: usize) -> Result<(), ConfigError> {
    if size == 0 || (MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("{size} is outside {MIN_BUFFER_SIZE}..={MAX_BUFFER_SIZE}"),
        ))
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

fn default_buffer_size() -> usize {
    portio_stream::DEFAULT_BUFFER_SIZE
}

fn default_endian() -> String {
    "big".to_string()
}

fn default_copy_buffer_size() -> usize {
    portio_stream::DEFAULT_COPY_BUFFER_SIZE
}

fn default_resize_factor() -> f32 {
    1.5
}

fn default_file_system() -> String {
    "native".to_string()
}

fn default_temp_prefix() -> String {
    "temp".to_string()
}

fn default_temp_extension() -> String {
    ".tmp".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = PortioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.streams.read_buffer_size, 2000);
        assert_eq!(config.streams.endian().unwrap(), Endian::Big);
        assert_eq!(
            config.paths.file_system_type().unwrap(),
            FileSystemType::native()
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PortioConfig = toml::from_str(
            r#"
            version = "1.0"

            [streams]
            read_buffer_size = 0
            default_endian = "little"

            [paths]
            file_system = "fat32"
            temp_directory = "/var/tmp"
            "#,
        )
        .unwrap();

        assert_eq!(config.streams.read_buffer_size, 0);
        assert_eq!(config.streams.write_buffer_size, 2000);
        assert_eq!(config.streams.endian().unwrap(), Endian::Little);
        assert_eq!(config.paths.file_system_type().unwrap(), FileSystemType::Fat32);
        assert_eq!(config.paths.temp_directory.as_deref(), Some("/var/tmp"));
        assert_eq!(config.paths.temp_file_extension, ".tmp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = PortioConfig::default();
        config.streams.write_buffer_size = 2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "streams.write_buffer_size",
                ..
            })
        ));

        let mut config = PortioConfig::default();
        config.streams.memory_resize_factor = 0.5;
        assert!(config.validate().is_err());

        let mut config = PortioConfig::default();
        config.streams.default_endian = "middle".to_string();
        assert!(config.validate().is_err());

        let mut config = PortioConfig::default();
        config.paths.file_system = "hfs".to_string();
        assert!(config.validate().is_err());

        let mut config = PortioConfig::default();
        config.paths.temp_directory = Some("relative/tmp".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stream_conversions() {
        let mut settings = StreamSettings::default();
        settings.read_buffer_size = 7;
        settings.memory_resize_maximum = 4096;
        assert_eq!(settings.effective_buffer_sizes(), (6, 2000));
        assert_eq!(settings.resize_options().maximum, 4096);
        assert_eq!(settings.resize_options().factor, 1.5);
    }
}
