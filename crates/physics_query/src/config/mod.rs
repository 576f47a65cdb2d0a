//! Configuration system
//!
//! Settings for the query facade, the shipped world backend and logging. Any
//! [`Config`] type can be loaded from or saved to `.toml` or `.ron` files.

pub use serde::{Serialize, Deserialize};
use std::path::Path;

/// On-disk configuration formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Detect the format from a path's extension, ignoring case
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File contents did not match the config schema
    #[error("Invalid config: {0}")]
    Parse(String),

    /// Config could not be encoded
    #[error("Could not encode config: {0}")]
    Serialize(String),

    /// Path has neither a `.toml` nor a `.ron` extension
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// What `initialize` does when the facade is already `Ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReinitPolicy {
    /// Refuse and hand the new world back to the caller
    #[default]
    Reject,
    /// Tear the current context down, then initialize against the new world
    Reallocate,
}

/// Query facade settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Double-initialize behavior
    pub reinit_policy: ReinitPolicy,
    /// Reject non-unit directions, non-positive distances and non-finite inputs
    pub validate_arguments: bool,
    /// Allowed deviation of `|direction|` from 1 when validating
    pub direction_tolerance: f32,
    /// Penetration depth tolerated by box sweeps before reporting a hit
    pub allowed_penetration: f32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            reinit_policy: ReinitPolicy::Reject,
            validate_arguments: true,
            direction_tolerance: 1e-3,
            allowed_penetration: 0.0,
        }
    }
}

/// Settings for the shipped [`ParryWorld`](crate::physics::backend::ParryWorld)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of live native handles (points, poses, vectors, shapes, results)
    pub native_handle_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            native_handle_capacity: 1024,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter directives
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Query facade settings
    pub query: QueryConfig,
    /// World backend settings
    pub world: WorldConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config for PhysicsConfig {}
