//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, Configuration, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Toml(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "Parse error: {}", e),
            ConfigError::Toml(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "invalid configuration: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Yaml(e) => Some(e),
            ConfigError::Toml(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Load and validate configuration from a YAML or TOML file.
pub fn load_config(path: &Path) -> Result<Configuration, ConfigError> {
    let format = ConfigFormat::from_path(path);
    tracing::info!(path = %path.display(), format = ?format, "Loading configuration");

    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, format)
}

/// Deserialize and validate an in-memory configuration document.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Configuration, ConfigError> {
    let raw: ProxyConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(ConfigError::Yaml)?,
        ConfigFormat::Toml => toml::from_str(content).map_err(ConfigError::Toml)?,
    };
    tracing::debug!(config = ?raw, "Deserialised configuration");

    let config = validate_config(&raw).map_err(ConfigError::Validation);
    if let Err(e) = &config {
        tracing::error!(error = %e, "The configuration is not valid");
    }
    config
}
