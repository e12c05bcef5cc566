//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration
//! from multiple sources: defaults, a TOML file, and environment
//! variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, PipelineConfig};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers
/// overriding earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use vradar_config::ConfigLoader;
///
/// # fn main() -> Result<(), vradar_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("vradar.toml")?
///     .with_env_prefix("VRADAR")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: PipelineConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for
    /// clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = PipelineConfig::default();
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be read,
    /// contains invalid TOML, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues with the
    /// current layer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use vradar_config::ConfigLoader;
    /// use vradar_core::AuthenticationScheme;
    ///
    /// let toml = r#"
    ///     [web_server]
    ///     authentication_scheme = "basic"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     config.web_server.authentication_scheme,
    ///     AuthenticationScheme::Basic
    /// );
    /// ```
    pub fn with_string(mut self, content: &str) -> Result<Self, ConfigError> {
        self.config = toml::from_str(content)?;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "VRADAR":
    /// - `VRADAR__WEB_SERVER__AUTHENTICATION_SCHEME=basic`
    /// - `VRADAR__AUTHENTICATION__ADMINISTRATOR_PATHS=/admin/,/settings/`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if environment variable parsing or
    /// validation fails.
    pub fn load(mut self) -> Result<PipelineConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    // Apply environment variable overrides
    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    // Apply a single environment variable
    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["WEB_SERVER", "AUTHENTICATION_SCHEME"] => {
                self.config.web_server.authentication_scheme =
                    match value.to_ascii_lowercase().as_str() {
                        "none" => vradar_core::AuthenticationScheme::None,
                        "basic" => vradar_core::AuthenticationScheme::Basic,
                        _ => {
                            return Err(ConfigError::env_parse_error(
                                key,
                                "expected 'none' or 'basic'",
                            ))
                        }
                    };
            }
            ["AUTHENTICATION", "ADMINISTRATOR_PATHS"] => {
                self.config.authentication.administrator_paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|path| !path.is_empty())
                    .map(ToString::to_string)
                    .collect();
            }
            _ => {
                tracing::warn!(key = %key, "ignoring unrecognized configuration override");
            }
        }

        Ok(())
    }
}
