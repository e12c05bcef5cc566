//! Main configuration types.
//!
//! This module provides the top-level [`PipelineConfig`] struct, its TOML
//! sections, and the provider types ([`AuthenticationSettings`],
//! [`RedirectionSettings`]) the pipeline stages consume.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vradar_core::{
    AuthenticationConfig, AuthenticationScheme, RedirectionConfig, RedirectionRequestContext,
};

/// Complete pipeline configuration.
///
/// This is the root configuration type containing every section. Use
/// [`ConfigLoader`](crate::ConfigLoader) to load it from a file and the
/// environment, then derive the stage providers from it:
///
/// ```
/// use vradar_config::PipelineConfig;
/// use vradar_core::{AuthenticationConfig, AuthenticationScheme};
///
/// let config = PipelineConfig::default();
/// let auth = config.authentication_settings();
/// assert_eq!(auth.authentication_scheme(), AuthenticationScheme::None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Web server settings.
    #[serde(default)]
    pub web_server: WebServerSettings,

    /// Authentication settings.
    #[serde(default)]
    pub authentication: AuthenticationSection,

    /// Redirection settings.
    #[serde(default)]
    pub redirection: RedirectionSection,
}

impl PipelineConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an administrator path or a
    /// redirection entry is not an absolute path, or
    /// `ConfigError::ValidationError` if two redirection entries share a
    /// source path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in &self.authentication.administrator_paths {
            if !path.starts_with('/') {
                return Err(ConfigError::invalid_value(
                    "authentication.administrator_paths",
                    format!("path must start with '/': {path}"),
                ));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.redirection.entries {
            for (field, value) in [("from", Some(&entry.from)), ("to", Some(&entry.to))]
                .into_iter()
                .chain([("mobile_to", entry.mobile_to.as_ref())])
            {
                if let Some(value) = value {
                    if !value.starts_with('/') {
                        return Err(ConfigError::invalid_value(
                            format!("redirection.entries.{field}"),
                            format!("path must start with '/': {value}"),
                        ));
                    }
                }
            }

            if !seen.insert(normalize_key(&entry.from)) {
                return Err(ConfigError::validation_error(format!(
                    "duplicate redirection source path: {}",
                    entry.from
                )));
            }
        }

        Ok(())
    }

    /// Builds the authentication provider the pipeline consumes.
    #[must_use]
    pub fn authentication_settings(&self) -> AuthenticationSettings {
        AuthenticationSettings::new(
            self.web_server.authentication_scheme,
            self.authentication.administrator_paths.clone(),
        )
    }

    /// Builds the redirection provider the pipeline consumes.
    #[must_use]
    pub fn redirection_settings(&self) -> RedirectionSettings {
        RedirectionSettings::new(self.redirection.entries.clone())
    }
}

/// Web server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct WebServerSettings {
    /// The server-wide authentication scheme (`"none"` or `"basic"`).
    #[serde(default)]
    pub authentication_scheme: AuthenticationScheme,
}

/// Authentication settings section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AuthenticationSection {
    /// Folder prefixes that require an administrator principal, e.g.
    /// `["/admin/"]`.
    #[serde(default)]
    pub administrator_paths: Vec<String>,
}

/// Redirection settings section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RedirectionSection {
    /// The redirection table, keyed by request path.
    #[serde(default = "default_redirection_entries")]
    pub entries: Vec<RedirectionEntry>,
}

impl Default for RedirectionSection {
    fn default() -> Self {
        Self {
            entries: default_redirection_entries(),
        }
    }
}

/// One entry in the redirection table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RedirectionEntry {
    /// The request path to redirect, relative to the site root.
    pub from: String,

    /// The replacement path.
    pub to: String,

    /// The replacement path for mobile user agents, if different.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_to: Option<String>,
}

/// The out-of-the-box table: the site root redirects to the desktop page,
/// or the mobile page for mobile user agents.
fn default_redirection_entries() -> Vec<RedirectionEntry> {
    vec![RedirectionEntry {
        from: "/".to_string(),
        to: "/desktop.html".to_string(),
        mobile_to: Some("/mobile.html".to_string()),
    }]
}

/// Authentication provider backed by loaded configuration.
///
/// Administrator folders are normalized at construction (lowercased,
/// closed with a trailing slash) so the per-request check is a plain
/// prefix comparison against the already-normalized request path.
#[derive(Debug, Clone)]
pub struct AuthenticationSettings {
    scheme: AuthenticationScheme,
    administrator_folders: Vec<String>,
}

impl AuthenticationSettings {
    /// Creates a provider from a scheme and administrator folder list.
    #[must_use]
    pub fn new(scheme: AuthenticationScheme, folders: Vec<String>) -> Self {
        let administrator_folders = folders
            .iter()
            .map(|folder| {
                let mut folder = folder.to_ascii_lowercase();
                if !folder.starts_with('/') {
                    folder.insert(0, '/');
                }
                if !folder.ends_with('/') {
                    folder.push('/');
                }
                folder
            })
            .collect();

        Self {
            scheme,
            administrator_folders,
        }
    }
}

impl AuthenticationConfig for AuthenticationSettings {
    fn is_administrator_path(&self, path: &str) -> bool {
        // The trailing-slash-closed comparison means "/admin" gates
        // "/admin/settings" and "/admin" itself, but not "/administrator".
        self.administrator_folders
            .iter()
            .any(|folder| path.starts_with(folder.as_str()) || folder[..folder.len() - 1] == *path)
    }

    fn authentication_scheme(&self) -> AuthenticationScheme {
        self.scheme
    }
}

/// The target of one redirection table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RedirectionTarget {
    to: String,
    mobile_to: Option<String>,
}

/// Redirection provider backed by loaded configuration.
///
/// The table is keyed by normalized path so lookups against the
/// pipeline's normalized request path are exact.
#[derive(Debug, Clone)]
pub struct RedirectionSettings {
    entries: HashMap<String, RedirectionTarget>,
}

impl RedirectionSettings {
    /// Creates a provider from a redirection table.
    #[must_use]
    pub fn new(entries: Vec<RedirectionEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                (
                    normalize_key(&entry.from),
                    RedirectionTarget {
                        to: entry.to,
                        mobile_to: entry.mobile_to,
                    },
                )
            })
            .collect();

        Self { entries }
    }
}

impl RedirectionConfig for RedirectionSettings {
    fn redirect_to_path_from_root(
        &self,
        path: &str,
        context: &RedirectionRequestContext,
    ) -> Option<String> {
        let target = self.entries.get(path)?;
        if context.is_mobile {
            if let Some(mobile) = &target.mobile_to {
                return Some(mobile.clone());
            }
        }
        Some(target.to.clone())
    }
}

/// Normalizes a table key the same way the pipeline normalizes paths.
fn normalize_key(path: &str) -> String {
    let mut key = path.to_ascii_lowercase();
    if !key.starts_with('/') {
        key.insert(0, '/');
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_redirects_site_root() {
        let config = PipelineConfig::default();
        let settings = config.redirection_settings();

        let desktop = RedirectionRequestContext { is_mobile: false };
        let mobile = RedirectionRequestContext { is_mobile: true };

        assert_eq!(
            settings.redirect_to_path_from_root("/", &desktop),
            Some("/desktop.html".to_string())
        );
        assert_eq!(
            settings.redirect_to_path_from_root("/", &mobile),
            Some("/mobile.html".to_string())
        );
        assert_eq!(settings.redirect_to_path_from_root("/map.html", &desktop), None);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [web_server]
            authentication_scheme = "basic"

            [authentication]
            administrator_paths = ["/admin/"]

            [[redirection.entries]]
            from = "/"
            to = "/index.html"

            [[redirection.entries]]
            from = "/old"
            to = "/new"
            mobile_to = "/new-mobile"
        "#;

        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.web_server.authentication_scheme,
            AuthenticationScheme::Basic
        );
        assert_eq!(config.authentication.administrator_paths, vec!["/admin/"]);
        assert_eq!(config.redirection.entries.len(), 2);
        assert_eq!(config.redirection.entries[1].mobile_to.as_deref(), Some("/new-mobile"));
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let toml = r#"
            [web_server]
            authentication_scheme = "basic"
            surprise = true
        "#;

        assert!(toml::from_str::<PipelineConfig>(toml).is_err());
    }

    #[test]
    fn test_validate_rejects_relative_paths() {
        let mut config = PipelineConfig::default();
        config
            .authentication
            .administrator_paths
            .push("admin/".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = PipelineConfig::default();
        config.redirection.entries.push(RedirectionEntry {
            from: "old".to_string(),
            to: "/new".to_string(),
            mobile_to: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_sources() {
        let mut config = PipelineConfig::default();
        config.redirection.entries.push(RedirectionEntry {
            from: "/".to_string(),
            to: "/elsewhere.html".to_string(),
            mobile_to: None,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_administrator_folder_matching() {
        let settings =
            AuthenticationSettings::new(AuthenticationScheme::None, vec!["/Admin".to_string()]);

        assert!(settings.is_administrator_path("/admin/settings.html"));
        assert!(settings.is_administrator_path("/admin"));
        // A sibling folder that merely shares the prefix is not gated.
        assert!(!settings.is_administrator_path("/administrator/settings.html"));
        assert!(!settings.is_administrator_path("/map.html"));
    }

    #[test]
    fn test_redirection_keys_are_normalized() {
        let settings = RedirectionSettings::new(vec![RedirectionEntry {
            from: "/Old".to_string(),
            to: "/new".to_string(),
            mobile_to: None,
        }]);

        let context = RedirectionRequestContext::default();
        assert_eq!(
            settings.redirect_to_path_from_root("/old", &context),
            Some("/new".to_string())
        );
    }
}
