//! Test fixtures for vRadar development and testing.
//!
//! This module provides mock implementations of the collaborator traits
//! so pipeline stages can be exercised in tests without a real
//! configuration source or credential store.
//!
//! # Example
//!
//! ```
//! use vradar_core::fixtures::MockCredentialStore;
//! use vradar_core::CredentialStore;
//!
//! let store = MockCredentialStore::new().with_user("alice", "pw", true);
//! assert!(store.lookup_user("alice").is_some());
//! assert!(store.lookup_user("mallory").is_none());
//! ```

use crate::identity::{Principal, UserRecord, VerificationTag};
use crate::providers::{
    AuthenticationConfig, AuthenticationScheme, CredentialStore, RedirectionConfig,
    RedirectionRequestContext,
};
use std::collections::HashMap;
use std::sync::Arc;

/// A mock authentication policy with explicit admin prefixes and scheme.
#[derive(Debug, Clone, Default)]
pub struct MockAuthenticationConfig {
    scheme: AuthenticationScheme,
    admin_prefixes: Vec<String>,
}

impl MockAuthenticationConfig {
    /// Creates a policy with no admin paths and no site-wide auth.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server-wide authentication scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: AuthenticationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Adds an administrator path prefix (e.g. `/admin/`).
    #[must_use]
    pub fn with_admin_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.admin_prefixes.push(prefix.into());
        self
    }
}

impl AuthenticationConfig for MockAuthenticationConfig {
    fn is_administrator_path(&self, path: &str) -> bool {
        self.admin_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn authentication_scheme(&self) -> AuthenticationScheme {
        self.scheme
    }
}

/// A mock redirection policy backed by an exact-path table.
#[derive(Debug, Clone, Default)]
pub struct MockRedirectionConfig {
    entries: HashMap<String, (String, Option<String>)>,
}

impl MockRedirectionConfig {
    /// Creates an empty redirection table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a redirection for all user agents.
    #[must_use]
    pub fn with_redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.entries.insert(from.into(), (to.into(), None));
        self
    }

    /// Adds a redirection with a mobile-specific target.
    #[must_use]
    pub fn with_mobile_redirect(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        mobile_to: impl Into<String>,
    ) -> Self {
        self.entries
            .insert(from.into(), (to.into(), Some(mobile_to.into())));
        self
    }
}

impl RedirectionConfig for MockRedirectionConfig {
    fn redirect_to_path_from_root(
        &self,
        path: &str,
        context: &RedirectionRequestContext,
    ) -> Option<String> {
        let (to, mobile_to) = self.entries.get(path)?;
        if context.is_mobile {
            if let Some(mobile) = mobile_to {
                return Some(mobile.clone());
            }
        }
        Some(to.clone())
    }
}

/// A mock credential store backed by an in-memory user table.
///
/// Passwords are compared in plain text and the verification tag is a
/// fixed generation string, which is enough to drive every decision path
/// in the authentication stage.
#[derive(Debug, Clone)]
pub struct MockCredentialStore {
    users: HashMap<String, Arc<UserRecord>>,
    generation: String,
}

impl MockCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            generation: "gen-1".to_string(),
        }
    }

    /// Adds a known user with a plain-text password.
    #[must_use]
    pub fn with_user(
        mut self,
        name: impl Into<String>,
        password: impl Into<String>,
        is_administrator: bool,
    ) -> Self {
        let name = name.into();
        self.users.insert(
            name.clone(),
            Arc::new(UserRecord::new(name, is_administrator, password)),
        );
        self
    }

    /// Sets the tag generation, simulating a cache refresh.
    #[must_use]
    pub fn with_generation(mut self, generation: impl Into<String>) -> Self {
        self.generation = generation.into();
        self
    }
}

impl Default for MockCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MockCredentialStore {
    fn lookup_user(&self, username: &str) -> Option<Arc<UserRecord>> {
        self.users.get(username).cloned()
    }

    fn derive_tag(&self, user: Option<&UserRecord>) -> VerificationTag {
        match user {
            Some(record) => VerificationTag::new(format!("{}:{}", self.generation, record.name())),
            None => VerificationTag::new(self.generation.clone()),
        }
    }

    fn verify_password(
        &self,
        user: Option<&UserRecord>,
        _tag: &VerificationTag,
        password: &str,
    ) -> bool {
        user.is_some_and(|record| record.password_material() == password)
    }

    fn build_principal(&self, user: &UserRecord, tag: &VerificationTag) -> Principal {
        Principal::new(user, tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_auth_config_prefix_match() {
        let config = MockAuthenticationConfig::new().with_admin_prefix("/admin/");
        assert!(config.is_administrator_path("/admin/settings"));
        assert!(!config.is_administrator_path("/public/index.html"));
    }

    #[test]
    fn test_mock_redirection_prefers_mobile_target() {
        let config = MockRedirectionConfig::new().with_mobile_redirect(
            "/",
            "/desktop.html",
            "/mobile.html",
        );

        let desktop = RedirectionRequestContext { is_mobile: false };
        let mobile = RedirectionRequestContext { is_mobile: true };

        assert_eq!(
            config.redirect_to_path_from_root("/", &desktop),
            Some("/desktop.html".to_string())
        );
        assert_eq!(
            config.redirect_to_path_from_root("/", &mobile),
            Some("/mobile.html".to_string())
        );
        assert_eq!(config.redirect_to_path_from_root("/other", &desktop), None);
    }

    #[test]
    fn test_mock_store_verifies_known_user_only() {
        let store = MockCredentialStore::new().with_user("alice", "pw", false);

        let user = store.lookup_user("alice");
        let tag = store.derive_tag(user.as_deref());
        assert!(store.verify_password(user.as_deref(), &tag, "pw"));
        assert!(!store.verify_password(user.as_deref(), &tag, "wrong"));

        let miss = store.lookup_user("nobody");
        let miss_tag = store.derive_tag(miss.as_deref());
        assert!(!store.verify_password(miss.as_deref(), &miss_tag, "pw"));
    }

    #[test]
    fn test_mock_store_tag_tracks_generation() {
        let store = MockCredentialStore::new()
            .with_user("alice", "pw", false)
            .with_generation("gen-2");
        let user = store.lookup_user("alice");
        let tag = store.derive_tag(user.as_deref());
        assert_eq!(tag.as_str(), "gen-2:alice");
    }
}
