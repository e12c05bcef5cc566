//! Collaborator traits consumed by the pipeline stages.
//!
//! The stages themselves hold no policy state. Authentication scope,
//! redirection tables and the credential cache all live behind these
//! traits, supplied at stage construction time. This keeps every stage
//! stateless, safe for concurrent invocation, and substitutable in
//! tests (see [`fixtures`](crate::fixtures)).
//!
//! Implementations must be internally synchronized: a single instance is
//! shared by every in-flight request.

use crate::identity::{Principal, UserRecord, VerificationTag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The server-wide authentication mode.
///
/// When the scheme is [`Basic`](Self::Basic), every request is gated on
/// Basic credentials, not just administrator paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationScheme {
    /// No site-wide authentication; only administrator paths are gated.
    #[default]
    None,
    /// HTTP Basic authentication is required site-wide.
    Basic,
}

/// Request classification passed to the redirection policy.
///
/// Built fresh for every redirection decision; immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RedirectionRequestContext {
    /// Whether the request's user agent matched a known mobile device.
    pub is_mobile: bool,
}

/// Supplies the authentication policy for the pipeline.
pub trait AuthenticationConfig: Send + Sync {
    /// Returns true if the given normalized path requires an
    /// administrator principal.
    fn is_administrator_path(&self, path: &str) -> bool;

    /// Returns the current server-wide authentication scheme.
    fn authentication_scheme(&self) -> AuthenticationScheme;
}

/// Supplies the redirection policy for the pipeline.
pub trait RedirectionConfig: Send + Sync {
    /// Returns the replacement path (relative to the site root) for a
    /// normalized request path, or `None` if the request should not be
    /// redirected.
    fn redirect_to_path_from_root(
        &self,
        path: &str,
        context: &RedirectionRequestContext,
    ) -> Option<String>;
}

/// The external credential store consulted for gated requests.
///
/// The store owns user records, their lookup policy (case folding,
/// caching) and the password verification algorithm. A lookup miss is an
/// ordinary `None`, never an error; [`verify_password`] must return
/// false for a missing record.
///
/// [`verify_password`]: Self::verify_password
pub trait CredentialStore: Send + Sync {
    /// Looks up the cached record for a username. `None` means no such
    /// user is known.
    fn lookup_user(&self, username: &str) -> Option<Arc<UserRecord>>;

    /// Derives the current verification tag for a record (or for the
    /// "no such user" case), used to detect stale cache entries.
    fn derive_tag(&self, user: Option<&UserRecord>) -> VerificationTag;

    /// Verifies a supplied password against a record and its tag.
    ///
    /// Must return false when `user` is `None`.
    fn verify_password(
        &self,
        user: Option<&UserRecord>,
        tag: &VerificationTag,
        password: &str,
    ) -> bool;

    /// Builds the principal to attach to the request after successful
    /// verification.
    fn build_principal(&self, user: &UserRecord, tag: &VerificationTag) -> Principal;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_default_is_none() {
        assert_eq!(AuthenticationScheme::default(), AuthenticationScheme::None);
    }

    #[test]
    fn test_scheme_serde_lowercase() {
        let json = serde_json::to_string(&AuthenticationScheme::Basic).unwrap();
        assert_eq!(json, "\"basic\"");

        let parsed: AuthenticationScheme = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, AuthenticationScheme::None);
    }

    #[test]
    fn test_redirection_context_defaults_to_desktop() {
        let ctx = RedirectionRequestContext::default();
        assert!(!ctx.is_mobile);
    }
}
