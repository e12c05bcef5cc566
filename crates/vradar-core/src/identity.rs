//! Identity types for the web pipeline.
//!
//! These types model the actors involved in a Basic authentication
//! decision:
//!
//! - [`UserRecord`] - an externally-owned record of a known user
//! - [`VerificationTag`] - a staleness marker derived from a record
//! - [`Principal`] - the authenticated identity attached to a request
//! - [`Credentials`] - a transient username/password pair from a header
//!
//! The pipeline never interprets password material itself; verification
//! is delegated to a [`CredentialStore`](crate::CredentialStore)
//! implementation.

use std::fmt;

/// A value derived from a cached user record, used to detect staleness
/// during password verification.
///
/// The tag is opaque to the pipeline. A credential store typically
/// derives it from a record version or hash so that a principal built
/// against an old cache entry can be told apart from a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerificationTag(String);

impl VerificationTag {
    /// Creates a tag from an opaque value supplied by the store.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the tag value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An externally-supplied record of a known user.
///
/// Records are owned by the credential store and looked up by username
/// once per gated request. The pipeline reads the administrator flag and
/// passes the record back to the store for verification; it never
/// mutates a record or interprets the password material.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// The user's login name.
    name: String,

    /// Whether this user may access administrator paths.
    is_administrator: bool,

    /// Opaque password-verification material (e.g. a hash), only
    /// meaningful to the credential store that produced it.
    password_material: String,
}

impl UserRecord {
    /// Creates a new user record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        is_administrator: bool,
        password_material: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_administrator,
            password_material: password_material.into(),
        }
    }

    /// Returns the user's login name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether this user has the administrator flag set.
    #[must_use]
    pub const fn is_administrator(&self) -> bool {
        self.is_administrator
    }

    /// Returns the opaque password-verification material.
    #[must_use]
    pub fn password_material(&self) -> &str {
        &self.password_material
    }
}

/// The authenticated identity attached to a request context.
///
/// A principal exists on a request if and only if Basic authentication
/// succeeded for that request. It is composed from a [`UserRecord`] and
/// the [`VerificationTag`] that was current at verification time, and is
/// read by downstream handlers only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The authenticated user's name.
    name: String,

    /// Whether the authenticated user is an administrator.
    is_administrator: bool,

    /// The verification tag current when the principal was built.
    tag: VerificationTag,
}

impl Principal {
    /// Creates a principal from a user record and its verification tag.
    #[must_use]
    pub fn new(user: &UserRecord, tag: VerificationTag) -> Self {
        Self {
            name: user.name().to_string(),
            is_administrator: user.is_administrator(),
            tag,
        }
    }

    /// Returns the authenticated user's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the authenticated user is an administrator.
    #[must_use]
    pub const fn is_administrator(&self) -> bool {
        self.is_administrator
    }

    /// Returns the verification tag the principal was built against.
    #[must_use]
    pub const fn tag(&self) -> &VerificationTag {
        &self.tag
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// This never contains password material or the verification tag.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("user:{}", self.name)
    }
}

/// A username/password pair extracted from an `Authorization` header.
///
/// Credentials are transient: they exist only for the duration of one
/// authentication decision and are never stored on the request context.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The supplied username.
    username: String,

    /// The supplied password.
    password: String,
}

impl Credentials {
    /// Creates a credentials pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the supplied username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the supplied password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Manual Debug so a password can never leak into logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
