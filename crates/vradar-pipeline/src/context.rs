//! Per-request pipeline context.
//!
//! The [`PipelineContext`] carries mutable per-request state through the
//! stage chain: the request ID, the principal slot, type-keyed extension
//! data and a lazily derived [`RequestView`].
//!
//! The view is the normalized read-only picture of the request that the
//! authentication and redirection decisions consume: normalized path,
//! scheme, host, path-base, query string and the mobile user-agent
//! classification. It is derived once on first access and cached for the
//! remainder of the request; contexts are never shared across requests.

use crate::types::Request;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;
use vradar_core::Principal;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it suitable for request tracking
/// and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    ///
    /// Useful when a request ID arrives in a header from a trusted
    /// upstream.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-agent substrings that classify a request as mobile.
///
/// The match is case-insensitive; the generic `mobile` token catches
/// browsers that advertise themselves without a device name.
const MOBILE_AGENT_TOKENS: &[&str] = &[
    "android",
    "iphone",
    "ipad",
    "ipod",
    "windows phone",
    "blackberry",
    "opera mini",
    "mobile",
];

/// The normalized, read-only view of a request.
///
/// Derived once per request by [`PipelineContext::request_view`] and
/// cached. All pipeline decisions are made against this view rather than
/// the raw request so that every stage sees the same normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView {
    path_normalized: String,
    scheme: String,
    host: String,
    path_base: String,
    query: String,
    is_mobile: bool,
}

impl RequestView {
    /// Derives a view from a raw request and the configured path-base.
    fn derive(request: &Request, path_base: &str) -> Self {
        let uri = request.uri();

        let scheme = uri.scheme_str().unwrap_or("http").to_string();

        let host = uri
            .authority()
            .map(|authority| authority.to_string())
            .or_else(|| {
                request
                    .headers()
                    .get(http::header::HOST)
                    .and_then(|value| value.to_str().ok())
                    .map(ToString::to_string)
            })
            .unwrap_or_default();

        // The path-base is the site mount point; the normalized path is
        // always relative to it.
        let raw_path = uri.path();
        let relative = if !path_base.is_empty()
            && raw_path.len() >= path_base.len()
            && raw_path[..path_base.len()].eq_ignore_ascii_case(path_base)
        {
            &raw_path[path_base.len()..]
        } else {
            raw_path
        };

        let query = uri.query().unwrap_or_default().to_string();

        let is_mobile = request
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_mobile_user_agent);

        Self {
            path_normalized: normalize_path(relative),
            scheme,
            host,
            path_base: path_base.to_string(),
            query,
            is_mobile,
        }
    }

    /// Returns the normalized request path (relative to the path-base).
    #[must_use]
    pub fn path_normalized(&self) -> &str {
        &self.path_normalized
    }

    /// Returns the request scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the request host, including any explicit port.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the site mount point the normalized path is relative to.
    #[must_use]
    pub fn path_base(&self) -> &str {
        &self.path_base
    }

    /// Returns the raw query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns true if the user agent matched a known mobile device.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.is_mobile
    }
}

/// Context that flows through the pipeline for one request.
///
/// The context is created by the host once per request and handed to
/// every stage in turn. Stages enrich it (request ID, principal) and
/// read the derived [`RequestView`]; it is discarded when the request
/// completes.
#[derive(Debug)]
pub struct PipelineContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The authenticated principal, present iff Basic authentication
    /// succeeded for this request.
    principal: Option<Principal>,

    /// The site mount point used when deriving the request view.
    path_base: String,

    /// When the request started processing.
    started_at: Instant,

    /// Lazily derived request view, cached after first access.
    view: Option<RequestView>,

    /// Type-erased extension data for stage-to-stage communication.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PipelineContext {
    /// Creates a new context with a fresh request ID and an empty
    /// path-base (site mounted at the root).
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            principal: None,
            path_base: String::new(),
            started_at: Instant::now(),
            view: None,
            extensions: HashMap::new(),
        }
    }

    /// Creates a context for a site mounted under the given path-base
    /// (e.g. `/app`).
    #[must_use]
    pub fn with_path_base(path_base: impl Into<String>) -> Self {
        Self {
            path_base: path_base.into(),
            ..Self::new()
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Sets the request ID.
    ///
    /// This should only be called by the request-ID stage.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the authenticated principal, if one was attached.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Attaches the authenticated principal.
    ///
    /// This should only be called by the authentication stage, after a
    /// successful verification.
    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// Returns the derived request view, deriving and caching it on
    /// first access.
    pub fn request_view(&mut self, request: &Request) -> &RequestView {
        self.view
            .get_or_insert_with(|| RequestView::derive(request, &self.path_base))
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value for later stages.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref())
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes a raw request path for policy comparisons.
///
/// The result is ASCII-lowercased, always starts with `/`, and has
/// duplicate slashes collapsed. Percent escapes are left untouched; the
/// normalized path is a comparison key, not a filesystem path.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let mut path = String::with_capacity(raw.len() + 1);
    if !raw.starts_with('/') {
        path.push('/');
    }
    let mut previous_was_slash = false;
    for ch in raw.chars() {
        if ch == '/' {
            if previous_was_slash {
                continue;
            }
            previous_was_slash = true;
        } else {
            previous_was_slash = false;
        }
        path.push(ch.to_ascii_lowercase());
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Returns true if a user-agent string matches a known mobile device
/// pattern.
#[must_use]
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let user_agent = user_agent.to_ascii_lowercase();
    MOBILE_AGENT_TOKENS
        .iter()
        .any(|token| user_agent.contains(token))
}

/// Constructs an absolute URL from its parts.
///
/// Path segments are recombined with exactly one slash between them and
/// a non-empty query string is appended after `?`. The host is used
/// verbatim; default-port stripping is the caller's concern.
#[must_use]
pub fn construct_url(
    scheme: &str,
    host: &str,
    path_base: &str,
    path: &str,
    query: &str,
) -> String {
    let mut url = format!("{scheme}://{host}");
    for segment in [path_base, path] {
        if segment.is_empty() {
            continue;
        }
        match (url.ends_with('/'), segment.starts_with('/')) {
            (true, true) => {
                url.pop();
            }
            (false, false) => url.push('/'),
            _ => {}
        }
        url.push_str(segment);
    }
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    url
}
