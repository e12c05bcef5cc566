//! Basic authentication stage.
//!
//! This stage gates requests on HTTP Basic credentials. A request is
//! gated when its normalized path is an administrator path, or when the
//! server-wide authentication scheme is Basic; every other request is
//! exempt and forwarded without any header inspection.
//!
//! ## Decision outline
//!
//! 1. Exempt requests forward immediately, no principal attached
//! 2. Gated requests default to failure
//! 3. Credentials are parsed from the `Authorization` header; a missing
//!    or malformed header fails without consulting the credential store
//! 4. The store is asked for the user record, the current verification
//!    tag, and a password verdict
//! 5. The password must verify AND (the path is not admin-only OR the
//!    user is an administrator); admin-only paths layer a stricter
//!    requirement on top of generic Basic auth rather than being a
//!    separate mechanism
//! 6. Success attaches a [`Principal`] to the context; any failure
//!    terminates the pipeline with a 401 challenge
//!
//! A valid non-administrator hitting an admin-only path gets the same
//! 401 as a wrong password; HTTP Basic cannot distinguish the two.

use crate::context::PipelineContext;
use crate::stage::{BoxFuture, Next, Stage};
use crate::types::{Request, Response, ResponseExt};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use http::StatusCode;
use std::sync::Arc;
use vradar_core::{AuthenticationConfig, AuthenticationScheme, Credentials, CredentialStore};

/// The exact challenge sent with every 401 from this stage.
pub const WWW_AUTHENTICATE_CHALLENGE: &str =
    "Basic Realm=\"Virtual Radar Server\", charset=\"UTF-8\"";

/// Stage enforcing HTTP Basic credentials on gated requests.
///
/// The stage holds no per-request state; the authentication policy and
/// the credential cache live behind the collaborators supplied at
/// construction, so one instance serves every in-flight request.
pub struct BasicAuthenticationStage {
    config: Arc<dyn AuthenticationConfig>,
    store: Arc<dyn CredentialStore>,
}

impl BasicAuthenticationStage {
    /// Creates the stage from its collaborators.
    #[must_use]
    pub fn new(config: Arc<dyn AuthenticationConfig>, store: Arc<dyn CredentialStore>) -> Self {
        Self { config, store }
    }

    /// Runs the authentication decision for one request.
    ///
    /// Returns true if the pipeline may continue. On success for a gated
    /// request, the principal has been attached to the context. The
    /// decision is deterministic: invoking it again on an unmodified
    /// context yields the same outcome.
    pub fn authenticated(&self, ctx: &mut PipelineContext, request: &Request) -> bool {
        let path = ctx.request_view(request).path_normalized().to_string();

        let is_admin_only_path = self.config.is_administrator_path(&path);
        let is_global_auth_enabled =
            self.config.authentication_scheme() == AuthenticationScheme::Basic;

        if !is_admin_only_path && !is_global_auth_enabled {
            // Exempt: the common unauthenticated path never looks at
            // the Authorization header.
            return true;
        }

        let header = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let Some(credentials) = extract_credentials(header) else {
            tracing::debug!(path = %path, "gated request without usable credentials");
            return false;
        };

        let user = self.store.lookup_user(credentials.username());
        let tag = self.store.derive_tag(user.as_deref());
        let is_password_valid =
            self.store
                .verify_password(user.as_deref(), &tag, credentials.password());

        let is_authorized = is_password_valid
            && (!is_admin_only_path
                || user.as_deref().is_some_and(vradar_core::UserRecord::is_administrator));

        if is_authorized {
            if let Some(record) = user.as_deref() {
                ctx.set_principal(self.store.build_principal(record, &tag));
            }
            true
        } else {
            tracing::warn!(
                path = %path,
                username = %credentials.username(),
                admin_only = is_admin_only_path,
                "basic authentication failed"
            );
            false
        }
    }
}

impl Stage for BasicAuthenticationStage {
    fn name(&self) -> &'static str {
        "basic_authentication"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut PipelineContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if self.authenticated(ctx, &request) {
                next.run(ctx, request).await
            } else {
                challenge_response()
            }
        })
    }
}

/// Extracts Basic credentials from a raw `Authorization` header value.
///
/// Total and side-effect free: an absent header is passed as the empty
/// string and yields `None` ("no credentials supplied"), as does any
/// malformed input - wrong scheme, invalid base64, non-UTF-8 payload or
/// a payload without a colon.
#[must_use]
pub fn extract_credentials(header: &str) -> Option<Credentials> {
    let scheme = header.get(..6)?;
    if !scheme.eq_ignore_ascii_case("basic ") {
        return None;
    }

    let decoded = BASE64.decode(header[6..].trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some(Credentials::new(username, password))
}

/// Builds the terminal "needs authentication" response.
#[must_use]
pub fn challenge_response() -> Response {
    let mut response = Response::empty(StatusCode::UNAUTHORIZED);
    apply_challenge(&mut response);
    response
}

/// Sets the 401 status and the `WWW-Authenticate` challenge header.
///
/// Idempotent per response: the header is inserted, never appended, so
/// applying the challenge twice leaves exactly one header.
pub fn apply_challenge(response: &mut Response) {
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response.headers_mut().insert(
        http::header::WWW_AUTHENTICATE,
        http::HeaderValue::from_static(WWW_AUTHENTICATE_CHALLENGE),
    );
}
