//! Redirection stage.
//!
//! This stage consults the redirection policy with the normalized
//! request path and a small request-classification context (currently:
//! is the user agent mobile). When the policy returns a replacement
//! path, the stage short-circuits with a generic redirect whose
//! `Location` is the fully reconstructed absolute URL; otherwise the
//! request is forwarded unchanged.
//!
//! The redirect status is deliberately the generic 302: the policy
//! provider does not distinguish permanent from temporary redirects, so
//! no 301 semantics are implied.

use crate::context::{construct_url, PipelineContext, RequestView};
use crate::stage::{BoxFuture, Next, Stage};
use crate::types::{Request, Response};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use std::sync::Arc;
use vradar_core::{RedirectionConfig, RedirectionRequestContext};

/// Stage rewriting configured request paths into 3xx responses.
pub struct RedirectionStage {
    config: Arc<dyn RedirectionConfig>,
}

impl RedirectionStage {
    /// Creates the stage from its policy provider.
    #[must_use]
    pub fn new(config: Arc<dyn RedirectionConfig>) -> Self {
        Self { config }
    }

    /// Runs the redirection decision for one request.
    ///
    /// Returns the absolute URL to redirect to, or `None` if the request
    /// should be forwarded unchanged.
    pub fn redirect_target(&self, ctx: &mut PipelineContext, request: &Request) -> Option<String> {
        let view = ctx.request_view(request);
        let context = RedirectionRequestContext {
            is_mobile: view.is_mobile(),
        };

        let new_path = self
            .config
            .redirect_to_path_from_root(view.path_normalized(), &context)?;

        Some(build_redirect_url(view, &new_path))
    }
}

impl Stage for RedirectionStage {
    fn name(&self) -> &'static str {
        "redirection"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut PipelineContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match self.redirect_target(ctx, &request) {
                Some(location) => {
                    tracing::debug!(location = %location, "redirecting request");
                    redirect_response(&location)
                }
                None => next.run(ctx, request).await,
            }
        })
    }
}

/// Reconstructs the absolute redirect URL for a request view.
///
/// Scheme-default ports are stripped from the host so they never leak
/// into generated URLs: `:80` for `http`, `:443` for `https`. The scheme
/// comparison is case-insensitive.
#[must_use]
pub fn build_redirect_url(view: &RequestView, new_path: &str) -> String {
    let host = strip_default_port(view.scheme(), view.host());
    construct_url(view.scheme(), host, view.path_base(), new_path, view.query())
}

/// Strips a scheme-default port suffix from a host, if present.
fn strip_default_port<'a>(scheme: &str, host: &'a str) -> &'a str {
    if scheme.eq_ignore_ascii_case("http") {
        host.strip_suffix(":80").unwrap_or(host)
    } else if scheme.eq_ignore_ascii_case("https") {
        host.strip_suffix(":443").unwrap_or(host)
    } else {
        host
    }
}

/// Builds the terminal redirect response.
fn redirect_response(location: &str) -> Response {
    http::Response::builder()
        .status(StatusCode::FOUND)
        .header(http::header::LOCATION, location)
        .body(Full::new(Bytes::new()))
        .expect("failed to build redirect response")
}
