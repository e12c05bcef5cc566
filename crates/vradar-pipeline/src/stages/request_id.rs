//! Request ID stage.
//!
//! Assigns every request a UUID v7 identifier before any decision stage
//! runs, so that the authentication and redirection log lines for one
//! request can be correlated. The ID is echoed back to the client in the
//! `X-Request-ID` response header.
//!
//! An incoming `X-Request-ID` header is honored only when the stage is
//! built with [`RequestIdStage::trust_incoming`], which is meant for
//! deployments behind a reverse proxy that already assigns IDs.
//!
//! Because this stage wraps the whole chain, it also emits the
//! per-request completion event: the request ID, the response status
//! and the elapsed processing time.

use crate::context::{PipelineContext, RequestId};
use crate::stage::{BoxFuture, Next, Stage};
use crate::types::{Request, Response};
use uuid::Uuid;

/// The header used to propagate request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Stage that assigns a request ID and echoes it on the response.
#[derive(Debug, Clone, Default)]
pub struct RequestIdStage {
    trust_incoming: bool,
}

impl RequestIdStage {
    /// Creates a stage that always generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stage that reuses a valid incoming `X-Request-ID`.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    /// Extracts a request ID from the headers if present and valid.
    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(RequestId::from_uuid)
    }
}

impl Stage for RequestIdStage {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut PipelineContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await;

            tracing::debug!(
                request_id = %request_id,
                http.status_code = response.status().as_u16(),
                elapsed = ?ctx.elapsed(),
                "request completed"
            );

            // A UUID rendering is always a valid header value.
            if let Ok(value) = http::HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            response
        })
    }
}
