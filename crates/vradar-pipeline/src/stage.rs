//! Core stage trait and continuation types.
//!
//! A [`Stage`] is one link in the request-processing chain. It receives
//! the mutable [`PipelineContext`], the incoming request and a [`Next`]
//! continuation; it either forwards to the continuation or
//! short-circuits with its own response (a 401 challenge, a redirect).
//!
//! # Example
//!
//! ```ignore
//! use vradar_pipeline::{BoxFuture, Next, PipelineContext, Request, Response, Stage};
//!
//! struct TimingStage;
//!
//! impl Stage for TimingStage {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         ctx: &'a mut PipelineContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let response = next.run(ctx, request).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "request complete");
//!             response
//!         })
//!     }
//! }
//! ```

use crate::context::PipelineContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One link in the request-processing chain.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once; not calling it
///   short-circuits the pipeline with the stage's own response
/// - A stage that short-circuits must fully populate its terminal
///   response before returning; no partial side effects leak past it
/// - Stages hold no per-request state of their own; everything mutable
///   lives on the [`PipelineContext`]
pub trait Stage: Send + Sync + 'static {
    /// Returns the unique name of this stage.
    ///
    /// The name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    ///
    /// Returns either the downstream response (after `next.run()`) or a
    /// terminal response generated here.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut PipelineContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// The continuation invoking the remainder of the chain.
///
/// Passed to every stage; consumed by value so it can run at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

/// Internal representation of the remaining chain.
enum NextInner<'a> {
    /// More stages to process.
    Chain {
        stage: &'a dyn Stage,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the application handler.
    Handler(
        Box<dyn FnOnce(&mut PipelineContext, Request) -> BoxFuture<'static, Response> + Send + 'a>,
    ),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given stage.
    pub(crate) fn new(stage: &'a dyn Stage, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                stage,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the application handler.
    pub(crate) fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut PipelineContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the handler.
    ///
    /// Consumes `self` so it can only be called once.
    pub async fn run(self, ctx: &mut PipelineContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { stage, next } => stage.handle(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A stage built from an async closure.
///
/// Allows defining simple stages without implementing the trait.
pub struct FnStage<F> {
    name: &'static str,
    func: F,
}

impl<F> FnStage<F> {
    /// Creates a new closure-based stage.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> Stage for FnStage<F>
where
    F: Fn(&mut PipelineContext, Request, Next<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut PipelineContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move { (self.func)(ctx, request, next).await })
    }
}
