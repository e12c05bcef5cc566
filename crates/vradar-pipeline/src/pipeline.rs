//! Ordered stage pipeline.
//!
//! The [`Pipeline`] is an ordered list of stages composed by the host.
//! Each request flows through the stages in registration order; any
//! stage may short-circuit with a terminal response, in which case later
//! stages and the application handler never run.
//!
//! ```text
//! Request → RequestId → BasicAuthentication → Redirection → Handler
//!                │              │                  │
//!                │              └→ 401 challenge   └→ 302 redirect
//! ```
//!
//! Ordering guarantee: within one request the authentication decision
//! fully resolves (principal attached or terminal 401) before any later
//! stage runs, and the redirection decision fully resolves before the
//! handler is invoked.

use crate::context::PipelineContext;
use crate::stage::{BoxFuture, Next, Stage};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased stage that can be stored in the pipeline.
pub type BoxedStage = Arc<dyn Stage>;

/// An ordered, immutable chain of stages.
///
/// # Example
///
/// ```ignore
/// use vradar_pipeline::Pipeline;
/// use vradar_pipeline::stages::{BasicAuthenticationStage, RedirectionStage};
///
/// let pipeline = Pipeline::builder()
///     .add_stage(BasicAuthenticationStage::new(auth_config, store))
///     .add_stage(RedirectionStage::new(redirection_config))
///     .build();
///
/// let response = pipeline.process(ctx, request, handler).await;
/// ```
pub struct Pipeline {
    stages: Vec<BoxedStage>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes a request through the pipeline.
    ///
    /// The request flows through every stage in order and then to the
    /// handler, unless a stage short-circuits first.
    pub async fn process<H>(
        &self,
        mut ctx: PipelineContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut PipelineContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    /// Builds the continuation chain from back to front.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut PipelineContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for stage in self.stages.iter().rev() {
            next = Next::new(stage.as_ref(), next);
        }
        next
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedStage>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage to the chain.
    ///
    /// Stages run in the order they are added.
    #[must_use]
    pub fn add_stage<S: Stage>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Builds the pipeline.
    ///
    /// The stage order is fixed after construction.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
