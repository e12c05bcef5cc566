//! # vRadar Pipeline
//!
//! Request-processing pipeline for the vRadar web server.
//!
//! The pipeline is an ordered chain of [`Stage`]s that every request
//! flows through before reaching the application handler. Each stage may
//! enrich the per-request [`PipelineContext`], forward the request, or
//! short-circuit with a terminal response.
//!
//! ```text
//! Request → RequestId → BasicAuthentication → Redirection → Handler
//!                │              │                  │
//!                │              └→ 401 challenge   └→ 302 redirect
//! ```
//!
//! The built-in stages live in [`stages`]:
//!
//! - [`stages::RequestIdStage`] assigns a UUID v7 request ID
//! - [`stages::BasicAuthenticationStage`] gates requests behind HTTP
//!   Basic authentication and attaches the authenticated principal
//! - [`stages::RedirectionStage`] rewrites configured paths into
//!   redirects with fully reconstructed absolute URLs
//!
//! ## Example
//!
//! ```ignore
//! use vradar_pipeline::stages::{BasicAuthenticationStage, RedirectionStage, RequestIdStage};
//! use vradar_pipeline::{Pipeline, PipelineContext};
//!
//! let pipeline = Pipeline::builder()
//!     .add_stage(RequestIdStage::new())
//!     .add_stage(BasicAuthenticationStage::new(auth_config, store))
//!     .add_stage(RedirectionStage::new(redirection_config))
//!     .build();
//!
//! let response = pipeline
//!     .process(PipelineContext::new(), request, handler)
//!     .await;
//! ```

#![doc(html_root_url = "https://docs.rs/vradar-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod stage;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::{PipelineContext, RequestId, RequestView};
pub use pipeline::{BoxedStage, Pipeline, PipelineBuilder};
pub use stage::{BoxFuture, FnStage, Next, Stage};
pub use types::{Request, Response, ResponseExt};
