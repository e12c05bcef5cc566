//! Built-in pipeline stages.
//!
//! The stages a host composes, in their intended order:
//!
//! 1. [`request_id`] - assign or propagate the request ID
//! 2. [`basic_auth`] - HTTP Basic authentication gate
//! 3. [`redirection`] - configured path redirects
//!
//! The authentication stage must run before redirection so that a gated
//! path challenges before any redirect is revealed.

pub mod basic_auth;
pub mod redirection;
pub mod request_id;

pub use basic_auth::{BasicAuthenticationStage, WWW_AUTHENTICATE_CHALLENGE};
pub use redirection::RedirectionStage;
pub use request_id::{RequestIdStage, REQUEST_ID_HEADER};
