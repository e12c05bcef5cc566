//! # vRadar Core
//!
//! Core types and traits for the vRadar web pipeline.
//!
//! This crate provides the foundational types used throughout vRadar:
//!
//! - [`Principal`] - The authenticated identity attached to a request
//! - [`UserRecord`] / [`VerificationTag`] - Externally-owned credential data
//! - [`Credentials`] - A transient username/password pair
//! - [`AuthenticationConfig`] / [`RedirectionConfig`] / [`CredentialStore`] -
//!   Collaborator traits the pipeline stages consume
//! - [`fixtures`] - Mock collaborators for testing

#![doc(html_root_url = "https://docs.rs/vradar-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
mod identity;
mod providers;

pub use identity::{Credentials, Principal, UserRecord, VerificationTag};
pub use providers::{
    AuthenticationConfig, AuthenticationScheme, CredentialStore, RedirectionConfig,
    RedirectionRequestContext,
};
