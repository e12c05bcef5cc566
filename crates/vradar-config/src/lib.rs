//! Typed configuration for the vRadar pipeline.
//!
//! This crate loads the pipeline's policy configuration from TOML and
//! the environment, validates it, and turns it into the provider types
//! the stages consume:
//!
//! - [`AuthenticationSettings`] implements
//!   `vradar_core::AuthenticationConfig`
//! - [`RedirectionSettings`] implements `vradar_core::RedirectionConfig`
//!
//! # Example
//!
//! ```no_run
//! use vradar_config::ConfigLoader;
//!
//! # fn main() -> Result<(), vradar_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("vradar.toml")?
//!     .with_env_prefix("VRADAR")
//!     .load()?;
//!
//! let auth = config.authentication_settings();
//! let redirection = config.redirection_settings();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [web_server]
//! authentication_scheme = "basic"
//!
//! [authentication]
//! administrator_paths = ["/admin/"]
//!
//! [[redirection.entries]]
//! from = "/"
//! to = "/desktop.html"
//! mobile_to = "/mobile.html"
//! ```
//!
//! # Environment Variable Overrides
//!
//! With prefix `VRADAR`:
//!
//! - `VRADAR__WEB_SERVER__AUTHENTICATION_SCHEME=basic`
//! - `VRADAR__AUTHENTICATION__ADMINISTRATOR_PATHS=/admin/,/settings/`

#![doc(html_root_url = "https://docs.rs/vradar-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{
    AuthenticationSection, AuthenticationSettings, PipelineConfig, RedirectionEntry,
    RedirectionSection, RedirectionSettings, WebServerSettings,
};
pub use error::ConfigError;
pub use loader::ConfigLoader;
