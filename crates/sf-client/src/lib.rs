//! # sf-client
//!
//! Shared HTTP infrastructure for the busbar Salesforce crates.
//!
//! This crate owns the pieces every API client needs and nothing more:
//! - [`ClientConfig`] - timeouts, user agent and compression for the
//!   underlying `reqwest` client
//! - [`security`] - XML escaping for SOAP envelopes and redaction of
//!   credentials in error text
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_client::ClientConfig;
//! use std::time::Duration;
//!
//! let http = ClientConfig::builder()
//!     .with_timeout(Duration::from_secs(120))
//!     .build()
//!     .http_client()?;
//! ```

mod config;
mod error;
pub mod security;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("busbar-sf-source/", env!("CARGO_PKG_VERSION"));
