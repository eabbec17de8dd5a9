//! # sf-auth
//!
//! Target org identity for the busbar metadata tools.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Tracing skips credential values
//! - CLI error output is sanitized before it is stored in an error
//!
//! ## Sources
//!
//! - **Environment** - `SF_INSTANCE_URL`, `SF_ACCESS_TOKEN`, `SF_USERNAME`
//! - **sf CLI** - an alias or username resolved through `~/.sfdx/alias.json`
//!   and `sf org display`
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_auth::{Credentials, SalesforceCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), busbar_sf_auth::Error> {
//!     // From environment variables
//!     let creds = SalesforceCredentials::from_env()?;
//!
//!     // From SFDX CLI
//!     let creds = SalesforceCredentials::from_sfdx_alias("myorg").await?;
//!     println!("Connected to {}", creds.display_name());
//!     Ok(())
//! }
//! ```

mod alias;
mod credentials;
mod error;

pub use alias::AliasStore;
pub use credentials::{Credentials, SalesforceCredentials};
pub use error::{Error, ErrorKind, Result};
