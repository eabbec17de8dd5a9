//! # busbar-sf-metadata
//!
//! Salesforce Metadata API client for retrieving, deploying and listing
//! metadata.
//!
//! ## Features
//!
//! - **Retrieve** - Start retrieves for manifests and packages, check their status
//! - **Deploy** - Deploy zipped metadata packages via SOAP API
//! - **List Metadata** - List remote components of one type, optionally in a folder
//! - **Package manifests** - Build, render and parse `package.xml`
//!
//! Each call is a single request. Waiting for async operations is up to the
//! caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_metadata::{ListQuery, MetadataClient, PackageManifest, RetrieveRequest};
//! use busbar_sf_auth::SalesforceCredentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), busbar_sf_metadata::Error> {
//!     let creds = SalesforceCredentials::from_env()?;
//!     let client = MetadataClient::new(&creds)?;
//!
//!     let request = RetrieveRequest {
//!         unpackaged: Some(
//!             PackageManifest::new("62.0").add_type("ApexClass", vec!["*".to_string()]),
//!         ),
//!         package_names: vec![],
//!     };
//!     let async_id = client.retrieve(&request).await?;
//!     let status = client.check_retrieve_status(&async_id, true).await?;
//!     println!("Retrieve status: {:?}", status.status);
//!
//!     let classes = client.list_metadata(&ListQuery::new("ApexClass"), None).await?;
//!     for class in classes.into_vec() {
//!         println!("  {}", class.full_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod deploy;
mod error;
mod list;
mod retrieve;
mod types;

pub use client::MetadataClient;
pub use deploy::{DeployMessage, DeployOptions, DeployResult, DeployStatus, TestFailure};
pub use error::{Error, ErrorKind, Result};
pub use list::{ListMetadataResponse, ListQuery};
pub use retrieve::{
    PackageManifest, PackageTypeMembers, RetrieveMessage, RetrieveRequest, RetrieveResult,
    RetrieveStatus, PACKAGE_XML_NAMESPACE,
};
pub use types::{FileProperties, SoapFault, TestLevel, DEFAULT_API_VERSION};
