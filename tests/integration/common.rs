use std::io::Write;
use std::path::Path;
use std::process::Output;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use busbar_sf_metadata::{
    DeployOptions, DeployResult, ListMetadataResponse, ListQuery, RetrieveRequest,
    RetrieveResult, RetrieveStatus,
};
use busbar_sf_source::{MetadataTransport, SfProject};

pub const USERNAME: &str = "ci@example.com";

/// A DX project with `force-app/main/default/classes/Foo.cls`.
pub fn project() -> (tempfile::TempDir, SfProject) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("sfdx-project.json"),
        r#"{
  "packageDirectories": [{ "path": "force-app", "default": true }],
  "sourceApiVersion": "61.0"
}"#,
    )
    .unwrap();
    let classes = dir.path().join("force-app/main/default/classes");
    std::fs::create_dir_all(&classes).unwrap();
    std::fs::write(classes.join("Foo.cls"), "public class Foo {}").unwrap();
    std::fs::write(
        classes.join("Foo.cls-meta.xml"),
        "<ApexClass><apiVersion>61.0</apiVersion></ApexClass>",
    )
    .unwrap();
    let project = SfProject::load(dir.path()).unwrap();
    (dir, project)
}

/// Base64 archive in the layout `checkRetrieveStatus` returns.
pub fn retrieve_zip(entries: &[(&str, &str)]) -> String {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, body) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    general_purpose::STANDARD.encode(zip.finish().unwrap().into_inner())
}

pub fn soap(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soapenv:Body>{}</soapenv:Body></soapenv:Envelope>",
        body
    )
}

/// Run the `sf-source` binary in `cwd` with credentials for `instance_url`.
pub async fn run_cli(cwd: &Path, instance_url: &str, args: &[&str]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_sf-source"))
        .args(args)
        .current_dir(cwd)
        .env("SF_INSTANCE_URL", instance_url)
        .env("SF_ACCESS_TOKEN", "00Dxx0000000001!token")
        .env("SF_USERNAME", USERNAME)
        .env_remove("SF_TARGET_ORG")
        .env_remove("SF_API_VERSION")
        .env_remove("SF_SOURCE_POLL_INTERVAL_MS")
        .env_remove("RUST_LOG")
        .output()
        .await
        .unwrap()
}

/// A retrieve job that never leaves `InProgress`.
#[derive(Default)]
pub struct StuckRetrieve {
    pub submissions: AtomicUsize,
    pub checks: AtomicUsize,
    pub requests: Mutex<Vec<RetrieveRequest>>,
}

fn unscripted(what: &str) -> busbar_sf_metadata::Error {
    busbar_sf_metadata::Error::new(busbar_sf_metadata::ErrorKind::InvalidResponse(format!(
        "{} is not scripted",
        what
    )))
}

#[async_trait]
impl MetadataTransport for StuckRetrieve {
    async fn submit_retrieve(
        &self,
        request: &RetrieveRequest,
    ) -> busbar_sf_metadata::Result<String> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok("09Sxx00000000ZZ".to_string())
    }

    async fn check_retrieve(&self, id: &str) -> busbar_sf_metadata::Result<RetrieveResult> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(RetrieveResult {
            id: id.to_string(),
            done: false,
            status: RetrieveStatus::InProgress,
            success: false,
            error_message: None,
            error_status_code: None,
            zip_file: None,
            file_properties: vec![],
            messages: vec![],
        })
    }

    async fn submit_deploy(
        &self,
        _zip: &[u8],
        _options: &DeployOptions,
    ) -> busbar_sf_metadata::Result<String> {
        Err(unscripted("deploy"))
    }

    async fn check_deploy(&self, _id: &str) -> busbar_sf_metadata::Result<DeployResult> {
        Err(unscripted("checkDeployStatus"))
    }

    async fn list_metadata(
        &self,
        _query: &ListQuery,
        _as_of_version: Option<&str>,
    ) -> busbar_sf_metadata::Result<ListMetadataResponse> {
        Err(unscripted("listMetadata"))
    }
}
