//! Scripted transport for orchestration tests.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use busbar_sf_metadata::{
    DeployOptions, DeployResult, DeployStatus, ErrorKind, FileProperties, ListMetadataResponse,
    ListQuery, RetrieveRequest, RetrieveResult, RetrieveStatus,
};

use crate::transport::MetadataTransport;

pub(crate) const RETRIEVE_ID: &str = "09Sxx0000000001";
pub(crate) const DEPLOY_ID: &str = "0Afxx0000000001";

pub(crate) fn retrieve_status(status: RetrieveStatus, zip_file: Option<String>) -> RetrieveResult {
    let done = matches!(
        status,
        RetrieveStatus::Succeeded | RetrieveStatus::Failed | RetrieveStatus::Canceled
    );
    RetrieveResult {
        id: RETRIEVE_ID.to_string(),
        done,
        status,
        success: status == RetrieveStatus::Succeeded,
        error_message: (status == RetrieveStatus::Failed).then(|| "retrieve failed".to_string()),
        error_status_code: None,
        zip_file,
        file_properties: vec![FileProperties {
            file_name: "unpackaged/classes/Foo.cls".to_string(),
            full_name: "Foo".to_string(),
            component_type: "ApexClass".to_string(),
            ..Default::default()
        }],
        messages: vec![],
    }
}

pub(crate) fn deploy_status(status: DeployStatus) -> DeployResult {
    DeployResult {
        id: DEPLOY_ID.to_string(),
        done: !matches!(
            status,
            DeployStatus::Pending | DeployStatus::InProgress | DeployStatus::Canceling
        ),
        status,
        success: matches!(status, DeployStatus::Succeeded | DeployStatus::SucceededPartial),
        check_only: false,
        error_message: None,
        state_detail: None,
        number_components_deployed: 1,
        number_component_errors: 0,
        number_components_total: 1,
        number_tests_completed: 0,
        number_test_errors: 0,
        number_tests_total: 0,
        component_failures: vec![],
        component_successes: vec![],
        test_failures: vec![],
    }
}

/// Base64 archive holding `unpackaged/classes/Foo.cls`.
pub(crate) fn sample_zip() -> String {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("unpackaged/package.xml", options).unwrap();
    zip.write_all(b"<Package/>").unwrap();
    zip.start_file("unpackaged/classes/Foo.cls", options).unwrap();
    zip.write_all(b"public class Foo {}").unwrap();
    general_purpose::STANDARD.encode(zip.finish().unwrap().into_inner())
}

/// Replays queued results; the last one repeats forever.
#[derive(Default)]
pub(crate) struct MockTransport {
    retrieve_results: Mutex<VecDeque<RetrieveResult>>,
    deploy_results: Mutex<VecDeque<DeployResult>>,
    list_response: Mutex<Option<ListMetadataResponse>>,
    fail_checks: bool,
    submissions: AtomicUsize,
    checks: AtomicUsize,
    pub(crate) retrieve_requests: Mutex<Vec<RetrieveRequest>>,
    pub(crate) list_queries: Mutex<Vec<(ListQuery, Option<String>)>>,
}

fn next<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

impl MockTransport {
    pub(crate) fn with_retrieve_results(results: Vec<RetrieveResult>) -> Self {
        Self {
            retrieve_results: Mutex::new(results.into()),
            ..Default::default()
        }
    }

    pub(crate) fn with_retrieve_statuses(statuses: Vec<RetrieveStatus>) -> Self {
        Self::with_retrieve_results(
            statuses
                .into_iter()
                .map(|s| retrieve_status(s, None))
                .collect(),
        )
    }

    pub(crate) fn with_deploy_statuses(statuses: Vec<DeployStatus>) -> Self {
        Self {
            deploy_results: Mutex::new(statuses.into_iter().map(deploy_status).collect()),
            ..Default::default()
        }
    }

    pub(crate) fn with_list_response(response: ListMetadataResponse) -> Self {
        Self {
            list_response: Mutex::new(Some(response)),
            ..Default::default()
        }
    }

    pub(crate) fn failing_checks() -> Self {
        Self {
            fail_checks: true,
            ..Default::default()
        }
    }

    pub(crate) fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub(crate) fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> busbar_sf_metadata::Result<()> {
        if self.fail_checks {
            return Err(busbar_sf_metadata::Error::new(ErrorKind::Http(
                "503 Service Unavailable".to_string(),
            )));
        }
        Ok(())
    }
}

fn exhausted(what: &str) -> busbar_sf_metadata::Error {
    busbar_sf_metadata::Error::new(ErrorKind::InvalidResponse(format!("no scripted {}", what)))
}

#[async_trait]
impl MetadataTransport for MockTransport {
    async fn submit_retrieve(
        &self,
        request: &RetrieveRequest,
    ) -> busbar_sf_metadata::Result<String> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.retrieve_requests.lock().unwrap().push(request.clone());
        Ok(RETRIEVE_ID.to_string())
    }

    async fn check_retrieve(&self, _id: &str) -> busbar_sf_metadata::Result<RetrieveResult> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        next(&self.retrieve_results).ok_or_else(|| exhausted("retrieve result"))
    }

    async fn submit_deploy(
        &self,
        _zip: &[u8],
        _options: &DeployOptions,
    ) -> busbar_sf_metadata::Result<String> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(DEPLOY_ID.to_string())
    }

    async fn check_deploy(&self, _id: &str) -> busbar_sf_metadata::Result<DeployResult> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        next(&self.deploy_results).ok_or_else(|| exhausted("deploy result"))
    }

    async fn list_metadata(
        &self,
        query: &ListQuery,
        as_of_version: Option<&str>,
    ) -> busbar_sf_metadata::Result<ListMetadataResponse> {
        self.list_queries
            .lock()
            .unwrap()
            .push((query.clone(), as_of_version.map(str::to_string)));
        self.list_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| exhausted("list response"))
    }
}
