//! Flag handling in the `sf-source` binary.

use super::common::{project, run_cli};
use wiremock::MockServer;

#[tokio::test]
async fn test_conflicting_inputs_fail_before_any_request() {
    let server = MockServer::start().await;
    let (dir, _project) = project();

    let output = run_cli(
        dir.path(),
        &server.uri(),
        &["retrieve", "--sourcepath", "foo", "--manifest", "bar.xml"],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--sourcepath, --manifest"), "{}", stderr);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_conflicting_inputs_json_error() {
    let server = MockServer::start().await;
    let (dir, _project) = project();

    let output = run_cli(
        dir.path(),
        &server.uri(),
        &["deploy", "-p", "force-app", "-m", "ApexClass", "--json"],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["status"], 1);
    assert_eq!(envelope["name"], "ConflictingInputError");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_input_names_accepted_flags() {
    let server = MockServer::start().await;
    let (dir, _project) = project();

    let output = run_cli(dir.path(), &server.uri(), &["retrieve"]).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--sourcepath"));
    assert!(stderr.contains("--packagenames"));
}

#[tokio::test]
async fn test_wait_below_minimum_is_rejected() {
    let server = MockServer::start().await;
    let (dir, _project) = project();

    let output = run_cli(
        dir.path(),
        &server.uri(),
        &["retrieve", "-m", "ApexClass", "--wait", "0"],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(server.received_requests().await.unwrap().is_empty());
}
