//! `retrieve` end to end.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::common::{project, retrieve_zip, run_cli, soap, StuckRetrieve, USERNAME};
use busbar_sf_auth::SalesforceCredentials;
use busbar_sf_client::ClientConfig;
use busbar_sf_source::{
    commands, connect, ErrorKind, Lifecycle, OperationStatus, RetrieveCommand, SourceContext,
    WaitBudget,
};
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RETRIEVE_ID: &str = "09Sxx0000000042";

async fn mount_successful_retrieve(server: &MockServer, zip: &str) {
    Mock::given(method("POST"))
        .and(header("soapaction", "retrieve"))
        .and(body_string_contains("<members>Foo</members>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap(&format!(
            "<retrieveResponse><result><done>false</done><id>{}</id>\
             <state>Queued</state></result></retrieveResponse>",
            RETRIEVE_ID
        ))))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(header("soapaction", "checkRetrieveStatus"))
        .and(body_string_contains(RETRIEVE_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap(&format!(
            "<checkRetrieveStatusResponse><result><done>true</done>\
             <fileProperties><fileName>unpackaged/classes/Foo.cls</fileName>\
             <fullName>Foo</fullName><id>01pxx01</id><type>ApexClass</type></fileProperties>\
             <fileProperties><fileName>unpackaged/package.xml</fileName>\
             <fullName>unpackaged/package.xml</fullName><type>Package</type></fileProperties>\
             <id>{}</id><status>Succeeded</status><success>true</success>\
             <zipFile>{}</zipFile></result></checkRetrieveStatusResponse>",
            RETRIEVE_ID, zip
        ))))
        .mount(server)
        .await;
}

fn remote_zip() -> String {
    retrieve_zip(&[
        ("unpackaged/package.xml", "<Package/>"),
        ("unpackaged/classes/Foo.cls", "public class Foo { Integer remote; }"),
        ("unpackaged/classes/Foo.cls-meta.xml", "<ApexClass/>"),
    ])
}

/// `retrieve --metadata ApexClass --wait 1` against a job that never
/// finishes.
#[tokio::test(start_paused = true)]
async fn test_never_finishing_retrieve_times_out() {
    let (_dir, project) = project();
    let transport = Arc::new(StuckRetrieve::default());
    let context = SourceContext::new(project, transport.clone(), USERNAME)
        .with_lifecycle(Lifecycle::new())
        .with_poll_interval(Duration::from_secs(5));

    let mut command = RetrieveCommand {
        wait: WaitBudget::from_minutes(1).unwrap(),
        ..Default::default()
    };
    command.input.metadata = vec!["ApexClass".to_string()];

    let started = tokio::time::Instant::now();
    let err = commands::retrieve(&context, &command).await.unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Timeout { minutes: 1, .. }));
    assert!(err.to_string().contains('1'));
    assert_eq!(err.timed_out_handle().unwrap().status, OperationStatus::InProgress);
    assert!(started.elapsed() >= Duration::from_secs(60));
    assert!(started.elapsed() < Duration::from_secs(65));
    assert_eq!(transport.submissions.load(Ordering::SeqCst), 1);
    assert_eq!(transport.checks.load(Ordering::SeqCst), 13);
    let requests = transport.requests.lock().unwrap();
    let manifest = requests[0].unpackaged.as_ref().unwrap();
    assert_eq!(manifest.members_of("ApexClass"), ["*".to_string()]);
}

#[tokio::test]
async fn test_retrieve_merges_into_default_package_directory() {
    let server = MockServer::start().await;
    mount_successful_retrieve(&server, &remote_zip()).await;
    let (dir, project) = project();

    let creds = SalesforceCredentials::new(server.uri(), "token", "62.0");
    let transport = connect(&creds, &ClientConfig::default(), None).unwrap();
    let context = SourceContext::new(project, transport, USERNAME)
        .with_poll_interval(Duration::from_millis(10));

    let mut command = RetrieveCommand::default();
    command.input.metadata = vec!["ApexClass:Foo".to_string()];
    let outcome = commands::retrieve(&context, &command).await.unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.handle.id, RETRIEVE_ID);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("force-app/main/default/classes/Foo.cls"))
            .unwrap(),
        "public class Foo { Integer remote; }"
    );

    let result = serde_json::to_value(&outcome.handle.result).unwrap();
    assert_eq!(result["status"], "Succeeded");
    assert_eq!(result["inboundFiles"].as_array().unwrap().len(), 2);
    assert_eq!(result["inboundFiles"][0]["state"], "Changed");
    assert!(result["zipFilePath"]
        .as_str()
        .unwrap()
        .ends_with("unpackaged.zip"));

    let requests = server.received_requests().await.unwrap();
    let submit = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(submit.contains("<version>61.0</version>"));
    assert!(submit.contains("<name>ApexClass</name>"));
}

#[tokio::test]
async fn test_cli_retrieve_target_dir_json() {
    let server = MockServer::start().await;
    mount_successful_retrieve(&server, &remote_zip()).await;
    let (dir, _project) = project();

    let output = run_cli(
        dir.path(),
        &server.uri(),
        &["retrieve", "-m", "ApexClass:Foo", "-r", "mdapi", "--json"],
    )
    .await;

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["status"], 0);
    assert_eq!(envelope["result"]["id"], RETRIEVE_ID);
    assert!(dir.path().join("mdapi/unpackaged/package.xml").exists());
    assert!(dir.path().join("mdapi/unpackaged/classes/Foo.cls").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("force-app/main/default/classes/Foo.cls"))
            .unwrap(),
        "public class Foo {}"
    );
}
