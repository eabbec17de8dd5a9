//! `deploy` end to end.

use super::common::{project, run_cli, soap};
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOY_ID: &str = "0Afxx0000000042";

async fn mount_deploy(server: &MockServer, status_body: &str) {
    Mock::given(method("POST"))
        .and(header("soapaction", "deploy"))
        .and(body_string_contains("<ZipFile>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap(&format!(
            "<deployResponse><result><done>false</done><id>{}</id>\
             <state>Queued</state></result></deployResponse>",
            DEPLOY_ID
        ))))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(header("soapaction", "checkDeployStatus"))
        .and(body_string_contains(DEPLOY_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap(status_body)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_partial_success_exit_code() {
    let server = MockServer::start().await;
    mount_deploy(
        &server,
        &format!(
            "<checkDeployStatusResponse><result><done>true</done><id>{}</id>\
             <status>SucceededPartial</status><success>true</success>\
             <numberComponentsDeployed>1</numberComponentsDeployed>\
             <numberComponentErrors>1</numberComponentErrors>\
             <numberComponentsTotal>2</numberComponentsTotal>\
             <details><componentFailures><componentType>ApexClass</componentType>\
             <fullName>Bar</fullName><problem>Invalid type: Baz</problem>\
             <problemType>Error</problemType><lineNumber>4</lineNumber>\
             <columnNumber>9</columnNumber><success>false</success></componentFailures>\
             <componentSuccesses><componentType>ApexClass</componentType>\
             <fileName>classes/Foo.cls</fileName><fullName>Foo</fullName>\
             <success>true</success><changed>true</changed></componentSuccesses></details>\
             </result></checkDeployStatusResponse>",
            DEPLOY_ID
        ),
    )
    .await;
    let (dir, _project) = project();

    let output = run_cli(dir.path(), &server.uri(), &["deploy", "-p", "force-app"]).await;

    assert_eq!(output.status.code(), Some(68), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Deployed Source"));
    assert!(stdout.contains("=== Component Failures [1]"));
    assert!(stdout.contains("Invalid type: Baz (4:9)"));
    assert!(stdout.contains("completed with partial success"));
}

#[tokio::test]
async fn test_failed_deploy_json() {
    let server = MockServer::start().await;
    mount_deploy(
        &server,
        &format!(
            "<checkDeployStatusResponse><result><done>true</done><id>{}</id>\
             <status>Failed</status><success>false</success>\
             <errorMessage>Deploy failed</errorMessage>\
             </result></checkDeployStatusResponse>",
            DEPLOY_ID
        ),
    )
    .await;
    let (dir, _project) = project();

    let output = run_cli(
        dir.path(),
        &server.uri(),
        &["deploy", "-m", "ApexClass", "-l", "RunLocalTests", "--json"],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["status"], 1);
    assert_eq!(envelope["result"]["status"], "Failed");
    assert_eq!(envelope["result"]["errorMessage"], "Deploy failed");

    let requests = server.received_requests().await.unwrap();
    let submit = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(submit.contains("<testLevel>RunLocalTests</testLevel>"));
}
