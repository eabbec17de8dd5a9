//! `list` against a wiremock Metadata API.

use super::common::{run_cli, soap, USERNAME};
use busbar_sf_auth::SalesforceCredentials;
use busbar_sf_client::ClientConfig;
use busbar_sf_metadata::FileProperties;
use busbar_sf_source::{commands, connect, output, ListCommand};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ONE_CLASS: &str = "<listMetadataResponse><result>\
    <createdById>005xx01</createdById><createdByName>CI User</createdByName>\
    <createdDate>2024-01-02T03:04:05.000Z</createdDate>\
    <fileName>classes/Foo.cls</fileName><fullName>Foo</fullName><id>01pxx01</id>\
    <lastModifiedById>005xx01</lastModifiedById><lastModifiedByName>CI User</lastModifiedByName>\
    <lastModifiedDate>2024-01-02T03:04:05.000Z</lastModifiedDate>\
    <manageableState>unmanaged</manageableState><type>ApexClass</type>\
    </result></listMetadataResponse>";

async fn mount_list(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/services/Soap/m/62.0"))
        .and(header("soapaction", "listMetadata"))
        .and(body_string_contains("<type>ApexClass</type>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap(body)))
        .expect(1)
        .mount(server)
        .await;
}

fn list_command() -> ListCommand {
    ListCommand {
        metadata_type: "ApexClass".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_single_record_becomes_one_element_array() {
    let server = MockServer::start().await;
    mount_list(&server, ONE_CLASS).await;

    let creds = SalesforceCredentials::new(server.uri(), "token", "62.0");
    let transport = connect(&creds, &ClientConfig::default(), None).unwrap();
    let report = commands::list(transport, &list_command()).await.unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.full_name, "Foo");
    assert_eq!(record.component_type, "ApexClass");
    assert_eq!(record.file_name, "classes/Foo.cls");
    assert_eq!(record.manageable_state.as_deref(), Some("unmanaged"));
}

#[tokio::test]
async fn test_no_matches_prints_notice() {
    let server = MockServer::start().await;
    mount_list(&server, "<listMetadataResponse/>").await;

    let creds =
        SalesforceCredentials::new(server.uri(), "token", "62.0").with_username(USERNAME);
    let transport = connect(&creds, &ClientConfig::default(), None).unwrap();
    let report = commands::list(transport, &list_command()).await.unwrap();

    assert!(report.records.is_empty());
    let notice = output::render_list(&report.records, "ApexClass", creds.display_name()).unwrap();
    assert!(notice.contains("ApexClass"));
    assert!(notice.contains(USERNAME));
}

#[tokio::test]
async fn test_cli_json_output() {
    let server = MockServer::start().await;
    mount_list(&server, ONE_CLASS).await;
    let cwd = tempfile::tempdir().unwrap();

    let output = run_cli(
        cwd.path(),
        &server.uri(),
        &["list", "--metadatatype", "ApexClass", "--json"],
    )
    .await;

    assert_eq!(output.status.code(), Some(0));
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["status"], 0);
    let records = envelope["result"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["fullName"], "Foo");
    assert_eq!(records[0]["type"], "ApexClass");
}

#[tokio::test]
async fn test_cli_empty_human_output() {
    let server = MockServer::start().await;
    mount_list(&server, "<listMetadataResponse/>").await;
    let cwd = tempfile::tempdir().unwrap();

    let output = run_cli(cwd.path(), &server.uri(), &["list", "-m", "ApexClass"]).await;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("No metadata found for type: ApexClass in org: {}.", USERNAME)
    );
}

#[tokio::test]
async fn test_cli_result_file_round_trip() {
    let server = MockServer::start().await;
    mount_list(&server, ONE_CLASS).await;
    let cwd = tempfile::tempdir().unwrap();

    let output = run_cli(
        cwd.path(),
        &server.uri(),
        &["list", "-m", "ApexClass", "-f", "out/classes.json"],
    )
    .await;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Wrote result file to out/classes.json."));

    let written = std::fs::read_to_string(cwd.path().join("out/classes.json")).unwrap();
    assert!(written.starts_with("[\n  {\n"));
    let records: Vec<FileProperties> = serde_json::from_str(&written).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].full_name, "Foo");
    assert_eq!(records[0].created_by_name, "CI User");
}
