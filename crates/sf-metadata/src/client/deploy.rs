use base64::{engine::general_purpose, Engine as _};
use busbar_sf_client::security::xml;
use tracing::instrument;

use super::xml_helpers;
use crate::deploy::{DeployOptions, DeployResult};
use crate::error::Result;
use crate::types::TestLevel;

impl super::MetadataClient {
    /// Deploy a metadata package.
    ///
    /// The `package_zip` must be a properly structured zip file with metadata
    /// in the correct directory structure (e.g., `classes/MyClass.cls`).
    ///
    /// Returns the async process ID for tracking the deployment.
    #[instrument(skip(self, package_zip), fields(zip_bytes = package_zip.len()))]
    pub async fn deploy(&self, package_zip: &[u8], options: &DeployOptions) -> Result<String> {
        let encoded_zip = general_purpose::STANDARD.encode(package_zip);

        let run_tests_xml: String = if options.test_level == Some(TestLevel::RunSpecifiedTests) {
            options
                .run_tests
                .iter()
                .map(|t| format!("\n        <runTests>{}</runTests>", xml::escape(t)))
                .collect()
        } else {
            String::new()
        };

        let test_level_xml = options
            .test_level
            .map(|tl| format!("\n        <testLevel>{}</testLevel>", tl))
            .unwrap_or_default();

        let body = format!(
            r#"<deploy xmlns="http://soap.sforce.com/2006/04/metadata">
      <ZipFile>{zip_file}</ZipFile>
      <DeployOptions>
        <allowMissingFiles>{allow_missing}</allowMissingFiles>
        <checkOnly>{check_only}</checkOnly>
        <ignoreWarnings>{ignore_warnings}</ignoreWarnings>
        <purgeOnDelete>{purge_on_delete}</purgeOnDelete>
        <rollbackOnError>{rollback_on_error}</rollbackOnError>{run_tests}
        <singlePackage>{single_package}</singlePackage>{test_level}
      </DeployOptions>
    </deploy>"#,
            zip_file = encoded_zip,
            allow_missing = options.allow_missing_files,
            check_only = options.check_only,
            ignore_warnings = options.ignore_warnings,
            purge_on_delete = options.purge_on_delete,
            rollback_on_error = options.rollback_on_error,
            run_tests = run_tests_xml,
            single_package = options.single_package,
            test_level = test_level_xml,
        );

        let response = self.call("deploy", &body).await?;
        xml_helpers::parse_async_id(&response, "deploy")
    }

    /// Check the status of a deploy operation.
    #[instrument(skip(self))]
    pub async fn check_deploy_status(
        &self,
        async_process_id: &str,
        include_details: bool,
    ) -> Result<DeployResult> {
        let body = format!(
            r#"<checkDeployStatus xmlns="http://soap.sforce.com/2006/04/metadata">
      <asyncProcessId>{process_id}</asyncProcessId>
      <includeDetails>{include_details}</includeDetails>
    </checkDeployStatus>"#,
            process_id = xml::escape(async_process_id),
            include_details = include_details,
        );

        let response = self.call("checkDeployStatus", &body).await?;
        xml_helpers::parse_deploy_result(&response)
    }
}

#[cfg(test)]
mod tests {
    use crate::deploy::{DeployOptions, DeployStatus};
    use crate::types::TestLevel;
    use crate::MetadataClient;
    use wiremock::matchers::{body_string_contains, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_deploy_encodes_zip_and_options() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("soapaction", "deploy"))
            // base64 of "PK"
            .and(body_string_contains("<ZipFile>UEs=</ZipFile>"))
            .and(body_string_contains("<checkOnly>true</checkOnly>"))
            .and(body_string_contains("<runTests>MyTest</runTests>"))
            .and(body_string_contains("<testLevel>RunSpecifiedTests</testLevel>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<deployResponse><result><done>false</done><id>0Afxx01</id>\
                 <state>Queued</state></result></deployResponse>",
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = MetadataClient::from_parts(mock_server.uri(), "token");
        let options = DeployOptions {
            check_only: true,
            test_level: Some(TestLevel::RunSpecifiedTests),
            run_tests: vec!["MyTest".to_string()],
            ..Default::default()
        };

        let id = client.deploy(b"PK", &options).await.unwrap();
        assert_eq!(id, "0Afxx01");
    }

    #[tokio::test]
    async fn test_deploy_omits_run_tests_for_other_levels() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<deployResponse><result><id>0Afxx02</id></result></deployResponse>",
            ))
            .mount(&mock_server)
            .await;

        let client = MetadataClient::from_parts(mock_server.uri(), "token");
        let options = DeployOptions {
            test_level: Some(TestLevel::RunLocalTests),
            run_tests: vec!["Ignored".to_string()],
            ..Default::default()
        };
        client.deploy(b"PK", &options).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body).into_owned();
        assert!(!body.contains("<runTests>"));
        assert!(body.contains("<testLevel>RunLocalTests</testLevel>"));
    }

    #[tokio::test]
    async fn test_check_deploy_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("soapaction", "checkDeployStatus"))
            .and(body_string_contains("<includeDetails>true</includeDetails>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<checkDeployStatusResponse><result><done>true</done>\
                 <id>0Afxx01</id><status>Succeeded</status><success>true</success>\
                 <numberComponentsDeployed>3</numberComponentsDeployed>\
                 </result></checkDeployStatusResponse>",
            ))
            .mount(&mock_server)
            .await;

        let client = MetadataClient::from_parts(mock_server.uri(), "token");
        let result = client.check_deploy_status("0Afxx01", true).await.unwrap();

        assert_eq!(result.status, DeployStatus::Succeeded);
        assert_eq!(result.number_components_deployed, 3);
    }
}
