//! String-level extraction for Metadata API SOAP responses.
//!
//! Responses are small and flat enough that scanning for tags is simpler
//! than a full deserializer. Tag matching ignores namespace prefixes, so
//! `<sf:id>`, `<met:id>` and `<id>` are all found by `id`.

use busbar_sf_client::security::xml;

use crate::deploy::{DeployMessage, DeployResult, DeployStatus, TestFailure};
use crate::error::{Error, ErrorKind, Result};
use crate::list::ListMetadataResponse;
use crate::retrieve::{RetrieveMessage, RetrieveResult, RetrieveStatus};
use crate::types::{FileProperties, SoapFault};

/// Byte offsets of one element occurrence.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    content_start: usize,
    content_end: usize,
    end: usize,
}

/// Name of the tag starting right after a `<`, with any prefix removed.
fn local_name(rest: &str) -> &str {
    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    let name = &rest[..name_end];
    name.rsplit(':').next().unwrap_or(name)
}

/// Find the next `tag` element at or after `from`. Nested elements with the
/// same name are balanced.
fn find_span(doc: &str, tag: &str, from: usize) -> Option<Span> {
    let mut pos = from;
    let (start, content_start) = loop {
        let lt = pos + doc.get(pos..)?.find('<')?;
        let rest = &doc[lt + 1..];
        if !rest.starts_with(&['/', '?', '!'][..]) && local_name(rest) == tag {
            let gt = lt + doc[lt..].find('>')?;
            if doc[..gt].ends_with('/') {
                return Some(Span {
                    start: lt,
                    content_start: gt + 1,
                    content_end: gt + 1,
                    end: gt + 1,
                });
            }
            break (lt, gt + 1);
        }
        pos = lt + 1;
    };

    let mut depth = 1usize;
    let mut pos = content_start;
    loop {
        let lt = pos + doc[pos..].find('<')?;
        let rest = &doc[lt + 1..];
        let gt = lt + doc[lt..].find('>')?;
        if let Some(closing) = rest.strip_prefix('/') {
            if local_name(closing) == tag {
                depth -= 1;
                if depth == 0 {
                    return Some(Span {
                        start,
                        content_start,
                        content_end: lt,
                        end: gt + 1,
                    });
                }
            }
        } else if !rest.starts_with(&['?', '!'][..])
            && local_name(rest) == tag
            && !doc[..gt].ends_with('/')
        {
            depth += 1;
        }
        pos = gt + 1;
    }
}

/// Text of the first `tag` element, unescaped.
pub(crate) fn element(doc: &str, tag: &str) -> Option<String> {
    find_span(doc, tag, 0).map(|s| xml::unescape(doc[s.content_start..s.content_end].trim()))
}

/// Raw inner markup of every `tag` element, in document order.
pub(crate) fn blocks<'a>(doc: &'a str, tag: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(span) = find_span(doc, tag, pos) {
        out.push(&doc[span.content_start..span.content_end]);
        pos = span.end;
    }
    out
}

/// Copy of `doc` with every element named in `tags` cut out.
///
/// Needed before reading top-level fields: nested records reuse names such
/// as `id` and `success`.
pub(crate) fn without_blocks(doc: &str, tags: &[&str]) -> String {
    let mut out = doc.to_string();
    for tag in tags {
        while let Some(span) = find_span(&out, tag, 0) {
            out.replace_range(span.start..span.end, "");
        }
    }
    out
}

fn flag(doc: &str, tag: &str) -> bool {
    element(doc, tag).is_some_and(|v| v == "true")
}

fn number(doc: &str, tag: &str) -> u32 {
    element(doc, tag).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn non_empty(doc: &str, tag: &str) -> Option<String> {
    element(doc, tag).filter(|v| !v.is_empty())
}

fn result_block(doc: &str) -> Result<&str> {
    blocks(doc, "result").into_iter().next().ok_or_else(|| {
        Error::new(ErrorKind::InvalidResponse(
            "response has no <result> element".to_string(),
        ))
    })
}

/// Parse a SOAP fault from the response.
pub(crate) fn parse_soap_fault(doc: &str) -> Option<SoapFault> {
    if !doc.contains("faultcode") {
        return None;
    }

    let fault_code = element(doc, "faultcode")?;
    let fault_string = element(doc, "faultstring").unwrap_or_else(|| "Unknown error".to_string());

    Some(SoapFault {
        fault_code,
        fault_string,
    })
}

/// Async process id returned by `retrieve` and `deploy`.
pub(crate) fn parse_async_id(doc: &str, operation: &str) -> Result<String> {
    let result = result_block(doc)?;
    non_empty(result, "id").ok_or_else(|| {
        Error::new(ErrorKind::InvalidResponse(format!(
            "No async process ID in {} response",
            operation
        )))
    })
}

pub(crate) fn parse_file_properties(block: &str) -> FileProperties {
    FileProperties {
        created_by_id: element(block, "createdById").unwrap_or_default(),
        created_by_name: element(block, "createdByName").unwrap_or_default(),
        created_date: element(block, "createdDate").unwrap_or_default(),
        file_name: element(block, "fileName").unwrap_or_default(),
        full_name: element(block, "fullName").unwrap_or_default(),
        id: element(block, "id").unwrap_or_default(),
        last_modified_by_id: element(block, "lastModifiedById").unwrap_or_default(),
        last_modified_by_name: element(block, "lastModifiedByName").unwrap_or_default(),
        last_modified_date: element(block, "lastModifiedDate").unwrap_or_default(),
        manageable_state: non_empty(block, "manageableState"),
        namespace_prefix: non_empty(block, "namespacePrefix"),
        component_type: element(block, "type").unwrap_or_default(),
    }
}

/// Parse a `checkRetrieveStatus` response.
pub(crate) fn parse_retrieve_result(doc: &str) -> Result<RetrieveResult> {
    let result = result_block(doc)?;
    let top = without_blocks(result, &["fileProperties", "messages"]);

    let id = non_empty(&top, "id")
        .ok_or_else(|| Error::new(ErrorKind::InvalidResponse("Missing id".to_string())))?;

    let status_str = element(&top, "status").unwrap_or_else(|| "Pending".to_string());
    let status: RetrieveStatus = status_str
        .parse()
        .map_err(|e: String| Error::new(ErrorKind::InvalidResponse(e)))?;

    let file_properties = blocks(result, "fileProperties")
        .into_iter()
        .map(parse_file_properties)
        .collect();

    let messages = blocks(result, "messages")
        .into_iter()
        .map(|block| RetrieveMessage {
            file_name: element(block, "fileName").unwrap_or_default(),
            problem: element(block, "problem").unwrap_or_default(),
        })
        .collect();

    Ok(RetrieveResult {
        id,
        done: flag(&top, "done"),
        status,
        success: flag(&top, "success"),
        error_message: non_empty(&top, "errorMessage"),
        error_status_code: non_empty(&top, "errorStatusCode"),
        zip_file: non_empty(&top, "zipFile"),
        file_properties,
        messages,
    })
}

fn parse_deploy_message(block: &str) -> DeployMessage {
    DeployMessage {
        component_type: non_empty(block, "componentType"),
        file_name: non_empty(block, "fileName"),
        full_name: non_empty(block, "fullName"),
        line_number: element(block, "lineNumber").and_then(|v| v.parse().ok()),
        column_number: element(block, "columnNumber").and_then(|v| v.parse().ok()),
        problem: non_empty(block, "problem"),
        problem_type: non_empty(block, "problemType"),
        created: flag(block, "created"),
        changed: flag(block, "changed"),
        deleted: flag(block, "deleted"),
        success: flag(block, "success"),
    }
}

fn parse_test_failure(block: &str) -> TestFailure {
    TestFailure {
        name: non_empty(block, "name"),
        method_name: non_empty(block, "methodName"),
        message: non_empty(block, "message"),
        stack_trace: non_empty(block, "stackTrace"),
    }
}

/// Parse a `checkDeployStatus` response.
pub(crate) fn parse_deploy_result(doc: &str) -> Result<DeployResult> {
    let result = result_block(doc)?;
    let top = without_blocks(result, &["details"]);
    let details = blocks(result, "details").into_iter().next().unwrap_or("");

    let id = non_empty(&top, "id")
        .ok_or_else(|| Error::new(ErrorKind::InvalidResponse("Missing id".to_string())))?;

    let status_str = element(&top, "status").unwrap_or_else(|| "Pending".to_string());
    let status: DeployStatus = status_str
        .parse()
        .map_err(|e: String| Error::new(ErrorKind::InvalidResponse(e)))?;

    let test_failures = blocks(details, "runTestResult")
        .into_iter()
        .flat_map(|run| blocks(run, "failures"))
        .map(parse_test_failure)
        .collect();

    Ok(DeployResult {
        id,
        done: flag(&top, "done"),
        status,
        success: flag(&top, "success"),
        check_only: flag(&top, "checkOnly"),
        error_message: non_empty(&top, "errorMessage"),
        state_detail: non_empty(&top, "stateDetail"),
        number_components_deployed: number(&top, "numberComponentsDeployed"),
        number_component_errors: number(&top, "numberComponentErrors"),
        number_components_total: number(&top, "numberComponentsTotal"),
        number_tests_completed: number(&top, "numberTestsCompleted"),
        number_test_errors: number(&top, "numberTestErrors"),
        number_tests_total: number(&top, "numberTestsTotal"),
        component_failures: blocks(details, "componentFailures")
            .into_iter()
            .map(parse_deploy_message)
            .collect(),
        component_successes: blocks(details, "componentSuccesses")
            .into_iter()
            .map(parse_deploy_message)
            .collect(),
        test_failures,
    })
}

/// Parse a `listMetadata` response into its raw shape.
pub(crate) fn parse_list_metadata(doc: &str) -> ListMetadataResponse {
    let records = blocks(doc, "result")
        .into_iter()
        .map(parse_file_properties)
        .collect();
    ListMetadataResponse::from_records(records)
}
