//! Result files, JSON envelopes and human-readable tables.

use std::path::Path;

use busbar_sf_metadata::FileProperties;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::classify::Classification;
use crate::error::{Error, ErrorKind, Result};
use crate::operation::{DeployOutcome, OperationHandle, OperationResult, RetrieveOutcome};

/// Serialize `value` as 2-space JSON into `path`, creating parent
/// directories. Returns the message to show instead of the usual output.
pub fn write_result_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    std::fs::write(path, body)?;

    let message = format!("Wrote result file to {}.", path.display());
    info!(path = %path.display(), "{}", message);
    Ok(message)
}

/// The `--json` envelope for a successful command.
pub fn json_envelope<T: Serialize + ?Sized>(status: i32, result: &T) -> Result<Value> {
    Ok(json!({
        "status": status,
        "result": serde_json::to_value(result)?,
    }))
}

fn error_name(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ConflictingInput { .. } => "ConflictingInputError",
        ErrorKind::NoInput { .. } => "NoInputError",
        ErrorKind::InvalidWait(_) => "InvalidWaitError",
        ErrorKind::Config(_) => "ConfigError",
        ErrorKind::Project(_) => "ProjectError",
        ErrorKind::Build(_) => "BuildError",
        ErrorKind::Hook { .. } => "HookError",
        ErrorKind::Remote(_) => "RemoteSubmissionError",
        ErrorKind::Timeout { .. } => "TimeoutError",
        ErrorKind::Org(_) => "TargetOrgError",
        ErrorKind::Archive(_) => "ArchiveError",
        ErrorKind::Io(_) => "IoError",
        ErrorKind::Json(_) => "JsonError",
    }
}

/// The `--json` envelope for a failed command. Timeouts keep their handle
/// under `result`.
pub fn error_envelope(err: &Error) -> Value {
    let mut envelope = json!({
        "status": 1,
        "name": error_name(&err.kind),
        "message": err.to_string(),
    });
    if let Some(handle) = err.timed_out_handle() {
        if let Ok(result) = serde_json::to_value(&handle.result) {
            envelope["result"] = result;
        }
    }
    envelope
}

/// Human output for `list`.
pub fn render_list(
    records: &[FileProperties],
    metadata_type: &str,
    username: &str,
) -> Result<String> {
    if records.is_empty() {
        return Ok(format!(
            "No metadata found for type: {} in org: {}.",
            metadata_type, username
        ));
    }
    Ok(serde_json::to_string_pretty(records)?)
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rules: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    let mut out = vec![
        line(headers.to_vec()),
        line(rules.iter().map(String::as_str).collect()),
    ];
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

fn render_retrieve(outcome: &RetrieveOutcome) -> String {
    let mut sections = Vec::new();
    if outcome.inbound_files.is_empty() {
        sections.push("No results found".to_string());
    } else {
        let rows: Vec<Vec<String>> = outcome
            .inbound_files
            .iter()
            .map(|f| vec![f.full_name.clone(), f.component_type.clone(), f.file_path.clone()])
            .collect();
        sections.push(format!(
            "=== Retrieved Source\n{}",
            table(&["FULL NAME", "TYPE", "PROJECT PATH"], &rows)
        ));
    }

    if !outcome.messages.is_empty() {
        let rows: Vec<Vec<String>> = outcome
            .messages
            .iter()
            .map(|m| vec![m.file_name.clone(), m.problem.clone()])
            .collect();
        sections.push(format!(
            "=== Retrieve Warnings\n{}",
            table(&["FILE NAME", "PROBLEM"], &rows)
        ));
    }
    if let Some(message) = &outcome.error_message {
        sections.push(format!("Error: {}", message));
    }
    sections.join("\n\n")
}

fn render_deploy(outcome: &DeployOutcome) -> String {
    let mut sections = Vec::new();
    if !outcome.component_successes.is_empty() {
        let rows: Vec<Vec<String>> = outcome
            .component_successes
            .iter()
            .filter(|m| m.full_name.as_deref() != Some("package.xml"))
            .map(|m| {
                vec![
                    m.full_name.clone().unwrap_or_default(),
                    m.component_type.clone().unwrap_or_default(),
                    m.file_name.clone().unwrap_or_default(),
                ]
            })
            .collect();
        let title = if outcome.check_only {
            "=== Validated Source"
        } else {
            "=== Deployed Source"
        };
        sections.push(format!(
            "{}\n{}",
            title,
            table(&["FULL NAME", "TYPE", "PROJECT PATH"], &rows)
        ));
    }

    if !outcome.component_failures.is_empty() {
        let rows: Vec<Vec<String>> = outcome
            .component_failures
            .iter()
            .map(|m| {
                let location = match (m.line_number, m.column_number) {
                    (Some(line), Some(column)) => format!(" ({}:{})", line, column),
                    _ => String::new(),
                };
                vec![
                    m.problem_type.clone().unwrap_or_else(|| "Error".to_string()),
                    m.full_name.clone().unwrap_or_default(),
                    format!("{}{}", m.problem.clone().unwrap_or_default(), location),
                ]
            })
            .collect();
        sections.push(format!(
            "=== Component Failures [{}]\n{}",
            rows.len(),
            table(&["TYPE", "NAME", "PROBLEM"], &rows)
        ));
    }

    if !outcome.test_failures.is_empty() {
        let rows: Vec<Vec<String>> = outcome
            .test_failures
            .iter()
            .map(|t| {
                vec![
                    format!(
                        "{}.{}",
                        t.name.as_deref().unwrap_or_default(),
                        t.method_name.as_deref().unwrap_or_default()
                    ),
                    t.message.clone().unwrap_or_default(),
                ]
            })
            .collect();
        sections.push(format!(
            "=== Test Failures [{}]\n{}",
            rows.len(),
            table(&["TEST", "MESSAGE"], &rows)
        ));
    }

    if let Some(message) = &outcome.error_message {
        sections.push(format!("Error: {}", message));
    }
    if sections.is_empty() {
        sections.push("No results found".to_string());
    }
    sections.join("\n\n")
}

/// Human output for a finished retrieve or deploy.
pub fn render_outcome(classification: Classification, handle: &OperationHandle) -> String {
    let body = match &handle.result {
        OperationResult::Retrieve(outcome) => render_retrieve(outcome),
        OperationResult::Deploy(outcome) => render_deploy(outcome),
    };
    match classification {
        Classification::PartialSuccess => format!(
            "{}\n\nThe {} {} completed with partial success.",
            body, handle.kind, handle.id
        ),
        Classification::Failure => format!(
            "{}\n\nThe {} {} finished with status {:?}.",
            body, handle.kind, handle.id, handle.status
        ),
        _ => body,
    }
}
