//! Transcript stream parsing
//!
//! Reads a session log line by line, extracts conversation turns and session
//! metadata, and reports malformed lines without aborting the run. One line
//! is fully processed before the next is read; all state is owned by the
//! single parse invocation.

use super::content::render_content;
use super::filter::ToolFilter;
use super::types::{LineDiagnostic, ParseOutcome, SessionSummary, Turn};
use crate::error::{Result, TranscriptError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

/// Options controlling content filtering during a parse
#[derive(Debug, Clone, Default)]
pub struct TranscriptOptions {
    /// Include hidden thinking blocks
    pub include_thinking: bool,

    /// Include tool use/result entries
    pub include_tools: bool,

    /// Tools to drop when tools are included
    pub exclude_tools: Vec<String>,

    /// Restrict tool output to these tools only
    pub only_tools: Vec<String>,
}

/// Parse a transcript from any buffered reader.
///
/// Blank lines are skipped. A line that is not valid JSON becomes a
/// [`LineDiagnostic`] (1-based line number) and the run continues; only an
/// unreadable input stream is fatal.
pub fn parse_transcript<R: BufRead>(reader: R, options: &TranscriptOptions) -> Result<ParseOutcome> {
    let mut turns: Vec<Turn> = Vec::new();
    let mut summary = SessionSummary::default();
    let mut diagnostics: Vec<LineDiagnostic> = Vec::new();
    let mut tools = ToolFilter::new(
        options.include_tools,
        &options.only_tools,
        &options.exclude_tools,
    );

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let event: Value = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Skipping invalid JSON line {}: {}", line_no, e);
                diagnostics.push(LineDiagnostic {
                    line: line_no,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if let Some(timestamp) = event.get("timestamp").and_then(Value::as_str) {
            summary.observe_timestamp(timestamp);
        }
        collect_field(&event, "sessionId", &mut summary.session_ids);
        collect_field(&event, "version", &mut summary.versions);
        collect_field(&event, "cwd", &mut summary.cwd_values);
        collect_field(&event, "gitBranch", &mut summary.branches);

        let event_type = event.get("type").and_then(Value::as_str).unwrap_or("");
        if event_type != "user" && event_type != "assistant" {
            continue;
        }
        let Some(message) = event.get("message").filter(|m| m.is_object()) else {
            continue;
        };

        if let Some(model) = message.get("model").and_then(Value::as_str) {
            if !model.is_empty() {
                summary.models.insert(model.to_string());
            }
        }
        // Usage is summed whether or not the turn survives filtering.
        if let Some(usage) = message.get("usage").filter(|u| u.is_object()) {
            summary.record_usage(usage);
        }

        let role = normalize_role(message.get("role").and_then(Value::as_str), event_type);
        let body = match message.get("content") {
            Some(content) => render_content(content, options.include_thinking, &mut tools),
            None => String::new(),
        };
        if body.is_empty() {
            continue;
        }

        *summary.role_counts.entry(role.clone()).or_insert(0) += 1;
        let timestamp = event
            .get("timestamp")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                message
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .map(|s| s.to_string());
        turns.push(Turn {
            index: turns.len() + 1,
            role,
            timestamp,
            body,
        });
    }

    tracing::debug!(
        "Parsed {} turns ({} lines skipped)",
        turns.len(),
        diagnostics.len()
    );

    Ok(ParseOutcome {
        turns,
        summary,
        diagnostics,
    })
}

/// Parse a transcript file from disk.
pub fn parse_transcript_file(path: &Path, options: &TranscriptOptions) -> Result<ParseOutcome> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranscriptError::NotFound("Input file", path.display().to_string())
        } else {
            TranscriptError::Io(e)
        }
    })?;
    parse_transcript(std::io::BufReader::new(file), options)
}

/// Normalize a declared role (falling back to the event type) to a label.
fn normalize_role(declared: Option<&str>, fallback: &str) -> String {
    let raw = declared.filter(|s| !s.is_empty()).unwrap_or(fallback);
    let raw = if raw.is_empty() { "unknown" } else { raw };
    let role = raw.trim().to_lowercase();
    match role.as_str() {
        "assistant" => "Assistant".to_string(),
        "user" => "User".to_string(),
        "system" => "System".to_string(),
        "" => "Unknown".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => "Unknown".to_string(),
            }
        }
    }
}

fn collect_field(event: &Value, key: &str, set: &mut BTreeSet<String>) {
    if let Some(value) = event.get(key).and_then(Value::as_str) {
        if !value.is_empty() {
            set.insert(value.to_string());
        }
    }
}
