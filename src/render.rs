//! Markdown rendering
//!
//! Serializes the aggregated session metadata as a YAML-like front-matter
//! block followed by the conversation transcript. Output is deterministic:
//! set- and map-valued fields iterate in sorted order, turns keep input order.

use crate::parser::ParseOutcome;
use std::collections::BTreeSet;

/// Render the full markdown document for one parsed transcript.
pub fn render_markdown(source: &str, outcome: &ParseOutcome) -> String {
    let mut lines: Vec<String> = Vec::new();
    let summary = &outcome.summary;
    let turns = &outcome.turns;

    lines.push("---".to_string());
    lines.push(format!("source: {}", quote(source)));
    lines.push(format!("messages: {}", turns.len()));
    if let Some(first) = summary.first_timestamp.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("first_timestamp: {}", quote(first)));
    }
    if let Some(last) = summary.last_timestamp.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("last_timestamp: {}", quote(last)));
    }

    push_list(&mut lines, "session_ids", &summary.session_ids);
    push_list(&mut lines, "models", &summary.models);
    push_list(&mut lines, "versions", &summary.versions);
    push_list(&mut lines, "cwd", &summary.cwd_values);
    push_list(&mut lines, "git_branches", &summary.branches);

    lines.push("role_counts:".to_string());
    for (role, count) in &summary.role_counts {
        lines.push(format!("  {}: {}", role, count));
    }

    if !summary.usage_totals.is_empty() || summary.usage_records > 0 {
        lines.push("usage:".to_string());
        lines.push(format!("  records: {}", summary.usage_records));
        for (key, total) in &summary.usage_totals {
            lines.push(format!("  {}: {}", key, total));
        }
    }
    lines.push("---".to_string());
    lines.push(String::new());

    lines.push("# Conversation".to_string());
    lines.push(String::new());
    lines.push(format!("- Source: `{}`", source));
    lines.push(format!("- Messages: {}", turns.len()));
    lines.push(String::new());

    for turn in turns {
        let mut title = format!("## {}. {}", turn.index, turn.role);
        if let Some(timestamp) = turn.timestamp.as_deref().filter(|s| !s.is_empty()) {
            title.push_str(&format!(" ({})", timestamp));
        }
        lines.push(title);
        lines.push(String::new());
        lines.push(turn.body.clone());
        lines.push(String::new());
    }

    let doc = lines.join("\n");
    format!("{}\n", doc.trim_end())
}

/// Double-quote a front-matter value, escaping backslashes and quotes.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn push_list(lines: &mut Vec<String>, label: &str, values: &BTreeSet<String>) {
    if values.is_empty() {
        return;
    }
    lines.push(format!("{}:", label));
    for value in values {
        lines.push(format!("  - {}", quote(value)));
    }
}
