//! Content normalization
//!
//! Converts a message's raw content value of unknown shape (plain string,
//! content-block array, single block, scalar) into flat display text.

use super::filter::{normalize_tool_name, ToolFilter};
use serde_json::Value;

/// One classified content item.
///
/// The `type` tag is inspected exactly once here; unrecognized shapes fall
/// through to an explicit fallback variant instead of ad-hoc branching at
/// render time.
#[derive(Debug)]
pub enum ContentBlock<'a> {
    Text(Option<&'a Value>),
    Thinking(Option<&'a Value>),
    ToolUse {
        name: String,
        id: Option<&'a str>,
        input: Option<&'a Value>,
    },
    ToolResult {
        tool_use_id: Option<&'a str>,
        content: Option<&'a Value>,
    },
    Other(&'a Value),
}

impl<'a> ContentBlock<'a> {
    /// Classify a single content item by its `type` tag.
    pub fn classify(item: &'a Value) -> ContentBlock<'a> {
        match item.get("type").and_then(Value::as_str) {
            Some("text") => ContentBlock::Text(item.get("text")),
            Some("thinking") => ContentBlock::Thinking(item.get("thinking")),
            Some("tool_use") => ContentBlock::ToolUse {
                name: match item.get("name") {
                    None => "unknown_tool".to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                },
                id: item.get("id").and_then(Value::as_str),
                input: item.get("input"),
            },
            Some("tool_result") => ContentBlock::ToolResult {
                tool_use_id: item.get("tool_use_id").and_then(Value::as_str),
                content: item.get("content"),
            },
            _ => ContentBlock::Other(item),
        }
    }
}

/// Best-effort conversion of an arbitrary JSON value to plain text.
///
/// Objects honor a string `text` key, then recurse through a nested `content`
/// key, then fall back to pretty-printed JSON. Null yields the empty string.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .filter(|chunk| !chunk.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                return text.clone();
            }
            if let Some(content) = map.get("content") {
                return coerce_text(content);
            }
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

/// Render a message's content value into the turn body.
///
/// Non-empty fragments are joined with a blank line. Thinking blocks are
/// suppressed unless requested; tool blocks go through the correlator, which
/// records each id's disposition for the matching result.
pub fn render_content(content: &Value, include_thinking: bool, tools: &mut ToolFilter) -> String {
    if let Some(s) = content.as_str() {
        return s.trim().to_string();
    }
    let Some(items) = content.as_array() else {
        return coerce_text(content).trim().to_string();
    };

    let mut parts: Vec<String> = Vec::new();
    for item in items {
        if !item.is_object() {
            push_nonempty(&mut parts, coerce_text(item));
            continue;
        }

        match ContentBlock::classify(item) {
            ContentBlock::Text(text) => {
                push_nonempty(&mut parts, coerce_opt(text));
            }
            ContentBlock::Thinking(thinking) => {
                if include_thinking {
                    let thinking = coerce_opt(thinking);
                    let thinking = thinking.trim();
                    if !thinking.is_empty() {
                        parts.push(format!("```thinking\n{}\n```", thinking));
                    }
                }
            }
            ContentBlock::ToolUse { name, id, input } => {
                if tools.enabled() {
                    let name = normalize_tool_name(&name);
                    if tools.admit_use(&name, id) {
                        let rendered =
                            serde_json::to_string_pretty(input.unwrap_or(&Value::Null))
                                .unwrap_or_default();
                        parts.push(format!("```tool:{}\n{}\n```", name, rendered));
                    }
                }
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
            } => {
                if tools.enabled() && tools.admit_result(tool_use_id) {
                    let result = coerce_opt(content);
                    let result = result.trim();
                    if !result.is_empty() {
                        parts.push(format!("```tool_result\n{}\n```", result));
                    }
                }
            }
            ContentBlock::Other(value) => {
                push_nonempty(&mut parts, coerce_text(value));
            }
        }
    }

    parts.join("\n\n").trim().to_string()
}

fn coerce_opt(value: Option<&Value>) -> String {
    value.map(coerce_text).unwrap_or_default()
}

fn push_nonempty(parts: &mut Vec<String>, text: String) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}
