//! Parser types shared across the transcript pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Result of parsing a transcript log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// Ordered conversation turns (input order, 1-based indices)
    pub turns: Vec<Turn>,

    /// Aggregated session metadata
    pub summary: SessionSummary,

    /// Lines that could not be parsed
    pub diagnostics: Vec<LineDiagnostic>,
}

/// One rendered conversational exchange unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Sequence number, 1-based, assigned in emission order
    pub index: usize,

    /// Normalized role label (User, Assistant, System, ...)
    pub role: String,

    /// Timestamp of the originating event, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Rendered body text (never empty)
    pub body: String,
}

/// A line that failed to parse, reported but never fatal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDiagnostic {
    /// 1-based line number in the input
    pub line: usize,

    /// Decode error text
    pub error: String,
}

/// Session metadata accumulated over one parse pass
///
/// Set- and map-valued fields use ordered collections so the renderer can
/// iterate them deterministically without a separate sort step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Earliest timestamp string observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<String>,

    /// Latest timestamp string observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,

    /// Distinct session identifiers
    pub session_ids: BTreeSet<String>,

    /// Distinct model names
    pub models: BTreeSet<String>,

    /// Distinct client versions
    pub versions: BTreeSet<String>,

    /// Distinct working directories
    pub cwd_values: BTreeSet<String>,

    /// Distinct git branches
    pub branches: BTreeSet<String>,

    /// Emitted turn count per normalized role
    pub role_counts: BTreeMap<String, u64>,

    /// Summed usage counters keyed by dotted path (e.g. "cache.read")
    pub usage_totals: BTreeMap<String, i64>,

    /// Number of messages that carried a usage payload
    pub usage_records: u64,
}

impl SessionSummary {
    /// Track lexical min/max over timestamp strings.
    ///
    /// Byte-wise comparison, no date parsing. This assumes all timestamps in
    /// one log share the same zero-padded ISO-8601 format and timezone.
    pub fn observe_timestamp(&mut self, timestamp: &str) {
        match &self.first_timestamp {
            Some(first) if timestamp >= first.as_str() => {}
            _ => self.first_timestamp = Some(timestamp.to_string()),
        }
        match &self.last_timestamp {
            Some(last) if timestamp <= last.as_str() => {}
            _ => self.last_timestamp = Some(timestamp.to_string()),
        }
    }

    /// Sum a usage payload into the dotted-path totals.
    ///
    /// Counts one record per call regardless of whether any integer leaves
    /// were found.
    pub fn record_usage(&mut self, usage: &Value) {
        self.usage_records += 1;
        self.add_usage("", usage);
    }

    fn add_usage(&mut self, prefix: &str, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, nested) in map {
                    let next = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    self.add_usage(&next, nested);
                }
            }
            // Booleans are not counters; other non-integer leaves are skipped.
            Value::Bool(_) => {}
            other => {
                if let Some(n) = other.as_i64() {
                    *self.usage_totals.entry(prefix.to_string()).or_insert(0) += n;
                }
            }
        }
    }
}
