//! Tool use/result filtering
//!
//! A tool invocation and its result are correlated by a shared identifier and
//! frequently land in different events, so inclusion decisions made for a
//! `tool_use` must be remembered for the whole parse run and applied to its
//! later `tool_result`.

use std::collections::{BTreeSet, HashSet};

/// Strip a leading case-insensitive `tool:` prefix and surrounding whitespace.
pub fn normalize_tool_name(name: &str) -> String {
    let trimmed = name.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 5 && bytes[..5].eq_ignore_ascii_case(b"tool:") {
        trimmed[5..].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Stateful include/exclude decisions for tool content, scoped to one parse run
#[derive(Debug, Default)]
pub struct ToolFilter {
    /// Allow-list of normalized tool names; empty means no restriction
    only: BTreeSet<String>,

    /// Deny-list of normalized tool names
    excluded: BTreeSet<String>,

    /// Whether tool content is rendered at all
    enabled: bool,

    /// Ids of tool uses that were dropped (their results drop too)
    excluded_ids: HashSet<String>,

    /// Ids of tool uses that were kept (their results survive an allow-list)
    included_ids: HashSet<String>,
}

impl ToolFilter {
    /// Build a filter from the configured tool-name lists.
    ///
    /// Naming either list implies tool inclusion even when `include_tools`
    /// was not explicitly set.
    pub fn new(include_tools: bool, only: &[String], excluded: &[String]) -> Self {
        let only: BTreeSet<String> = only
            .iter()
            .map(|name| normalize_tool_name(name))
            .filter(|name| !name.is_empty())
            .collect();
        let excluded: BTreeSet<String> = excluded
            .iter()
            .map(|name| normalize_tool_name(name))
            .filter(|name| !name.is_empty())
            .collect();
        let enabled = include_tools || !only.is_empty() || !excluded.is_empty();

        ToolFilter {
            only,
            excluded,
            enabled,
            excluded_ids: HashSet::new(),
            included_ids: HashSet::new(),
        }
    }

    /// Whether tool content is rendered at all
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Decide a `tool_use` item and record the id's disposition.
    ///
    /// The allow-list is checked before the deny-list: a name absent from a
    /// non-empty allow-list is excluded without consulting the deny-list.
    /// Callers rely on the allow-list taking priority.
    pub fn admit_use(&mut self, name: &str, id: Option<&str>) -> bool {
        if !self.only.is_empty() && !self.only.contains(name) {
            self.remember(id, false);
            return false;
        }
        if self.excluded.contains(name) {
            self.remember(id, false);
            return false;
        }
        self.remember(id, true);
        true
    }

    /// Decide a `tool_result` item by its referenced tool_use id.
    ///
    /// An id with no recorded disposition follows the active mode's default:
    /// excluded when an allow-list is active, included otherwise.
    pub fn admit_result(&self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if self.excluded_ids.contains(id) {
                return false;
            }
        }
        if !self.only.is_empty() {
            return matches!(id, Some(id) if self.included_ids.contains(id));
        }
        true
    }

    fn remember(&mut self, id: Option<&str>, included: bool) {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            if included {
                self.included_ids.insert(id.to_string());
            } else {
                self.excluded_ids.insert(id.to_string());
            }
        }
    }
}
