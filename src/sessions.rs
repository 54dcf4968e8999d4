//! Session discovery
//!
//! Lists session transcript files with activity on a target date. Two
//! layouts are scanned: project subdirectories of a Claude-style projects
//! root, and a date-partitioned Codex sessions root
//! (`<root>/YYYY/MM/DD/*.jsonl`). Lines are probed with a fast substring
//! check instead of JSON-parsing every line; a per-project
//! `sessions-index.json` narrows Claude candidates when it is usable.

use crate::error::{Result, TranscriptError};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Per-project session index, written alongside the `.jsonl` files
#[derive(Debug, Deserialize)]
struct SessionIndex {
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    session_id: Option<String>,
    created: Option<String>,
    modified: Option<String>,
}

/// List session files with activity on `date` under both roots.
///
/// `matcher`/`excluder` filter Claude project directory names and Codex
/// session working directories by case-insensitive substring. Claude and
/// Codex hits are merged and sorted. Errors when the date is not
/// `YYYY-MM-DD`, or when no Claude project roots survive filtering and the
/// Codex day directory does not exist either.
pub fn list_sessions(
    projects_root: &Path,
    codex_root: &Path,
    date: &str,
    matcher: &str,
    excluder: &str,
    include_agent: bool,
) -> Result<Vec<PathBuf>> {
    validate_date(date)?;

    let roots = discover_project_roots(projects_root, matcher, excluder)?;
    let mut hits = discover_claude_sessions(&roots, date, include_agent)?;
    hits.extend(discover_codex_sessions(codex_root, date, matcher, excluder)?);

    if hits.is_empty() && roots.is_empty() && !codex_date_dir(codex_root, date).is_dir() {
        return Err(TranscriptError::NotFound(
            "Session roots",
            format!("{} or {}", projects_root.display(), codex_root.display()),
        ));
    }

    hits.sort();
    Ok(hits)
}

/// Validate a `YYYY-MM-DD` date argument.
pub fn validate_date(value: &str) -> Result<()> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        TranscriptError::Validation(format!("Invalid date '{}'. Expected YYYY-MM-DD.", value))
    })?;
    Ok(())
}

/// Project subdirectories of the root, filtered by name substring, sorted.
fn discover_project_roots(projects_root: &Path, matcher: &str, excluder: &str) -> Result<Vec<PathBuf>> {
    let matcher = matcher.to_lowercase();
    let excluder = excluder.to_lowercase();

    let mut roots: Vec<PathBuf> = Vec::new();
    let entries = match std::fs::read_dir(projects_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(roots),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !matcher.is_empty() && !name.contains(&matcher) {
            continue;
        }
        if !excluder.is_empty() && name.contains(&excluder) {
            continue;
        }
        roots.push(path);
    }

    roots.sort();
    Ok(roots)
}

/// Claude session files under the project roots with activity on the date.
fn discover_claude_sessions(
    roots: &[PathBuf],
    date: &str,
    include_agent: bool,
) -> Result<Vec<PathBuf>> {
    let mut hits: Vec<PathBuf> = Vec::new();
    for root in roots {
        let mut allowed = indexed_allowed_sessions(root, date, include_agent);
        if matches!(&allowed, Some(ids) if ids.is_empty()) {
            // Index can be stale; avoid false negatives.
            tracing::debug!("Ignoring empty session index in {}", root.display());
            allowed = None;
        }

        for path in jsonl_files(root)? {
            let session_id = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("")
                .to_string();
            if !include_agent && session_id.starts_with("agent-") {
                continue;
            }
            if let Some(ids) = &allowed {
                if !ids.contains(&session_id) {
                    continue;
                }
            }
            if session_has_date(&path, date)? {
                hits.push(path);
            }
        }
    }
    Ok(hits)
}

/// Session ids the index says may include the target date.
///
/// Returns None when the index is missing or unusable, which means "scan
/// everything".
fn indexed_allowed_sessions(root: &Path, date: &str, include_agent: bool) -> Option<HashSet<String>> {
    let index_path = root.join("sessions-index.json");
    let contents = std::fs::read_to_string(&index_path).ok()?;
    let index: SessionIndex = serde_json::from_str(&contents).ok()?;

    let mut allowed = HashSet::new();
    for entry in index.entries {
        let Some(session_id) = entry.session_id else {
            continue;
        };
        if !include_agent && session_id.starts_with("agent-") {
            continue;
        }

        let created = entry.created.as_deref().and_then(date_only);
        let modified = entry.modified.as_deref().and_then(date_only);
        match (created, modified) {
            // Incomplete index metadata keeps the session in scope.
            (Some(created), Some(modified)) => {
                if created <= date && date <= modified {
                    allowed.insert(session_id);
                }
            }
            _ => {
                allowed.insert(session_id);
            }
        }
    }

    Some(allowed)
}

fn date_only(iso_like: &str) -> Option<&str> {
    if iso_like.len() < 10 {
        return None;
    }
    iso_like.get(..10)
}

/// Codex session files for the date, filtered by session working directory.
fn discover_codex_sessions(
    codex_root: &Path,
    date: &str,
    matcher: &str,
    excluder: &str,
) -> Result<Vec<PathBuf>> {
    let day_dir = codex_date_dir(codex_root, date);
    if !day_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut hits: Vec<PathBuf> = Vec::new();
    for path in jsonl_files(&day_dir)? {
        if !codex_cwd_allowed(&path, matcher, excluder) {
            continue;
        }
        if session_has_date(&path, date)? {
            hits.push(path);
        }
    }
    Ok(hits)
}

/// The `<root>/YYYY/MM/DD` directory for a validated date.
fn codex_date_dir(codex_root: &Path, date: &str) -> PathBuf {
    let mut dir = codex_root.to_path_buf();
    for part in date.split('-') {
        dir.push(part);
    }
    dir
}

/// Whether a Codex session's working directory passes the name filters.
///
/// Sessions with no readable metadata stay in scope.
fn codex_cwd_allowed(path: &Path, matcher: &str, excluder: &str) -> bool {
    if matcher.is_empty() && excluder.is_empty() {
        return true;
    }
    let Some(cwd) = codex_session_cwd(path) else {
        return true;
    };

    let cwd = cwd.to_lowercase();
    if !matcher.is_empty() && !cwd.contains(&matcher.to_lowercase()) {
        return false;
    }
    if !excluder.is_empty() && cwd.contains(&excluder.to_lowercase()) {
        return false;
    }
    true
}

/// cwd from the first `session_meta` event in a Codex transcript.
fn codex_session_cwd(path: &Path) -> Option<String> {
    let reader = each_lossy_line(path).ok()?;
    for line in reader {
        if !line.contains("\"type\":\"session_meta\"") && !line.contains("\"type\": \"session_meta\"")
        {
            continue;
        }
        let event: serde_json::Value = serde_json::from_str(&line).ok()?;
        let cwd = event.get("payload")?.get("cwd")?.as_str()?;
        return Some(cwd.to_string()).filter(|cwd| !cwd.is_empty());
    }
    None
}

/// `.jsonl` files directly under a directory, sorted.
fn jsonl_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "jsonl") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Whether any line of the file carries a timestamp on the target date.
///
/// Fast string probe, no per-line JSON parse; invalid UTF-8 is tolerated.
fn session_has_date(path: &Path, date: &str) -> Result<bool> {
    let compact = format!("\"timestamp\":\"{}", date);
    let spaced = format!("\"timestamp\": \"{}", date);

    for line in each_lossy_line(path)? {
        if line.contains(&compact) || line.contains(&spaced) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Iterate a file line by line, replacing invalid UTF-8 instead of failing.
fn each_lossy_line(path: &Path) -> std::io::Result<impl Iterator<Item = String>> {
    let mut reader = BufReader::new(std::fs::File::open(path)?);
    let mut buf: Vec<u8> = Vec::new();
    Ok(std::iter::from_fn(move || {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(String::from_utf8_lossy(&buf).into_owned()),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_session(dir: &Path, name: &str, timestamps: &[&str]) {
        let lines: Vec<String> = timestamps
            .iter()
            .map(|ts| format!(r#"{{"type":"user","timestamp":"{}"}}"#, ts))
            .collect();
        fs::write(dir.join(name), lines.join("\n")).unwrap();
    }

    fn write_codex_session(dir: &Path, name: &str, cwd: Option<&str>, timestamp: &str) {
        let mut lines: Vec<String> = Vec::new();
        if let Some(cwd) = cwd {
            lines.push(format!(
                r#"{{"type":"session_meta","payload":{{"cwd":"{}"}}}}"#,
                cwd
            ));
        }
        lines.push(format!(
            r#"{{"type":"response_item","timestamp":"{}"}}"#,
            timestamp
        ));
        fs::write(dir.join(name), lines.join("\n")).unwrap();
    }

    fn codex_day(root: &Path, date: &str) -> PathBuf {
        let day = codex_date_dir(root, date);
        fs::create_dir_all(&day).unwrap();
        day
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2026-02-06").is_ok());
        assert!(validate_date("2026-2-6").is_err());
        assert!(validate_date("not-a-date").is_err());
    }

    #[test]
    fn test_lists_sessions_with_matching_date() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let project = root.path().join("proj-a");
        fs::create_dir(&project).unwrap();
        write_session(&project, "one.jsonl", &["2026-02-06T10:00:00Z"]);
        write_session(&project, "two.jsonl", &["2026-02-05T10:00:00Z"]);

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", false).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with("one.jsonl"));
    }

    #[test]
    fn test_match_and_exclude_filters() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        for name in ["alpha-client", "alpha-internal", "beta"] {
            let project = root.path().join(name);
            fs::create_dir(&project).unwrap();
            write_session(&project, "s.jsonl", &["2026-02-06T10:00:00Z"]);
        }

        let hits = list_sessions(
            root.path(),
            codex.path(),
            "2026-02-06",
            "alpha",
            "client",
            false,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].to_string_lossy().contains("alpha-internal"));
    }

    #[test]
    fn test_agent_sessions_skipped_unless_requested() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let project = root.path().join("proj");
        fs::create_dir(&project).unwrap();
        write_session(&project, "agent-x.jsonl", &["2026-02-06T10:00:00Z"]);
        write_session(&project, "main.jsonl", &["2026-02-06T11:00:00Z"]);

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", false).unwrap();
        assert_eq!(hits.len(), 1);

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", true).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_index_narrows_candidates() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let project = root.path().join("proj");
        fs::create_dir(&project).unwrap();
        write_session(&project, "in-range.jsonl", &["2026-02-06T10:00:00Z"]);
        write_session(&project, "out-of-range.jsonl", &["2026-02-06T10:00:00Z"]);
        fs::write(
            project.join("sessions-index.json"),
            r#"{"entries":[
                {"sessionId":"in-range","created":"2026-02-01T00:00:00Z","modified":"2026-02-10T00:00:00Z"},
                {"sessionId":"out-of-range","created":"2026-01-01T00:00:00Z","modified":"2026-01-02T00:00:00Z"}
            ]}"#,
        )
        .unwrap();

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", false).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with("in-range.jsonl"));
    }

    #[test]
    fn test_unreadable_index_falls_back_to_scan() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let project = root.path().join("proj");
        fs::create_dir(&project).unwrap();
        write_session(&project, "s.jsonl", &["2026-02-06T10:00:00Z"]);
        fs::write(project.join("sessions-index.json"), "{broken").unwrap();

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", false).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_no_roots_anywhere_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let result = list_sessions(root.path(), codex.path(), "2026-02-06", "nope", "", false);
        assert!(matches!(result, Err(TranscriptError::NotFound(_, _))));
    }

    #[test]
    fn test_codex_sessions_found_without_claude_roots() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let day = codex_day(codex.path(), "2026-02-06");
        write_codex_session(&day, "rollout-1.jsonl", Some("/work/ttcg"), "2026-02-06T09:00:00Z");

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", false).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with("rollout-1.jsonl"));
    }

    #[test]
    fn test_codex_cwd_match_and_exclude() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let day = codex_day(codex.path(), "2026-02-06");
        write_codex_session(&day, "a.jsonl", Some("/work/ttcg-game"), "2026-02-06T09:00:00Z");
        write_codex_session(&day, "b.jsonl", Some("/work/clients/acme"), "2026-02-06T09:30:00Z");

        let hits = list_sessions(
            root.path(),
            codex.path(),
            "2026-02-06",
            "ttcg",
            "",
            false,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with("a.jsonl"));

        let hits = list_sessions(
            root.path(),
            codex.path(),
            "2026-02-06",
            "",
            "clients",
            false,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with("a.jsonl"));
    }

    #[test]
    fn test_codex_session_without_meta_stays_in_scope() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let day = codex_day(codex.path(), "2026-02-06");
        write_codex_session(&day, "no-meta.jsonl", None, "2026-02-06T09:00:00Z");

        let hits = list_sessions(
            root.path(),
            codex.path(),
            "2026-02-06",
            "ttcg",
            "",
            false,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_codex_wrong_day_dir_not_scanned() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let day = codex_day(codex.path(), "2026-02-05");
        write_codex_session(&day, "a.jsonl", None, "2026-02-05T09:00:00Z");
        let project = root.path().join("proj");
        fs::create_dir(&project).unwrap();
        write_session(&project, "s.jsonl", &["2026-02-06T10:00:00Z"]);

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", false).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with("s.jsonl"));
    }

    #[test]
    fn test_claude_and_codex_hits_merged_sorted() {
        let root = tempfile::tempdir().unwrap();
        let codex = tempfile::tempdir().unwrap();
        let project = root.path().join("proj");
        fs::create_dir(&project).unwrap();
        write_session(&project, "claude.jsonl", &["2026-02-06T10:00:00Z"]);
        let day = codex_day(codex.path(), "2026-02-06");
        write_codex_session(&day, "rollout.jsonl", None, "2026-02-06T11:00:00Z");

        let hits =
            list_sessions(root.path(), codex.path(), "2026-02-06", "", "", false).unwrap();
        assert_eq!(hits.len(), 2);
        let mut sorted = hits.clone();
        sorted.sort();
        assert_eq!(hits, sorted);
    }
}
