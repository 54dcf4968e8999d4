//! Transmd - convert AI coding session transcripts (JSONL) into markdown
//!
//! This crate provides the core functionality for Transmd:
//! - Fault-tolerant line-by-line parsing of session event logs
//! - Content normalization with thinking/tool filtering and cross-event
//!   tool use/result correlation
//! - Session metadata aggregation (timestamps, models, token usage, roles)
//! - Markdown rendering with a YAML-like front-matter header
//! - Session discovery by activity date
//!
//! # Usage
//!
//! As a library:
//! ```ignore
//! use transmd::{parse_transcript_file, render_markdown, TranscriptOptions};
//!
//! let options = TranscriptOptions::default();
//! let outcome = parse_transcript_file("session.jsonl".as_ref(), &options)?;
//! let markdown = render_markdown("session.jsonl", &outcome);
//! ```
//!
//! From the command line:
//! ```text
//! transmd convert session.jsonl -o session.md --include-tools
//! transmd sessions 2026-02-06 --exclude clients
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod render;
pub mod sessions;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Result, TranscriptError};
pub use parser::{
    parse_transcript, parse_transcript_file, LineDiagnostic, ParseOutcome, SessionSummary,
    TranscriptOptions, Turn,
};
pub use render::render_markdown;
pub use sessions::list_sessions;
