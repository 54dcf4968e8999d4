//! Transcript parsing pipeline
//!
//! Turns a session JSONL log into ordered conversation turns plus aggregated
//! session metadata, with per-line fault tolerance.

pub mod content;
pub mod filter;
pub mod stream;
pub mod types;

pub use filter::{normalize_tool_name, ToolFilter};
pub use stream::{parse_transcript, parse_transcript_file, TranscriptOptions};
pub use types::{LineDiagnostic, ParseOutcome, SessionSummary, Turn};
