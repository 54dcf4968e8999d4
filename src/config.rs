//! Configuration management for Transmd
//!
//! Loads settings from a TOML file at ~/.transmd/config.toml. Every field has
//! a default, so a missing file or an empty table is always usable. CLI flags
//! override whatever the file provides.

use crate::error::{Result, TranscriptError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default options for the `convert` subcommand
    #[serde(default)]
    pub convert: ConvertDefaults,

    /// Settings for the `sessions` subcommand
    #[serde(default)]
    pub sessions: SessionsConfig,
}

/// Defaults applied to `convert` when the corresponding flag is not given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertDefaults {
    /// Include hidden thinking blocks
    #[serde(default)]
    pub include_thinking: bool,

    /// Include tool use/result entries
    #[serde(default)]
    pub include_tools: bool,

    /// Tools to exclude when tools are included (example: "tool:Read")
    #[serde(default)]
    pub exclude_tools: Vec<String>,

    /// Restrict output to these tools only
    #[serde(default)]
    pub only_tools: Vec<String>,
}

/// Session discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Base projects directory containing per-project session subdirs
    #[serde(default = "default_projects_root")]
    pub projects_root: PathBuf,

    /// Date-partitioned Codex sessions directory (YYYY/MM/DD subdirs)
    #[serde(default = "default_codex_sessions_root")]
    pub codex_sessions_root: PathBuf,

    /// Include agent-*.jsonl session files in listings
    #[serde(default)]
    pub include_agent: bool,
}

fn default_projects_root() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".claude").join("projects"))
        .unwrap_or_else(|| PathBuf::from(".claude/projects"))
}

fn default_codex_sessions_root() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".codex").join("sessions"))
        .unwrap_or_else(|| PathBuf::from(".codex/sessions"))
}

impl Default for SessionsConfig {
    fn default() -> Self {
        SessionsConfig {
            projects_root: default_projects_root(),
            codex_sessions_root: default_codex_sessions_root(),
            include_agent: false,
        }
    }
}

impl Config {
    /// Default config file location (~/.transmd/config.toml)
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|p| p.join(".transmd").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".transmd/config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write a default config file, creating parent directories as needed
    pub fn create_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let config = Config::default();
        let contents = toml::to_string_pretty(&config)
            .map_err(|e| TranscriptError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
