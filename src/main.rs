//! Transmd CLI - convert session transcripts to markdown and list sessions

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transmd::{list_sessions, parse_transcript_file, render_markdown, Config, TranscriptOptions};

#[derive(Parser, Debug)]
#[command(name = "transmd")]
#[command(version)]
#[command(about = "Convert AI coding session transcripts (JSONL) into markdown", long_about = None)]
struct Args {
    /// Path to configuration file (defaults to ~/.transmd/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initialize a new config file with defaults
    #[arg(long)]
    init: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a session transcript JSONL and output a markdown conversation
    Convert {
        /// Input transcript JSONL path
        input: PathBuf,

        /// Output markdown file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include hidden thinking blocks when present
        #[arg(long)]
        include_thinking: bool,

        /// Include tool use/result entries
        #[arg(long)]
        include_tools: bool,

        /// Exclude tool(s) when including tools (example: --exclude-tools "tool:Read")
        #[arg(long, value_name = "TOOL")]
        exclude_tools: Vec<String>,

        /// Include only specific tool(s) (example: --only-tools "tool:Read")
        #[arg(long, value_name = "TOOL")]
        only_tools: Vec<String>,
    },

    /// List session transcripts with activity on a target date
    Sessions {
        /// Target date in YYYY-MM-DD format
        date: String,

        /// Filter project directory names by substring (eg. ttcg)
        #[arg(long = "match", default_value = "")]
        matcher: String,

        /// Exclude project directory names by substring (opposite of --match)
        #[arg(long, default_value = "")]
        exclude: String,

        /// Base projects directory (defaults to ~/.claude/projects)
        #[arg(long)]
        projects_root: Option<PathBuf>,

        /// Codex sessions directory (defaults to ~/.codex/sessions)
        #[arg(long)]
        codex_sessions_root: Option<PathBuf>,

        /// Include agent-*.jsonl session files
        #[arg(long)]
        include_agent: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("transmd={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = expand_path(&args.config.clone().unwrap_or_else(Config::default_path));

    // Handle --init flag
    if args.init {
        if config_path.exists() {
            tracing::warn!("Config file already exists: {}", config_path.display());
            return Ok(());
        }
        Config::create_default(&config_path)?;
        tracing::info!("Created default config at: {}", config_path.display());
        return Ok(());
    }

    // Load configuration
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        if args.config.is_some() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
        }
        Config::default()
    };

    let Some(command) = args.command else {
        anyhow::bail!("No subcommand given. Try `transmd convert <input>` or `transmd sessions <date>`.");
    };

    match command {
        Command::Convert {
            input,
            output,
            include_thinking,
            include_tools,
            exclude_tools,
            only_tools,
        } => {
            // CLI flags override config-file defaults; name lists replace them.
            let defaults = &config.convert;
            let options = TranscriptOptions {
                include_thinking: include_thinking || defaults.include_thinking,
                include_tools: include_tools || defaults.include_tools,
                exclude_tools: if exclude_tools.is_empty() {
                    defaults.exclude_tools.clone()
                } else {
                    exclude_tools
                },
                only_tools: if only_tools.is_empty() {
                    defaults.only_tools.clone()
                } else {
                    only_tools
                },
            };

            let input = expand_path(&input);
            let outcome = parse_transcript_file(&input, &options)?;
            let markdown = render_markdown(&input.display().to_string(), &outcome);

            match output {
                Some(path) => {
                    let path = expand_path(&path);
                    std::fs::write(&path, markdown)?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => {
                    std::io::stdout().write_all(markdown.as_bytes())?;
                }
            }
        }

        Command::Sessions {
            date,
            matcher,
            exclude,
            projects_root,
            codex_sessions_root,
            include_agent,
        } => {
            let root = expand_path(
                &projects_root.unwrap_or_else(|| config.sessions.projects_root.clone()),
            );
            let codex_root = expand_path(
                &codex_sessions_root
                    .unwrap_or_else(|| config.sessions.codex_sessions_root.clone()),
            );
            let include_agent = include_agent || config.sessions.include_agent;
            let hits =
                list_sessions(&root, &codex_root, &date, &matcher, &exclude, include_agent)?;

            let mut stdout = std::io::stdout();
            for path in hits {
                writeln!(stdout, "{}", path.display())?;
            }
        }
    }

    Ok(())
}

/// Expand ~ to home directory
fn expand_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            if let Ok(rest) = path.strip_prefix("~") {
                return home.join(rest);
            }
        }
    }
    path.to_path_buf()
}
