//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MailSift CLI - Rank, highlight and summarize inbox snapshots.
#[derive(Debug, Parser)]
#[command(name = "mailsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Summarization provider credential
    #[arg(long, env = "MAILSIFT_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one full cycle over a snapshot and print the widget
    Run(RunArgs),

    /// Score every record in a snapshot
    Score(ScoreArgs),

    /// Summarize a piece of text
    Summarize(SummarizeArgs),

    /// List supported mail providers
    Providers,

    /// Manage priority keywords
    Keywords(KeywordsArgs),

    /// Grant, decline or show summarization consent
    Consent(ConsentArgs),
}

/// Snapshot input shared by `run` and `score`.
#[derive(Debug, Parser)]
pub struct SnapshotArgs {
    /// JSON inbox snapshot ({tag, attrs, text, children})
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Page URL the snapshot was taken from (selects the provider)
    #[arg(short, long)]
    pub url: String,

    /// Keyword to use instead of the configured list (repeatable)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Write the highlighted snapshot to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the score command.
#[derive(Debug, Parser)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Only show records with a positive score
    #[arg(long)]
    pub positive: bool,
}

/// Arguments for the summarize command.
#[derive(Debug, Parser)]
pub struct SummarizeArgs {
    /// Text to summarize
    pub text: String,

    /// Target summary length in characters
    #[arg(short, long)]
    pub max_length: Option<usize>,

    /// Summary style hint
    #[arg(short, long)]
    pub style: Option<String>,

    /// Consent to sending the text for this run only
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for keyword management.
#[derive(Debug, Parser)]
pub struct KeywordsArgs {
    #[command(subcommand)]
    pub action: KeywordsAction,
}

/// Keyword management actions.
#[derive(Debug, Subcommand)]
pub enum KeywordsAction {
    /// List keywords
    List,

    /// Add a keyword
    Add {
        /// Keyword (1-50 characters, case-insensitively unique)
        keyword: String,
    },

    /// Remove a keyword
    Remove {
        /// Keyword to remove (case-insensitive)
        keyword: String,
    },

    /// Restore the default keywords
    Reset,
}

/// Arguments for consent management.
#[derive(Debug, Parser)]
pub struct ConsentArgs {
    #[command(subcommand)]
    pub action: ConsentAction,
}

/// Consent actions.
#[derive(Debug, Subcommand)]
pub enum ConsentAction {
    /// Allow summarization
    Grant,

    /// Refuse summarization and switch it off
    Decline,

    /// Show the current consent state
    Show,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
