//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use papyrus_domain::BackendSelection;
use std::path::PathBuf;

/// Papyrus - Import PDF papers and extract their metadata with an LLM.
#[derive(Debug, Parser)]
#[command(name = "papyrus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PAPYRUS_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Import PDF papers into the library
    Import(ImportArgs),

    /// List all papers
    List,

    /// Search papers by title, authors, publication or summary
    Search(SearchArgs),

    /// Show a single paper
    Show(ShowArgs),

    /// Remove papers from the library
    Remove(RemoveArgs),

    /// Show or change the inference backend
    Backend(BackendArgs),

    /// Store the API key for the remote backend
    SetKey(SetKeyArgs),

    /// Show the active configuration
    Config,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// PDF files to import
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Backend to use for this import instead of the configured one
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendArg>,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Search query text
    pub query: String,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Paper ID
    pub id: i64,
}

/// Arguments for the remove command.
#[derive(Debug, Parser)]
pub struct RemoveArgs {
    /// Paper IDs to remove
    #[arg(required = true)]
    pub ids: Vec<i64>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the backend command.
#[derive(Debug, Parser)]
pub struct BackendArgs {
    /// Backend to select; omit to show the current one
    #[arg(value_enum)]
    pub selection: Option<BackendArg>,
}

/// Arguments for the set-key command.
#[derive(Debug, Parser)]
pub struct SetKeyArgs {
    /// API key; read from stdin when omitted
    pub key: Option<String>,
}

/// Backend argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendArg {
    /// Remote chat-completion API
    Remote,
    /// Bundled local model
    Local,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<BackendArg> for BackendSelection {
    fn from(backend: BackendArg) -> Self {
        match backend {
            BackendArg::Remote => BackendSelection::Remote,
            BackendArg::Local => BackendSelection::Local,
        }
    }
}
