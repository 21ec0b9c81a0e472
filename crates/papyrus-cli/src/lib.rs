//! Papyrus CLI library.
//!
//! Configuration, PDF text extraction, command execution and output
//! formatting for the `papyrus` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod pdf;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use pdf::PdfTextExtractor;
