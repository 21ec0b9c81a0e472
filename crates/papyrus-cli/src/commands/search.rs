//! Search command implementation.

use super::open_store;
use crate::cli::SearchArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the search command.
pub fn execute_search(args: SearchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.query.trim().is_empty() {
        return Err(CliError::InvalidInput("Search query must not be empty".to_string()));
    }

    let store = open_store(config)?;
    let papers = store.search(&args.query)?;
    println!("{}", formatter.format_papers(&papers)?);
    Ok(())
}
