//! List and show command implementations.

use super::open_store;
use crate::cli::ShowArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use papyrus_store::StoreError;

/// Execute the list command.
pub fn execute_list(config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let papers = store.list()?;
    println!("{}", formatter.format_papers(&papers)?);
    Ok(())
}

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let paper = store.get(args.id)?.ok_or(StoreError::NotFound(args.id))?;
    println!("{}", formatter.format_paper(&paper)?);
    Ok(())
}
