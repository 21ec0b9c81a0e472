//! Remove command implementation.

use super::open_store;
use crate::cli::RemoveArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use papyrus_store::StoreError;
use std::io::{self, Write};

/// Execute the remove command.
pub fn execute_remove(args: RemoveArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;

    // Resolve every id first so nothing is deleted if one is wrong
    let mut papers = Vec::with_capacity(args.ids.len());
    for id in &args.ids {
        let paper = store.get(*id)?.ok_or(StoreError::NotFound(*id))?;
        papers.push(paper);
    }

    if !args.yes {
        println!("About to remove {} paper(s):", papers.len());
        for paper in &papers {
            println!(
                "  - #{} {}",
                paper.id,
                paper.metadata.title.as_deref().unwrap_or(&paper.file_path)
            );
        }
        print!("Continue? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    for paper in &papers {
        store.remove(paper.id)?;
    }
    println!("{}", formatter.success(&format!("Removed {} paper(s)", papers.len())));

    Ok(())
}
