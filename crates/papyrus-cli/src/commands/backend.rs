//! Backend selection and API key commands.

use super::credential_store;
use crate::cli::{BackendArgs, SetKeyArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use papyrus_domain::traits::CredentialStore;
use papyrus_domain::BackendSelection;
use papyrus_llm::DEFAULT_KEY_VARS;
use std::io;
use std::path::Path;

/// Execute the backend command.
///
/// Without an argument, prints the current backend and whether it is ready.
pub fn execute_backend(
    args: BackendArgs,
    config: &mut Config,
    config_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let Some(selection) = args.selection else {
        println!("{}", formatter.info(&format!("Current backend: {}", config.backend)));
        if let Some(problem) = readiness_problem(config)? {
            println!("{}", formatter.warning(&problem));
        }
        return Ok(());
    };

    config.backend = selection.into();
    config.save_to(config_path)?;
    println!("{}", formatter.success(&format!("Backend set to {}", config.backend)));

    if let Some(problem) = readiness_problem(config)? {
        println!("{}", formatter.warning(&problem));
    }
    Ok(())
}

/// Why the configured backend would report itself unavailable, if it would.
fn readiness_problem(config: &Config) -> Result<Option<String>> {
    match config.backend {
        BackendSelection::Remote => {
            let key = credential_store()?.load()?;
            if key.is_none() {
                return Ok(Some(format!(
                    "No API key set. Run `papyrus set-key` or set {}.",
                    DEFAULT_KEY_VARS.join(" / ")
                )));
            }
            Ok(None)
        }
        BackendSelection::Local => {
            let artifact = config.local.artifact_path();
            if !artifact.is_file() {
                return Ok(Some(format!("Bundled model not found at {}", artifact.display())));
            }
            Ok(None)
        }
    }
}

/// Execute the set-key command.
pub fn execute_set_key(args: SetKeyArgs, formatter: &Formatter) -> Result<()> {
    let key = match args.key {
        Some(key) => key,
        None => {
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line
        }
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidInput("API key must not be empty".to_string()));
    }

    let store = credential_store()?;
    store.store(key)?;
    println!(
        "{}",
        formatter.success(&format!("API key saved to {}", store.path().display()))
    );

    let overriding: Vec<&str> = DEFAULT_KEY_VARS
        .iter()
        .copied()
        .filter(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()))
        .collect();
    if !overriding.is_empty() {
        println!(
            "{}",
            formatter.warning(&format!("{} is set and takes precedence", overriding.join(", ")))
        );
    }

    Ok(())
}
