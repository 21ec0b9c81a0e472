//! Config command implementation.

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use papyrus_llm::FileCredentialStore;
use serde_json::json;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(config: &Config, config_path: &Path, formatter: &Formatter) -> Result<()> {
    let database = config.database_path()?;
    let credentials = FileCredentialStore::default_path()?;
    let model = config.local.artifact_path();

    if formatter.format() == OutputFormat::Json {
        let out = json!({
            "config_file": config_path,
            "database": database,
            "credentials": credentials,
            "model": model,
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", formatter.info(&format!("Config file:  {}", config_path.display())));
    println!("{}", formatter.info(&format!("Database:     {}", database.display())));
    println!("{}", formatter.info(&format!("Credentials:  {}", credentials.display())));
    println!("{}", formatter.info(&format!("Local model:  {}", model.display())));
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}
