//! Papyrus CLI - Import PDF papers and extract their metadata with an LLM.

use clap::Parser;
use papyrus_cli::commands;
use papyrus_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> papyrus_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let formatter = Formatter::new(format, !cli.no_color && config.settings.color);

    match cli.command {
        Command::Import(args) => commands::execute_import(args, &config, &formatter).await?,
        Command::List => commands::execute_list(&config, &formatter)?,
        Command::Search(args) => commands::execute_search(args, &config, &formatter)?,
        Command::Show(args) => commands::execute_show(args, &config, &formatter)?,
        Command::Remove(args) => commands::execute_remove(args, &config, &formatter)?,
        Command::Backend(args) => commands::execute_backend(args, &mut config, &config_path, &formatter)?,
        Command::SetKey(args) => commands::execute_set_key(args, &formatter)?,
        Command::Config => commands::execute_config(&config, &config_path, &formatter)?,
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "papyrus=debug" } else { "papyrus=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
