//! Import command implementation.

use super::{credential_store, open_store};
use crate::cli::ImportArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::pdf::PdfTextExtractor;
use papyrus_domain::BackendSelection;
use papyrus_extractor::{Backends, ExtractorError, ImportOutcome, Importer, MetadataExtractor};
use papyrus_llm::{LocalModelBackend, RemoteChatBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Execute the import command.
pub async fn execute_import(args: ImportArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let selection: BackendSelection = args.backend.map(Into::into).unwrap_or(config.backend);

    let remote = RemoteChatBackend::new(config.remote.clone(), credential_store()?)?;
    let local = LocalModelBackend::new(config.local.clone());
    let backends = Backends::new(Arc::new(remote), Arc::new(local));

    let extractor = MetadataExtractor::new(backends, config.extractor.clone())?;
    let store = Arc::new(open_store(config)?);
    let importer = Importer::new(extractor, Arc::new(PdfTextExtractor), store);

    let paths = normalize_paths(args.paths);
    info!(backend = %selection, files = paths.len(), "Importing papers");

    let outcomes = importer.import_many(paths, selection).await;
    println!("{}", formatter.format_import_results(&outcomes)?);

    check_outcomes(&outcomes)
}

/// Absolute paths, so the same file imported from different working
/// directories is recognized as a duplicate.
fn normalize_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .map(|p| std::fs::canonicalize(&p).unwrap_or(p))
        .collect()
}

/// Duplicates are expected; anything else makes the command fail.
fn check_outcomes(outcomes: &[ImportOutcome]) -> Result<()> {
    let failed = outcomes
        .iter()
        .filter(|(_, r)| matches!(r, Err(e) if !matches!(e, ExtractorError::Duplicate(_))))
        .count();

    if failed > 0 {
        return Err(CliError::Import {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}
