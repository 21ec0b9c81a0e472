//! Import pipeline: duplicate guard, text extraction, metadata extraction
//! and persistence for one document at a time.

use crate::error::ExtractorError;
use crate::extractor::MetadataExtractor;
use papyrus_domain::traits::{PaperStore, TextExtractor};
use papyrus_domain::{BackendSelection, DuplicateReason, Insertion, StoredPaper};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome of importing one document
pub type ImportOutcome = (PathBuf, Result<StoredPaper, ExtractorError>);

/// Imports documents into a [`PaperStore`].
///
/// The duplicate checks are best-effort under concurrency; the store's own
/// uniqueness rules decide the final outcome.
pub struct Importer<T, S> {
    extractor: MetadataExtractor,
    text_extractor: Arc<T>,
    store: Arc<S>,
}

impl<T, S> Clone for Importer<T, S> {
    fn clone(&self) -> Self {
        Self {
            extractor: self.extractor.clone(),
            text_extractor: Arc::clone(&self.text_extractor),
            store: Arc::clone(&self.store),
        }
    }
}

impl<T, S> Importer<T, S>
where
    T: TextExtractor + Send + Sync + 'static,
    T::Error: Display,
    S: PaperStore + Send + Sync + 'static,
    S::Error: Display,
{
    /// Create a new importer
    pub fn new(extractor: MetadataExtractor, text_extractor: Arc<T>, store: Arc<S>) -> Self {
        Self {
            extractor,
            text_extractor,
            store,
        }
    }

    /// Import a single document
    pub async fn import(
        &self,
        path: &Path,
        selection: BackendSelection,
    ) -> Result<StoredPaper, ExtractorError> {
        let file_path = path.to_string_lossy().into_owned();

        // Checked before any text extraction or inference
        let lookup = file_path.clone();
        if self.with_store(move |store| store.find_by_path(&lookup)).await?.is_some() {
            info!(path = %file_path, "Skipping already imported file");
            return Err(ExtractorError::Duplicate(DuplicateReason::FilePath));
        }

        let text = self.extract_text(path).await?;
        debug!(path = %file_path, chars = text.chars().count(), "Extracted document text");

        let metadata = self.extractor.extract(&text, selection).await?;

        let title = metadata
            .title
            .clone()
            .filter(|t| !t.trim().is_empty() && !metadata.is_placeholder());
        if let Some(title) = title {
            let lookup = title.clone();
            if self.with_store(move |store| store.find_by_title(&lookup)).await?.is_some() {
                info!(path = %file_path, title = %title, "Skipping paper with duplicate title");
                return Err(ExtractorError::Duplicate(DuplicateReason::Title));
            }
        }

        let insert_path = file_path.clone();
        let insertion = self
            .with_store(move |store| store.insert(&insert_path, &metadata))
            .await?;
        match insertion {
            Insertion::Inserted(paper) => {
                info!(id = paper.id, path = %file_path, "Paper imported");
                Ok(paper)
            }
            Insertion::Rejected(reason) => {
                info!(path = %file_path, "Store rejected paper: {}", reason);
                Err(ExtractorError::Duplicate(reason))
            }
        }
    }

    /// Import several documents concurrently, one task per document.
    ///
    /// Outcomes are returned in completion order. A task that panics is
    /// logged and left out of the result.
    pub async fn import_many<I>(&self, paths: I, selection: BackendSelection) -> Vec<ImportOutcome>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut tasks = JoinSet::new();
        for path in paths {
            let importer = self.clone();
            tasks.spawn(async move {
                let result = importer.import(&path, selection).await;
                (path, result)
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!("Import task failed: {}", e),
            }
        }
        outcomes
    }

    /// Run a store operation on the blocking pool
    async fn with_store<R, F>(&self, op: F) -> Result<R, ExtractorError>
    where
        F: FnOnce(&S) -> Result<R, S::Error> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()).map_err(store_error))
            .await
            .map_err(|e| ExtractorError::Store(format!("store task failed: {}", e)))?
    }

    async fn extract_text(&self, path: &Path) -> Result<String, ExtractorError> {
        let text_extractor = Arc::clone(&self.text_extractor);
        let owned = path.to_path_buf();

        let text = tokio::task::spawn_blocking(move || {
            text_extractor
                .extract_text(&owned)
                .map_err(|e| ExtractorError::TextExtraction(e.to_string()))
        })
        .await
        .map_err(|e| ExtractorError::TextExtraction(format!("extraction task failed: {}", e)))??;

        if text.trim().is_empty() {
            return Err(ExtractorError::TextExtraction("no text".to_string()));
        }
        Ok(text)
    }
}

fn store_error(e: impl Display) -> ExtractorError {
    ExtractorError::Store(e.to_string())
}
