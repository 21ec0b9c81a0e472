//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the extraction pipeline and
//! the host application. Implementations live in other crates.

use crate::{Insertion, PaperMetadata, StoredPaper};
use std::path::Path;

/// Produces the full plain text of a document.
///
/// Implemented by the host (e.g. a PDF text API). Failures are opaque to the
/// pipeline.
pub trait TextExtractor {
    /// Error type for extraction failures
    type Error;

    /// Extract all text from the document at `path`
    fn extract_text(&self, path: &Path) -> Result<String, Self::Error>;
}

/// Opaque storage for the single API credential used by the remote backend.
pub trait CredentialStore {
    /// Error type for credential access
    type Error;

    /// Read the stored secret, `None` when nothing has been stored
    fn load(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the stored secret
    fn store(&self, secret: &str) -> Result<(), Self::Error>;
}

/// Persistence boundary for imported papers.
///
/// Implemented by the infrastructure layer (papyrus-store). Lookups serve as
/// best-effort duplicate guards before the costly inference call; `insert`
/// is the authoritative insert-or-reject.
pub trait PaperStore {
    /// Error type for store operations
    type Error;

    /// Find a paper by the path it was imported from
    fn find_by_path(&self, file_path: &str) -> Result<Option<StoredPaper>, Self::Error>;

    /// Find a paper by title (case-insensitive, surrounding whitespace ignored)
    fn find_by_title(&self, title: &str) -> Result<Option<StoredPaper>, Self::Error>;

    /// Insert a record, or reject it if it duplicates an existing one
    fn insert(&self, file_path: &str, metadata: &PaperMetadata) -> Result<Insertion, Self::Error>;
}
