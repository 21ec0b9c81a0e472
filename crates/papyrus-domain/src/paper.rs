//! Persisted paper records and duplicate outcomes

use crate::metadata::PaperMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A paper accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaper {
    /// Store-assigned identifier
    pub id: i64,

    /// Path of the imported document
    pub file_path: String,

    /// Extracted metadata, never mutated by the pipeline after insertion
    pub metadata: PaperMetadata,

    /// When the paper was imported (seconds since Unix epoch)
    pub imported_at: u64,
}

/// Why a paper was rejected as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateReason {
    /// A record with the same file path already exists
    FilePath,
    /// A record with the same title (case-insensitive) already exists
    Title,
}

impl fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateReason::FilePath => f.write_str("a paper with this file path is already in the library"),
            DuplicateReason::Title => f.write_str("a paper with this title is already in the library"),
        }
    }
}

/// Outcome of an insert-or-reject operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The record was stored
    Inserted(StoredPaper),
    /// The store refused the record because it would duplicate an existing one
    Rejected(DuplicateReason),
}

impl Insertion {
    /// The stored paper, if the insertion succeeded
    pub fn inserted(self) -> Option<StoredPaper> {
        match self {
            Insertion::Inserted(paper) => Some(paper),
            Insertion::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_accessor() {
        let paper = StoredPaper {
            id: 1,
            file_path: "/tmp/a.pdf".to_string(),
            metadata: PaperMetadata::default(),
            imported_at: 0,
        };
        assert_eq!(Insertion::Inserted(paper.clone()).inserted(), Some(paper));
        assert_eq!(Insertion::Rejected(DuplicateReason::Title).inserted(), None);
    }

    #[test]
    fn test_duplicate_reason_display() {
        assert!(DuplicateReason::FilePath.to_string().contains("file path"));
        assert!(DuplicateReason::Title.to_string().contains("title"));
    }
}
