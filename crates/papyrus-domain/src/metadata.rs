//! Bibliographic metadata extracted from a paper

use serde::{Deserialize, Serialize};

/// Metadata record produced by a single successful extraction.
///
/// Every field is independently optional. Consumers must treat a missing
/// field as "unknown" rather than as an error.
///
/// # Examples
///
/// ```
/// use papyrus_domain::PaperMetadata;
///
/// let meta = PaperMetadata::default().with_title("Attention Is All You Need");
/// assert_eq!(meta.title.as_deref(), Some("Attention Is All You Need"));
/// assert!(meta.year.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    /// Paper title
    pub title: Option<String>,

    /// Author names joined into a single comma-separated string
    pub authors: Option<String>,

    /// Journal, conference or venue
    pub publication: Option<String>,

    /// Publication year
    pub year: Option<i32>,

    /// Short (2-3 sentence) summary
    pub summary: Option<String>,
}

impl PaperMetadata {
    /// Placeholder record substituted when a response carried no usable JSON
    /// and the fallback policy allows it.
    pub fn fallback() -> Self {
        Self {
            title: Some("Unknown".to_string()),
            authors: Some("Unknown".to_string()),
            publication: Some("Unknown".to_string()),
            year: Some(0),
            summary: Some("No summary available".to_string()),
        }
    }

    /// True for the record produced by [`PaperMetadata::fallback`].
    ///
    /// Its title says nothing about the paper, so it is never used to detect
    /// duplicates.
    pub fn is_placeholder(&self) -> bool {
        *self == Self::fallback()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the authors string
    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    /// Set the publication venue
    pub fn with_publication(mut self, publication: impl Into<String>) -> Self {
        self.publication = Some(publication.into());
        self
    }

    /// Set the year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_none()
            && self.publication.is_none()
            && self.year.is_none()
            && self.summary.is_none()
    }

    /// Individual author names, split on commas and trimmed.
    ///
    /// ```
    /// use papyrus_domain::PaperMetadata;
    ///
    /// let meta = PaperMetadata::default().with_authors("Ada Lovelace, Charles Babbage");
    /// assert_eq!(meta.author_list(), vec!["Ada Lovelace", "Charles Babbage"]);
    /// ```
    pub fn author_list(&self) -> Vec<&str> {
        self.authors
            .as_deref()
            .map(|a| a.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let meta = PaperMetadata::default();
        assert!(meta.is_empty());
        assert!(meta.author_list().is_empty());
    }

    #[test]
    fn test_fallback_record() {
        let meta = PaperMetadata::fallback();
        assert_eq!(meta.title.as_deref(), Some("Unknown"));
        assert_eq!(meta.authors.as_deref(), Some("Unknown"));
        assert_eq!(meta.publication.as_deref(), Some("Unknown"));
        assert_eq!(meta.year, Some(0));
        assert_eq!(meta.summary.as_deref(), Some("No summary available"));
        assert!(!meta.is_empty());
        assert!(meta.is_placeholder());
    }

    #[test]
    fn test_real_unknown_title_is_not_placeholder() {
        let meta = PaperMetadata::default().with_title("Unknown");
        assert!(!meta.is_placeholder());
    }

    #[test]
    fn test_author_list_skips_blanks() {
        let meta = PaperMetadata::default().with_authors(" A. Turing ,, J. von Neumann, ");
        assert_eq!(meta.author_list(), vec!["A. Turing", "J. von Neumann"]);
    }

    #[test]
    fn test_serializes_missing_fields_as_null() {
        let meta = PaperMetadata::default().with_title("Only Title");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["title"], "Only Title");
        assert!(json["authors"].is_null());
        assert!(json["year"].is_null());
    }
}
