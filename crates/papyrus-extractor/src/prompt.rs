//! Prompt construction for metadata extraction

use crate::config::DEFAULT_MAX_CHARS;

/// Instructions preceding the document excerpt
const EXTRACTION_INSTRUCTIONS: &str = r#"Extract the following metadata from this academic paper:

1. title: The full title of the paper
2. authors: All author names as a single comma-separated string
3. publication: The journal, conference or venue where it was published
4. year: The publication year as an integer
5. summary: A 2-3 sentence summary of the paper's contribution

If a field cannot be determined, use null."#;

/// Output format reminder following the excerpt
const OUTPUT_FORMAT_REMINDER: &str = r#"Respond with ONLY valid JSON, no explanation. Use exactly this structure:
{"title": "...", "authors": "...", "publication": "...", "year": 2024, "summary": "..."}"#;

/// Builds the user prompt for a metadata extraction call
pub struct PromptBuilder<'a> {
    text: &'a str,
    max_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder over the full document text
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    /// Limit the excerpt to `max_chars` characters
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let excerpt = truncate_excerpt(self.text, self.max_chars);

        let mut prompt = String::with_capacity(
            EXTRACTION_INSTRUCTIONS.len() + excerpt.len() + OUTPUT_FORMAT_REMINDER.len() + 32,
        );
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\nPaper text:\n---\n");
        prompt.push_str(excerpt);
        prompt.push_str("\n---\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

/// Render the extraction prompt for `document_text`.
///
/// Pure and deterministic; the document is cut to its first `max_chars`
/// characters with no regard for word or sentence boundaries.
///
/// # Examples
///
/// ```
/// use papyrus_extractor::build_prompt;
///
/// let prompt = build_prompt("Deep Residual Learning for Image Recognition", 4000);
/// assert!(prompt.contains("Deep Residual Learning"));
/// assert!(prompt.contains("ONLY valid JSON"));
/// ```
pub fn build_prompt(document_text: &str, max_chars: usize) -> String {
    PromptBuilder::new(document_text).with_max_chars(max_chars).build()
}

/// First `max_chars` characters of `text`
pub fn truncate_excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_to_exact_char_count() {
        // '~' does not occur in the template
        let text = "~".repeat(5000);
        let prompt = build_prompt(&text, 4000);
        assert_eq!(prompt.matches('~').count(), 4000);
    }

    #[test]
    fn test_short_text_is_kept_whole() {
        let prompt = build_prompt("short paper", 4000);
        assert!(prompt.contains("---\nshort paper\n---"));
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(truncate_excerpt(&text, 3), "ééé");
        assert_eq!(truncate_excerpt(&text, 10), text);
        assert_eq!(truncate_excerpt(&text, 0), "");
    }

    #[test]
    fn test_is_deterministic() {
        let text = "Some paper body. ".repeat(400);
        assert_eq!(build_prompt(&text, 1234), build_prompt(&text, 1234));
    }

    #[test]
    fn test_template_contents() {
        let prompt = build_prompt("body", 4000);
        for field in ["title", "authors", "publication", "year", "summary"] {
            assert!(prompt.contains(field), "missing field {}", field);
        }
        assert!(prompt.contains("comma-separated"));
        assert!(prompt.contains("as an integer"));
        assert!(prompt.contains("2-3 sentence"));
        assert!(prompt.contains("ONLY valid JSON, no explanation"));
        assert!(prompt.contains(
            r#"{"title": "...", "authors": "...", "publication": "...", "year": 2024, "summary": "..."}"#
        ));
    }

    #[test]
    fn test_excerpt_sits_between_instructions_and_reminder() {
        let prompt = build_prompt("UNIQUE_BODY_MARKER", 4000);
        let body = prompt.find("UNIQUE_BODY_MARKER").unwrap();
        assert!(prompt.find("Extract the following").unwrap() < body);
        assert!(body < prompt.find("ONLY valid JSON").unwrap());
    }

    #[test]
    fn test_default_max_chars() {
        let text = "~".repeat(DEFAULT_MAX_CHARS + 10);
        let prompt = PromptBuilder::new(&text).build();
        assert_eq!(prompt.matches('~').count(), DEFAULT_MAX_CHARS);
    }
}
