//! Error types for metadata extraction and import

use papyrus_domain::DuplicateReason;
use papyrus_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while extracting or importing a paper
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The selected backend cannot run at all (missing key, missing model)
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend ran but the call failed
    #[error("Backend error: {0}")]
    BackendError(String),

    /// The response contained no `{`
    #[error("No JSON object found in response")]
    NoJsonFound {
        /// Full response text
        raw: String,
    },

    /// The JSON candidate could not be decoded as an object
    #[error("Malformed JSON: {reason}")]
    MalformedJson {
        /// The sliced candidate that failed to decode
        candidate: String,
        /// Decoder message
        reason: String,
    },

    /// The document yielded no text
    #[error("Text extraction failed: {0}")]
    TextExtraction(String),

    /// A matching paper is already stored
    #[error("Duplicate: {0}")]
    Duplicate(DuplicateReason),

    /// Persistence failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Message suitable for showing to a user.
    ///
    /// Parse failures collapse to a generic message; their raw text goes to
    /// the log instead.
    pub fn user_message(&self) -> String {
        match self {
            ExtractorError::BackendUnavailable(reason) => format!(
                "The selected backend is not available ({}). Check your API key or switch backends.",
                reason
            ),
            ExtractorError::BackendError(reason) => format!("The backend request failed: {}", reason),
            ExtractorError::NoJsonFound { .. } | ExtractorError::MalformedJson { .. } => {
                "Analysis failed: the model did not return usable metadata.".to_string()
            }
            ExtractorError::TextExtraction(_) => "Could not extract text from the document.".to_string(),
            ExtractorError::Duplicate(reason) => reason.to_string(),
            ExtractorError::Store(reason) => format!("Could not save the paper: {}", reason),
            ExtractorError::Config(reason) => format!("Invalid configuration: {}", reason),
        }
    }

    /// Whether this failure came from parsing the model's response
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            ExtractorError::NoJsonFound { .. } | ExtractorError::MalformedJson { .. }
        )
    }
}

impl From<LlmError> for ExtractorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Unavailable(reason) => ExtractorError::BackendUnavailable(reason),
            other => ExtractorError::BackendError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_mapping() {
        let err: ExtractorError = LlmError::Unavailable("API key not set".to_string()).into();
        assert!(matches!(err, ExtractorError::BackendUnavailable(ref r) if r == "API key not set"));

        let err: ExtractorError = LlmError::Timeout(60).into();
        assert!(matches!(err, ExtractorError::BackendError(_)));

        let err: ExtractorError = LlmError::Communication("HTTP 500".to_string()).into();
        assert!(matches!(err, ExtractorError::BackendError(ref r) if r.contains("HTTP 500")));
    }

    #[test]
    fn test_parse_failures_hide_raw_text() {
        let err = ExtractorError::NoJsonFound {
            raw: "I cannot help with that".to_string(),
        };
        assert!(err.is_parse_failure());
        assert!(!err.user_message().contains("cannot help"));

        let err = ExtractorError::MalformedJson {
            candidate: "{oops}".to_string(),
            reason: "key must be a string".to_string(),
        };
        assert!(err.user_message().starts_with("Analysis failed"));
    }

    #[test]
    fn test_backend_error_is_surfaced_verbatim() {
        let err = ExtractorError::BackendError("HTTP 429: rate limited".to_string());
        assert!(err.user_message().contains("HTTP 429: rate limited"));
    }
}
