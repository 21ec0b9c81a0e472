//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction pipeline error
    #[error("{}", .0.user_message())]
    Extractor(#[from] papyrus_extractor::ExtractorError),

    /// Inference backend error
    #[error("Backend error: {0}")]
    Llm(#[from] papyrus_llm::LlmError),

    /// Credential storage error
    #[error("Credential error: {0}")]
    Credential(#[from] papyrus_llm::CredentialError),

    /// Library database error
    #[error("Store error: {0}")]
    Store(#[from] papyrus_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some documents could not be imported
    #[error("{failed} of {total} file(s) failed to import")]
    Import {
        /// Documents that failed for a reason other than being a duplicate
        failed: usize,
        /// Documents attempted
        total: usize,
    },
}
