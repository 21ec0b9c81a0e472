//! Configuration for the metadata extractor

use serde::{Deserialize, Serialize};

/// Default excerpt length handed to the model (characters)
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// System message sent with every extraction request
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a research assistant that extracts bibliographic metadata from academic papers. \
     You always answer with a single JSON object and nothing else.";

/// What to do when a backend answers without any JSON object.
///
/// Applies identically to both backends. Malformed JSON is never replaced
/// by the placeholder; only a response with no `{` at all is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Report [`crate::ExtractorError::NoJsonFound`]
    #[default]
    Propagate,
    /// Substitute [`papyrus_domain::PaperMetadata::fallback`]
    Placeholder,
}

/// Configuration for the [`crate::MetadataExtractor`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum document characters embedded in the prompt
    pub max_chars: usize,

    /// System message sent alongside the prompt
    pub system_instruction: String,

    /// Handling of responses that contain no JSON
    pub fallback_policy: FallbackPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            fallback_policy: FallbackPolicy::Propagate,
        }
    }
}

impl ExtractorConfig {
    /// Lenient preset: a longer excerpt and a placeholder record instead of
    /// a failure when the model ignores the JSON instruction
    pub fn lenient() -> Self {
        Self {
            max_chars: 8000,
            fallback_policy: FallbackPolicy::Placeholder,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chars == 0 {
            return Err("max_chars must be greater than 0".to_string());
        }
        if self.system_instruction.trim().is_empty() {
            return Err("system_instruction must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
