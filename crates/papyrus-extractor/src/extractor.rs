//! Metadata extraction orchestrator

use crate::config::{ExtractorConfig, FallbackPolicy};
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::build_prompt;
use papyrus_domain::{BackendSelection, InferenceRequest, PaperMetadata};
use papyrus_llm::InferenceBackend;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The two inference backends the user can choose between
#[derive(Clone)]
pub struct Backends {
    remote: Arc<dyn InferenceBackend>,
    local: Arc<dyn InferenceBackend>,
}

impl Backends {
    /// Pair a remote and a local backend
    pub fn new(remote: Arc<dyn InferenceBackend>, local: Arc<dyn InferenceBackend>) -> Self {
        Self { remote, local }
    }

    /// Backend for `selection`
    pub fn get(&self, selection: BackendSelection) -> &dyn InferenceBackend {
        match selection {
            BackendSelection::Remote => self.remote.as_ref(),
            BackendSelection::Local => self.local.as_ref(),
        }
    }
}

/// Turns document text into a metadata record.
///
/// Builds the prompt, dispatches it to the selected backend and parses the
/// response. There are no retries at this layer. Cloning is cheap and clones
/// share the same backends.
#[derive(Clone)]
pub struct MetadataExtractor {
    backends: Backends,
    config: Arc<ExtractorConfig>,
}

impl MetadataExtractor {
    /// Create a new extractor
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if `config` fails validation.
    pub fn new(backends: Backends, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            backends,
            config: Arc::new(config),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract metadata from `document_text` using the selected backend
    pub async fn extract(
        &self,
        document_text: &str,
        selection: BackendSelection,
    ) -> Result<PaperMetadata, ExtractorError> {
        let prompt = build_prompt(document_text, self.config.max_chars);
        let request = InferenceRequest::new(self.config.system_instruction.as_str(), prompt);
        let backend = self.backends.get(selection);

        info!(
            backend = backend.name(),
            selection = %selection,
            chars = document_text.chars().count(),
            "Starting metadata extraction"
        );
        debug!("Prompt length: {} chars", request.user_prompt().len());

        let raw = backend.complete(&request).await.map_err(|e| {
            warn!(backend = backend.name(), "Inference failed: {}", e);
            ExtractorError::from(e)
        })?;

        debug!("Response length: {} chars", raw.len());

        match parse_llm_response(&raw) {
            Ok(metadata) => {
                info!(
                    title = metadata.title.as_deref().unwrap_or("<none>"),
                    "Metadata extracted"
                );
                Ok(metadata)
            }
            Err(ExtractorError::NoJsonFound { raw })
                if self.config.fallback_policy == FallbackPolicy::Placeholder =>
            {
                warn!(backend = backend.name(), "No JSON in response, using placeholder metadata");
                debug!(raw = %raw, "Raw response");
                Ok(PaperMetadata::fallback())
            }
            Err(e) => {
                match &e {
                    ExtractorError::NoJsonFound { raw } => {
                        warn!(backend = backend.name(), raw = %raw, "No JSON object in response");
                    }
                    ExtractorError::MalformedJson { candidate, reason } => {
                        warn!(backend = backend.name(), reason = %reason, "Malformed JSON in response");
                        debug!(candidate = %candidate, raw = %raw, "Raw response");
                    }
                    _ => {}
                }
                Err(e)
            }
        }
    }
}
