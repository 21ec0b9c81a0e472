//! Papyrus Inference Backends
//!
//! Interchangeable inference providers behind a single capability,
//! [`InferenceBackend::complete`], so the metadata extractor never branches
//! on which backend is in use.
//!
//! # Backends
//!
//! - [`RemoteChatBackend`]: hosted chat-completion API, authenticated with an API key
//! - [`LocalModelBackend`]: bundled quantized model driven by a local runtime
//! - [`MockBackend`]: deterministic double that records every request
//!
//! # Examples
//!
//! ```
//! use papyrus_llm::{InferenceBackend, MockBackend};
//! use papyrus_domain::InferenceRequest;
//!
//! # async fn example() {
//! let backend = MockBackend::new(r#"{"title": "Hello"}"#);
//! let request = InferenceRequest::new("system", "prompt");
//! let text = backend.complete(&request).await.unwrap();
//! assert_eq!(text, r#"{"title": "Hello"}"#);
//! assert_eq!(backend.call_count(), 1);
//! # }
//! ```

#![warn(missing_docs)]

pub mod credentials;
pub mod local;
pub mod remote;
pub mod template;

use async_trait::async_trait;
use papyrus_domain::InferenceRequest;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use credentials::{CredentialError, EnvCredentialStore, FileCredentialStore, StaticCredential, DEFAULT_KEY_VARS};
pub use local::{GenerationParams, LlamaCppRuntime, LocalModelBackend, LocalModelConfig, ModelRuntime};
pub use remote::{RemoteChatBackend, RemoteChatConfig};
pub use template::ChatTemplate;

/// Errors that can occur during inference
#[derive(Error, Debug)]
pub enum LlmError {
    /// The backend is misconfigured and cannot run (no credential, missing model)
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The backend answered, but not with usable text
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The local runtime failed while generating
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Generation did not finish in time
    #[error("Inference timed out after {0}s")]
    Timeout(u64),
}

impl LlmError {
    /// True for misconfiguration errors that no amount of retrying will fix
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LlmError::Unavailable(_))
    }
}

/// The single capability every inference backend provides.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Run the request to completion and return the raw response text.
    ///
    /// Suspends only the calling task until the full text is available; no
    /// partial output is exposed.
    async fn complete(&self, request: &InferenceRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Respond(String),
    Unavailable(String),
    Fail(String),
}

/// Mock backend for deterministic testing
///
/// Returns a pre-configured outcome without any I/O and records every request
/// it receives. Clones share the same request log.
///
/// # Examples
///
/// ```
/// use papyrus_llm::MockBackend;
///
/// let backend = MockBackend::unavailable("no key");
/// assert_eq!(backend.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    name: String,
    outcome: MockOutcome,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl MockBackend {
    /// Create a mock that answers every request with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Respond(response.into()))
    }

    /// Create a mock that reports itself as unavailable
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Unavailable(reason.into()))
    }

    /// Create a mock that fails with a communication error
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Fail(reason.into()))
    }

    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            name: "mock".to_string(),
            outcome,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Rename the mock (shows up in logs)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every request received so far, in call order
    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match &self.outcome {
            MockOutcome::Respond(text) => Ok(text.clone()),
            MockOutcome::Unavailable(reason) => Err(LlmError::Unavailable(reason.clone())),
            MockOutcome::Fail(reason) => Err(LlmError::Communication(reason.clone())),
        }
    }
}
