//! Local Model Runtime Backend
//!
//! Runs a bundled quantized model without any network access. The model
//! artifact lives in a fixed resource directory shipped with the application;
//! callers never pass a model path at call time.
//!
//! # Architecture
//!
//! ```text
//! InferenceRequest → ChatTemplate::render → ModelRuntime::generate → text
//! ```
//!
//! The [`ModelRuntime`] trait is the seam to the actual inference engine.
//! [`LlamaCppRuntime`] drives a bundled llama.cpp executable; tests plug in
//! their own runtime.

use crate::template::ChatTemplate;
use crate::{InferenceBackend, LlmError};
use async_trait::async_trait;
use papyrus_domain::InferenceRequest;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Magic bytes at the start of every GGUF model file
const GGUF_MAGIC: &[u8; 4] = b"GGUF";

/// Default model file name inside the resource directory
pub const DEFAULT_MODEL_FILE: &str = "model.gguf";

/// Default llama.cpp executable name
pub const DEFAULT_RUNTIME_BINARY: &str = "llama-cli";

/// Configuration for the local backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    /// Directory holding the bundled model (and optionally the runtime binary)
    pub resource_dir: PathBuf,

    /// Model file name inside `resource_dir`
    pub model_file: String,

    /// Runtime executable; looked up in `resource_dir` first, then on `PATH`
    pub runtime_binary: String,

    /// Conversational template the model expects
    pub template: ChatTemplate,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Context window size
    pub context_size: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on a single generation, in seconds
    pub timeout_secs: u64,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            resource_dir: default_resource_dir(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            runtime_binary: DEFAULT_RUNTIME_BINARY.to_string(),
            template: ChatTemplate::default(),
            max_tokens: 512,
            context_size: 4096,
            temperature: 0.1,
            timeout_secs: 300,
        }
    }
}

impl LocalModelConfig {
    /// Location of the bundled model artifact
    pub fn artifact_path(&self) -> PathBuf {
        self.resource_dir.join(&self.model_file)
    }

    /// Generation parameters derived from this configuration
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            context_size: self.context_size,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// `resources/` next to the running executable, or `./resources` if the
/// executable path cannot be determined.
pub fn default_resource_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("resources")))
        .unwrap_or_else(|| PathBuf::from("resources"))
}

/// Sampling parameters for one generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Context window size
    pub context_size: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on wall-clock time
    pub timeout: Duration,
}

/// Inference engine able to run a model artifact.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Verify the artifact can be initialized. Called once per backend.
    async fn load(&self, artifact: &Path) -> Result<(), LlmError>;

    /// Generate a completion for an already-templated prompt
    async fn generate(
        &self,
        artifact: &Path,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmError>;
}

/// Runtime backed by a bundled llama.cpp command-line executable.
///
/// Each generation runs the executable non-interactively and collects its
/// standard output.
#[derive(Debug, Clone)]
pub struct LlamaCppRuntime {
    binary: PathBuf,
}

impl LlamaCppRuntime {
    /// Use the given executable
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// Prefer an executable bundled in the resource directory, fall back to `PATH`
    pub fn from_config(config: &LocalModelConfig) -> Self {
        let bundled = config.resource_dir.join(&config.runtime_binary);
        if bundled.is_file() {
            Self::new(bundled)
        } else {
            Self::new(&config.runtime_binary)
        }
    }

    /// Path of the executable in use
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, artifact: &Path, prompt: &str, params: &GenerationParams) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-m")
            .arg(artifact)
            .arg("-p")
            .arg(prompt)
            .arg("-n")
            .arg(params.max_tokens.to_string())
            .arg("-c")
            .arg(params.context_size.to_string())
            .arg("--temp")
            .arg(params.temperature.to_string())
            .arg("--no-display-prompt")
            .arg("-no-cnv")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ModelRuntime for LlamaCppRuntime {
    async fn load(&self, artifact: &Path) -> Result<(), LlmError> {
        let mut file = tokio::fs::File::open(artifact).await.map_err(|e| {
            LlmError::Unavailable(format!("Cannot open model {}: {}", artifact.display(), e))
        })?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic).await.map_err(|e| {
            LlmError::Unavailable(format!("Cannot read model {}: {}", artifact.display(), e))
        })?;

        if &magic != GGUF_MAGIC {
            return Err(LlmError::Unavailable(format!(
                "{} is not a GGUF model",
                artifact.display()
            )));
        }

        Ok(())
    }

    async fn generate(
        &self,
        artifact: &Path,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmError> {
        let child = self
            .command(artifact, prompt, params)
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    LlmError::Unavailable(format!(
                        "Model runtime {} is not installed",
                        self.binary.display()
                    ))
                } else {
                    LlmError::Runtime(format!("Failed to start model runtime: {}", e))
                }
            })?;

        let output = tokio::time::timeout(params.timeout, child.wait_with_output())
            .await
            .map_err(|_| LlmError::Timeout(params.timeout.as_secs()))?
            .map_err(|e| LlmError::Runtime(format!("Model runtime failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(5)..].join("\n");
            return Err(LlmError::Runtime(format!(
                "Model runtime exited with {}: {}",
                output.status, tail
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Inference backend running a bundled model through a [`ModelRuntime`].
pub struct LocalModelBackend<R = LlamaCppRuntime> {
    config: LocalModelConfig,
    runtime: R,
    loaded: OnceCell<PathBuf>,
}

impl LocalModelBackend<LlamaCppRuntime> {
    /// Create a backend using the llama.cpp runtime described by `config`
    pub fn new(config: LocalModelConfig) -> Self {
        let runtime = LlamaCppRuntime::from_config(&config);
        Self::with_runtime(config, runtime)
    }
}

impl<R: ModelRuntime> LocalModelBackend<R> {
    /// Create a backend with a custom runtime
    pub fn with_runtime(config: LocalModelConfig, runtime: R) -> Self {
        Self {
            config,
            runtime,
            loaded: OnceCell::new(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &LocalModelConfig {
        &self.config
    }

    /// True once the model has been initialized successfully
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Locate the bundled artifact and initialize it on first use.
    async fn ensure_loaded(&self) -> Result<&Path, LlmError> {
        let artifact = self.config.artifact_path();
        let is_file = tokio::fs::metadata(&artifact)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(LlmError::Unavailable(format!(
                "Bundled model not found at {}",
                artifact.display()
            )));
        }

        let loaded = self
            .loaded
            .get_or_try_init(|| async {
                info!(model = %artifact.display(), "Loading local model");
                self.runtime.load(&artifact).await.map_err(|e| match e {
                    LlmError::Unavailable(_) => e,
                    other => LlmError::Unavailable(format!("Model failed to initialize: {}", other)),
                })?;
                Ok::<_, LlmError>(artifact.clone())
            })
            .await?;

        Ok(loaded.as_path())
    }
}

#[async_trait]
impl<R: ModelRuntime> InferenceBackend for LocalModelBackend<R> {
    fn name(&self) -> &str {
        "local"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String, LlmError> {
        let artifact = self.ensure_loaded().await?;

        let prompt = self
            .config
            .template
            .render(request.system_instruction(), request.user_prompt());

        debug!(template = ?self.config.template, prompt_chars = prompt.len(), "Running local inference");

        self.runtime
            .generate(artifact, &prompt, &self.config.generation_params())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRuntime {
        loads: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        fail_load: bool,
    }

    #[async_trait]
    impl ModelRuntime for RecordingRuntime {
        async fn load(&self, _artifact: &Path) -> Result<(), LlmError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                return Err(LlmError::Runtime("bad tensor layout".to_string()));
            }
            Ok(())
        }

        async fn generate(
            &self,
            _artifact: &Path,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(r#"{"title": "Local"}"#.to_string())
        }
    }

    fn config_in(dir: &Path) -> LocalModelConfig {
        LocalModelConfig {
            resource_dir: dir.to_path_buf(),
            ..LocalModelConfig::default()
        }
    }

    #[tokio::test]
    async fn test_missing_artifact_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalModelBackend::with_runtime(config_in(dir.path()), RecordingRuntime::default());

        let err = backend
            .complete(&InferenceRequest::new("s", "p"))
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
        assert_eq!(backend.runtime.loads.load(Ordering::SeqCst), 0);
        assert!(backend.runtime.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loads_once_and_renders_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_MODEL_FILE), b"GGUF....").unwrap();
        let backend = LocalModelBackend::with_runtime(config_in(dir.path()), RecordingRuntime::default());

        let req = InferenceRequest::new("SYSTEM", "PROMPT");
        assert_eq!(backend.complete(&req).await.unwrap(), r#"{"title": "Local"}"#);
        backend.complete(&req).await.unwrap();

        assert!(backend.is_loaded());
        assert_eq!(backend.runtime.loads.load(Ordering::SeqCst), 1);

        let prompts = backend.runtime.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], ChatTemplate::ChatMl.render("SYSTEM", "PROMPT"));
    }

    #[tokio::test]
    async fn test_failed_initialization_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_MODEL_FILE), b"GGUF").unwrap();
        let runtime = RecordingRuntime {
            fail_load: true,
            ..RecordingRuntime::default()
        };
        let backend = LocalModelBackend::with_runtime(config_in(dir.path()), runtime);

        let err = backend
            .complete(&InferenceRequest::new("s", "p"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Unavailable(ref msg) if msg.contains("bad tensor layout")));
        assert!(!backend.is_loaded());
    }

    #[tokio::test]
    async fn test_llama_cpp_rejects_non_gguf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"PK\x03\x04zip").unwrap();

        let err = LlamaCppRuntime::new("llama-cli").load(&path).await.unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(ref msg) if msg.contains("not a GGUF")));
    }

    #[tokio::test]
    async fn test_llama_cpp_accepts_gguf_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");
        std::fs::write(&path, b"GGUF\x03\x00\x00\x00").unwrap();

        assert!(LlamaCppRuntime::new("llama-cli").load(&path).await.is_ok());
    }

    #[tokio::test]
    async fn test_llama_cpp_missing_binary_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = LlamaCppRuntime::new(dir.path().join("no-such-llama-binary"));
        let params = LocalModelConfig::default().generation_params();

        let err = runtime
            .generate(&dir.path().join("model.gguf"), "prompt", &params)
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_from_config_prefers_bundled_binary() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        assert_eq!(LlamaCppRuntime::from_config(&config).binary(), Path::new(DEFAULT_RUNTIME_BINARY));

        std::fs::write(dir.path().join(DEFAULT_RUNTIME_BINARY), b"#!/bin/sh\n").unwrap();
        assert_eq!(
            LlamaCppRuntime::from_config(&config).binary(),
            dir.path().join(DEFAULT_RUNTIME_BINARY)
        );
    }
}
