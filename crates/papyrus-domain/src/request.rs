//! Inference request value

/// A single request to an inference backend.
///
/// Constructed fresh for every call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    system_instruction: String,
    user_prompt: String,
}

impl InferenceRequest {
    /// Create a new request from a system instruction and a user prompt
    pub fn new(system_instruction: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_prompt: user_prompt.into(),
        }
    }

    /// The fixed instruction sent as the system message
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// The rendered extraction prompt sent as the user message
    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }
}
