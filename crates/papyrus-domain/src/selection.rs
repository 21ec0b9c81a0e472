//! Inference backend selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which inference backend the user has chosen.
///
/// This is a persisted, process-wide setting. The pipeline reads it once at
/// the start of each extraction and never changes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSelection {
    /// Hosted chat-completion API
    #[default]
    Remote,
    /// Bundled quantized model run in-process
    Local,
}

impl BackendSelection {
    /// Stable identifier used in configuration files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendSelection::Remote => "remote",
            BackendSelection::Local => "local",
        }
    }
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" | "api" | "openai" => Ok(BackendSelection::Remote),
            "local" | "bundled" => Ok(BackendSelection::Local),
            other => Err(format!("Unknown backend: {}", other)),
        }
    }
}
