//! Papyrus Domain Layer
//!
//! Core data model and boundary traits for the Papyrus paper manager.
//! The metadata-extraction pipeline and every infrastructure crate depend on
//! the types defined here; infrastructure implementations live elsewhere.
//!
//! ## Key Concepts
//!
//! - **PaperMetadata**: bibliographic record produced by one extraction, every field optional
//! - **InferenceRequest**: system instruction + user prompt handed to a backend
//! - **BackendSelection**: which inference backend the user has chosen (persisted setting)
//! - **StoredPaper**: a metadata record after the store has accepted it
//!
//! ## Boundaries
//!
//! Text extraction, credential storage and persistence are external
//! collaborators of the pipeline. They are expressed as traits in [`traits`]
//! so the pipeline can be exercised against any implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod metadata;
pub mod paper;
pub mod request;
pub mod selection;
pub mod traits;

// Re-exports for convenience
pub use metadata::PaperMetadata;
pub use paper::{DuplicateReason, Insertion, StoredPaper};
pub use request::InferenceRequest;
pub use selection::BackendSelection;
