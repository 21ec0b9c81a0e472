//! Papyrus Extractor
//!
//! Turns the plain text of a paper into a [`PaperMetadata`] record using an
//! LLM, and imports documents into a store with duplicate checks.
//!
//! # Architecture
//!
//! ```text
//! Document → TextExtractor → text → MetadataExtractor → PaperMetadata → PaperStore
//!                                     │
//!                                     ├─ build_prompt
//!                                     ├─ InferenceBackend (remote | local)
//!                                     └─ parse_llm_response
//! ```
//!
//! The [`Importer`] wraps the extractor with the duplicate guard: it checks the
//! file path before any costly work and the title before inserting.
//!
//! # Example Usage
//!
//! ```no_run
//! use papyrus_domain::BackendSelection;
//! use papyrus_extractor::{Backends, ExtractorConfig, MetadataExtractor};
//! use papyrus_llm::MockBackend;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backends = Backends::new(
//!     Arc::new(MockBackend::new(r#"{"title": "A Paper", "year": 2024}"#)),
//!     Arc::new(MockBackend::new("{}")),
//! );
//! let extractor = MetadataExtractor::new(backends, ExtractorConfig::default())?;
//!
//! let metadata = extractor.extract("full paper text...", BackendSelection::Remote).await?;
//! println!("{:?}", metadata.title);
//! # Ok(())
//! # }
//! ```
//!
//! [`PaperMetadata`]: papyrus_domain::PaperMetadata

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod extractor;
pub mod import;
pub mod parser;
pub mod prompt;

pub use config::{ExtractorConfig, FallbackPolicy};
pub use error::ExtractorError;
pub use extractor::{Backends, MetadataExtractor};
pub use import::{ImportOutcome, Importer};
pub use parser::parse_llm_response;
pub use prompt::{build_prompt, PromptBuilder};
