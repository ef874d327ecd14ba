//! # FinDoc Traits
//!
//! Data model and trait definitions for the FinDoc analysis pipeline.
//!
//! This crate contains the typed investment record and the collaborator
//! seams, with no runtime dependencies. Implementations live in separate
//! crates.
//!
//! ## Module Structure
//!
//! - [`ids`]: Analysis identifiers
//! - [`model`]: Investment record (totals, classification, stocks, fixed income)
//! - [`extraction`]: Traits for document text extraction
//! - [`analysis`]: Traits for structured analysis of extracted text
//! - [`storage`]: Traits for time-bounded result storage
//! - [`config`]: Engine configuration
//!
//! ## Dependency Injection
//!
//! The analysis engine uses these traits via dependency injection:
//!
//! ```ignore
//! AnalysisEngineBuilder::new()
//!     .with_extractor(impl TextExtractor)
//!     .with_analyzer(impl StructuredAnalyzer)
//!     .with_store(impl ResultStore)
//!     .with_config(EngineConfig::default())
//!     .build()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod extraction;
pub mod ids;
pub mod model;
pub mod storage;

// Re-export commonly used types
pub use error::TraitError;
pub use ids::AnalysisId;
pub use model::*;
