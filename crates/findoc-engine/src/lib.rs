//! # FinDoc Engine
//!
//! The analysis pipeline and result cache for FinDoc.
//!
//! This crate provides:
//! - [`ResultCache`]: Concurrent in-memory store with per-entry expiry and a background sweeper
//! - [`AnalysisOrchestrator`]: The validate → extract → analyze → store pipeline
//! - [`AnalysisEngine`]: Owns the orchestrator and the sweeper lifecycle
//!
//! ## Architecture
//!
//! ```text
//! bytes ─> TextExtractor ─> text ─> StructuredAnalyzer ─> InvestmentReport
//!                                                              │
//!                               AnalysisId + expiry ───────────┴─> ResultStore
//!
//! AnalysisId ─> ResultStore ─> AnalysisResult (or not found)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let engine = AnalysisEngineBuilder::new()
//!     .with_extractor(Arc::new(PdfTextExtractor::new()))
//!     .with_analyzer(Arc::new(OpenAiAnalyzer::new(openai_config)?))
//!     .with_config(EngineConfig::default())
//!     .build()?;
//!
//! engine.start().await?;
//! let id = engine.orchestrator().process_document(bytes, "statement.pdf").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod cache;
pub mod error;
pub mod orchestrator;

// Re-exports
pub use builder::AnalysisEngineBuilder;
pub use cache::{ResultCache, SweeperHandle};
pub use error::{EngineError, StageError};
pub use orchestrator::{AnalysisOrchestrator, PipelineStage};

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use findoc_traits::analysis::StructuredAnalyzer;
use findoc_traits::config::EngineConfig;
use findoc_traits::extraction::TextExtractor;
use findoc_traits::storage::ResultStore;

/// The main analysis engine.
pub struct AnalysisEngine {
    /// Engine configuration
    config: EngineConfig,

    /// Pipeline controller
    orchestrator: Arc<AnalysisOrchestrator>,

    /// In-memory cache, when the engine owns one
    cache: Option<Arc<ResultCache>>,

    /// Running sweeper, if started
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl AnalysisEngine {
    /// Create a new analysis engine.
    pub fn new(
        config: EngineConfig,
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn StructuredAnalyzer>,
        store: Arc<dyn ResultStore>,
        cache: Option<Arc<ResultCache>>,
    ) -> Self {
        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            extractor,
            analyzer,
            store,
            config.result_ttl,
        ));

        Self {
            config,
            orchestrator,
            cache,
            sweeper: Mutex::new(None),
        }
    }

    /// Start background maintenance (the expired-result sweeper).
    ///
    /// Must be called from within a tokio runtime. Calling it twice is a no-op.
    pub async fn start(&self) -> Result<(), EngineError> {
        info!("Starting analysis engine: {}", self.config.name);

        if let Some(cache) = &self.cache {
            let mut sweeper = self.sweeper.lock();
            if sweeper.is_none() {
                *sweeper = Some(cache.spawn_sweeper(self.config.sweep_interval));
            }
        }

        info!(
            "Analysis engine started (results retained for {:?})",
            self.config.result_ttl
        );
        Ok(())
    }

    /// Stop background maintenance.
    pub async fn shutdown(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            handle.shutdown().await;
            info!("Analysis engine stopped");
        }
    }

    /// The pipeline controller.
    pub fn orchestrator(&self) -> &Arc<AnalysisOrchestrator> {
        &self.orchestrator
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The owned in-memory cache, if any.
    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    /// Whether the sweeper is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}
