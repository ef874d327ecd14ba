//! Builder pattern for the analysis engine.

use std::sync::Arc;

use findoc_traits::analysis::StructuredAnalyzer;
use findoc_traits::config::EngineConfig;
use findoc_traits::extraction::TextExtractor;
use findoc_traits::storage::ResultStore;

use crate::cache::ResultCache;
use crate::error::EngineError;
use crate::AnalysisEngine;

/// Builder for constructing an [`AnalysisEngine`].
pub struct AnalysisEngineBuilder {
    config: Option<EngineConfig>,
    extractor: Option<Arc<dyn TextExtractor>>,
    analyzer: Option<Arc<dyn StructuredAnalyzer>>,
    store: Option<Arc<dyn ResultStore>>,
    cache: Option<Arc<ResultCache>>,
}

impl AnalysisEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            extractor: None,
            analyzer: None,
            store: None,
            cache: None,
        }
    }

    /// Set the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the structured analyzer.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn StructuredAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Use an external result store. No sweeper is run for it.
    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self.cache = None;
        self
    }

    /// Use a specific in-memory cache, swept while the engine runs.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.store = None;
        self.cache = Some(cache);
        self
    }

    /// Build the analysis engine.
    ///
    /// Without an explicit store, a fresh [`ResultCache`] is created.
    pub fn build(self) -> Result<AnalysisEngine, EngineError> {
        let config = self.config.unwrap_or_default();

        if config.result_ttl.is_zero() {
            return Err(EngineError::ConfigError("result_ttl must be positive".into()));
        }
        if config.sweep_interval.is_zero() {
            return Err(EngineError::ConfigError(
                "sweep_interval must be positive".into(),
            ));
        }

        let extractor = self
            .extractor
            .ok_or_else(|| EngineError::ConfigError("extractor not configured".into()))?;

        let analyzer = self
            .analyzer
            .ok_or_else(|| EngineError::ConfigError("analyzer not configured".into()))?;

        let (store, cache) = match (self.store, self.cache) {
            (Some(store), _) => (store, None),
            (None, Some(cache)) => (cache.clone() as Arc<dyn ResultStore>, Some(cache)),
            (None, None) => {
                let cache = Arc::new(ResultCache::new());
                (cache.clone() as Arc<dyn ResultStore>, Some(cache))
            }
        };

        Ok(AnalysisEngine::new(config, extractor, analyzer, store, cache))
    }
}

impl Default for AnalysisEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
