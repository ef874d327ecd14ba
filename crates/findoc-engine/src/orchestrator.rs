//! Analysis pipeline.
//!
//! A document moves through
//! `Received → Validated → TextExtracted → Analyzed → Stored → Done`.
//! Steps run strictly in order; the only state shared between concurrent
//! runs is the result store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, info_span, warn, Instrument};

use findoc_traits::analysis::StructuredAnalyzer;
use findoc_traits::extraction::TextExtractor;
use findoc_traits::storage::ResultStore;
use findoc_traits::{
    AnalysisId, AnalysisResult, AssetClassification, FixedIncomePortfolio, StockPortfolio,
    TotalInvested,
};

use crate::error::{EngineError, StageError};

/// Pipeline states for a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Bytes accepted, nothing checked yet
    Received,
    /// Format signature verified
    Validated,
    /// Plain text available
    TextExtracted,
    /// Structured record produced
    Analyzed,
    /// Result handed to the store
    Stored,
    /// Identifier returned to the caller
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::TextExtracted => "text-extracted",
            PipelineStage::Analyzed => "analyzed",
            PipelineStage::Stored => "stored",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drives extraction, analysis and storage for uploaded documents, and
/// answers later lookups.
pub struct AnalysisOrchestrator {
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn StructuredAnalyzer>,
    store: Arc<dyn ResultStore>,
    result_ttl: Duration,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn StructuredAnalyzer>,
        store: Arc<dyn ResultStore>,
        result_ttl: Duration,
    ) -> Self {
        Self {
            extractor,
            analyzer,
            store,
            result_ttl,
        }
    }

    /// How long results stay retrievable.
    pub fn result_ttl(&self) -> Duration {
        self.result_ttl
    }

    /// Run the full pipeline and return the identifier of the stored result.
    ///
    /// Validation failures come back as [`EngineError::Validation`]; every
    /// other failure is collapsed into [`EngineError::Processing`] carrying
    /// the document name, the last stage completed and the cause.
    pub async fn process_document(
        &self,
        content: Bytes,
        display_name: &str,
    ) -> Result<AnalysisId, EngineError> {
        let span = info_span!("process_document", document = %display_name, size = content.len());
        self.run_pipeline(content, display_name).instrument(span).await
    }

    async fn run_pipeline(
        &self,
        content: Bytes,
        display_name: &str,
    ) -> Result<AnalysisId, EngineError> {
        let fail = |stage: PipelineStage, source: StageError| EngineError::Processing {
            document: display_name.to_string(),
            stage,
            source,
        };

        debug!(stage = %PipelineStage::Received, "Document received");

        if !self.extractor.is_valid_document(&content) {
            warn!("Rejected upload: bad format signature");
            return Err(EngineError::Validation(
                "the uploaded file is not a valid PDF document".into(),
            ));
        }
        debug!(stage = %PipelineStage::Validated, "Format signature accepted");

        let text = self
            .extractor
            .extract_text(content)
            .await
            .map_err(|e| fail(PipelineStage::Validated, StageError::Extraction(e)))?;

        if text.trim().is_empty() {
            warn!("Rejected upload: no extractable text");
            return Err(EngineError::Validation(
                "no text could be extracted from the document; it may be empty or contain only images"
                    .into(),
            ));
        }
        debug!(stage = %PipelineStage::TextExtracted, chars = text.len(), extractor = self.extractor.name(), "Text extracted");

        let report = self
            .analyzer
            .analyze(&text)
            .await
            .map_err(|e| fail(PipelineStage::TextExtracted, StageError::Analysis(e)))?;

        for advisory in report.advisories() {
            warn!(%advisory, "Analyzer returned a suspicious amount");
        }
        debug!(stage = %PipelineStage::Analyzed, analyzer = self.analyzer.name(), "Structured record produced");

        let analysis_id = AnalysisId::generate();
        let result = AnalysisResult::new(analysis_id, report, self.result_ttl)
            .map_err(|e| fail(PipelineStage::Analyzed, StageError::Storage(e)))?;
        self.store
            .store(result, self.result_ttl)
            .await
            .map_err(|e| fail(PipelineStage::Analyzed, StageError::Storage(e)))?;
        debug!(stage = %PipelineStage::Stored, %analysis_id, "Result stored");

        info!(stage = %PipelineStage::Done, %analysis_id, "Analysis complete");
        Ok(analysis_id)
    }

    /// The complete stored result.
    pub async fn get_analysis(&self, analysis_id: &AnalysisId) -> Option<Arc<AnalysisResult>> {
        self.store.get(analysis_id).await
    }

    /// Only the aggregate total.
    pub async fn get_total(&self, analysis_id: &AnalysisId) -> Option<TotalInvested> {
        self.store.get(analysis_id).await.map(|r| r.total.clone())
    }

    /// Only the asset-class breakdown.
    pub async fn get_classification(
        &self,
        analysis_id: &AnalysisId,
    ) -> Option<AssetClassification> {
        self.store
            .get(analysis_id)
            .await
            .map(|r| r.classification.clone())
    }

    /// Only the equity holdings.
    pub async fn get_stocks(&self, analysis_id: &AnalysisId) -> Option<StockPortfolio> {
        self.store.get(analysis_id).await.map(|r| r.stocks.clone())
    }

    /// Only the fixed-income holdings.
    pub async fn get_fixed_income(&self, analysis_id: &AnalysisId) -> Option<FixedIncomePortfolio> {
        self.store
            .get(analysis_id)
            .await
            .map(|r| r.fixed_income.clone())
    }

    /// Drop a result before it expires.
    pub async fn discard_analysis(&self, analysis_id: &AnalysisId) {
        self.store.delete(analysis_id).await;
    }
}
