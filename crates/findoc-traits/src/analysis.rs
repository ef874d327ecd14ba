//! Structured analysis traits.
//!
//! A [`StructuredAnalyzer`] owns its prompt, schema and model contract. The
//! pipeline only sees text in and an [`InvestmentReport`] out.

use async_trait::async_trait;

use crate::error::TraitError;
use crate::model::InvestmentReport;

/// Converts statement text into a typed investment record.
#[async_trait]
pub trait StructuredAnalyzer: Send + Sync {
    /// Analyze extracted statement text.
    ///
    /// Timeouts, malformed model output and schema violations are all
    /// reported as errors. Any retry policy lives inside the implementation.
    async fn analyze(&self, text: &str) -> Result<InvestmentReport, TraitError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
