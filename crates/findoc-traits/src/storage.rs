//! Result storage traits.
//!
//! A [`ResultStore`] holds completed analyses for a bounded time. Entries are
//! immutable once stored: an overwrite replaces the whole entry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TraitError;
use crate::ids::AnalysisId;
use crate::model::AnalysisResult;

/// Time-bounded storage for analysis results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert or overwrite the entry for `result.analysis_id`, expiring
    /// `ttl` from now.
    ///
    /// The identifier must already be set; the store never generates one.
    async fn store(&self, result: AnalysisResult, ttl: Duration) -> Result<(), TraitError>;

    /// Fetch a result that is present and not yet expired.
    ///
    /// Expired entries are never returned, regardless of any background
    /// cleanup schedule.
    async fn get(&self, analysis_id: &AnalysisId) -> Option<Arc<AnalysisResult>>;

    /// Remove an entry. Idempotent.
    async fn delete(&self, analysis_id: &AnalysisId);
}
