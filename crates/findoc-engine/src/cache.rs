//! In-memory result cache with per-entry expiry.
//!
//! Expiry is enforced on every read; the background sweeper only reclaims
//! memory held by entries nobody reads again.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use findoc_traits::storage::ResultStore;
use findoc_traits::{AnalysisId, AnalysisResult, TraitError};

/// Concurrent analysis result cache.
pub struct ResultCache {
    entries: DashMap<AnalysisId, CacheEntry>,
}

struct CacheEntry {
    result: Arc<AnalysisResult>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl ResultCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert or overwrite a result, expiring `ttl` from now.
    pub fn insert(&self, result: AnalysisResult, ttl: Duration) -> Result<(), TraitError> {
        if result.analysis_id.is_nil() {
            return Err(TraitError::InvalidInput(
                "analysis id must be set before storing".into(),
            ));
        }
        if ttl.is_zero() {
            return Err(TraitError::InvalidInput("ttl must be positive".into()));
        }
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| TraitError::InvalidInput("ttl out of range".into()))?;

        self.entries.insert(
            result.analysis_id,
            CacheEntry {
                result: Arc::new(result),
                expires_at,
            },
        );
        Ok(())
    }

    /// Get a live result, evicting it if it has expired.
    pub fn lookup(&self, analysis_id: &AnalysisId) -> Option<Arc<AnalysisResult>> {
        let now = Instant::now();
        {
            let entry = self.entries.get(analysis_id)?;
            if !entry.is_expired(now) {
                return Some(entry.result.clone());
            }
        }

        // Re-check under the shard lock so a fresh overwrite racing this read survives.
        self.entries.remove_if(analysis_id, |_, e| e.is_expired(now));
        None
    }

    /// Remove a result if present.
    pub fn remove(&self, analysis_id: &AnalysisId) -> Option<Arc<AnalysisResult>> {
        self.entries.remove(analysis_id).map(|(_, e)| e.result)
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, e| {
            let keep = !e.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of entries held, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Start a background task that purges expired entries every `every`.
    ///
    /// The task only holds a weak reference and exits once the cache is
    /// dropped, [`SweeperHandle::shutdown`] is called, or the handle is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> SweeperHandle {
        let every = every.max(Duration::from_millis(1));
        let cache: Weak<ResultCache> = Arc::downgrade(self);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else {
                            debug!("Result cache dropped, sweeper exiting");
                            break;
                        };
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!(removed, remaining = cache.len(), "Swept expired analysis results");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Result sweeper stopping");
                        break;
                    }
                }
            }
        });

        info!("Result sweeper running every {:?}", every);
        SweeperHandle { shutdown_tx, task }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultStore for ResultCache {
    async fn store(&self, result: AnalysisResult, ttl: Duration) -> Result<(), TraitError> {
        self.insert(result, ttl)
    }

    async fn get(&self, analysis_id: &AnalysisId) -> Option<Arc<AnalysisResult>> {
        self.lookup(analysis_id)
    }

    async fn delete(&self, analysis_id: &AnalysisId) {
        self.remove(analysis_id);
    }
}

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for the task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.task.await;
    }

    /// Whether the sweeper task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
