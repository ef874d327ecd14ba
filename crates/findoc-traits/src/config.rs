//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default result retention (30 minutes).
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default interval between expired-entry sweeps (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Analysis engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine name (for logs)
    pub name: String,

    /// How long a completed analysis stays retrievable
    pub result_ttl: Duration,

    /// How often expired results are swept from memory
    pub sweep_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "findoc".to_string(),
            result_ttl: DEFAULT_RESULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl EngineConfig {
    /// Retention window in whole minutes, rounded up, for client-facing messages.
    pub fn retention_minutes(&self) -> u64 {
        let secs = self.result_ttl.as_secs() + u64::from(self.result_ttl.subsec_nanos() > 0);
        secs.div_ceil(60)
    }
}
