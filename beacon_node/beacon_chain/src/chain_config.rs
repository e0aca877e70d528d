use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// The maximum number of blocks a peer may return for a single `BlocksByRange` request.
pub const DEFAULT_MAX_BACKFILL_BATCH_SIZE: usize = 1024;

/// The time to wait for the validator pubkey cache before giving up on a backfill batch.
pub const DEFAULT_PUBKEY_CACHE_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum number of blocks accepted in a single backfill batch.
    ///
    /// Larger batches are rejected before any hashing takes place.
    pub max_backfill_batch_size: usize,
    /// How long a backfill batch waits to read the validator pubkey cache.
    pub pubkey_cache_lock_timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_backfill_batch_size: DEFAULT_MAX_BACKFILL_BATCH_SIZE,
            pubkey_cache_lock_timeout: DEFAULT_PUBKEY_CACHE_LOCK_TIMEOUT,
        }
    }
}
