//! Decision cache: prior judge verdicts keyed by operation fingerprint.

mod fingerprint;
mod store;

pub use fingerprint::{fingerprint, normalize_command};
pub use store::{CacheEntry, CacheStore, FileStore, MemoryStore};

use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::{debug, warn};

/// Write-through cache with lazy TTL eviction.
///
/// There is no background sweeper: an expired entry sits in the store until
/// the next lookup revalidates and deletes it. Store failures are logged
/// and treated as misses - the cache can degrade, never fail the pipeline.
pub struct DecisionCache<S> {
    store: S,
    ttl: Duration,
}

impl<S: CacheStore> DecisionCache<S> {
    pub fn new(store: S, ttl_secs: u64) -> Self {
        Self {
            store,
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Look up a prior verdict for this operation. `None` means no usable
    /// entry: absent, expired (deleted on the spot), or unreadable.
    pub async fn get(&self, profile: &str, tool_name: &str, input: &Value) -> Option<bool> {
        let key = fingerprint(profile, tool_name, input);

        let entry = match self.store.load(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                warn!(%key, error = %err, "dropping unreadable cache entry");
                let _ = self.store.remove(&key).await;
                return None;
            }
        };

        if Utc::now() - entry.created_at >= self.ttl {
            debug!(%key, "cache entry expired");
            if let Err(err) = self.store.remove(&key).await {
                warn!(%key, error = %err, "failed to remove expired cache entry");
            }
            return None;
        }

        Some(entry.approve)
    }

    /// Record a fresh judge verdict, overwriting any prior entry.
    pub async fn set(&self, profile: &str, tool_name: &str, input: &Value, approve: bool) {
        let key = fingerprint(profile, tool_name, input);
        if let Err(err) = self.store.save(&key, &CacheEntry::new(approve)).await {
            warn!(%key, error = %err, "failed to write cache entry");
        }
    }
}
