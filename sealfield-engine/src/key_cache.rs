//! Decrypted-key cache.
//!
//! A shared read-through cache mapping wrapped-key ciphertext to its
//! unwrapped material, so a warm process resolves the master key without
//! a KMS round trip. Keyed by the wrapped ciphertext itself, which is a
//! stable identifier for the key version.
//!
//! Entries carry a time-to-live to bound how long unwrapped material
//! lives in the cache store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// External cache store contract (`get`/`set` over opaque strings).
#[async_trait]
pub trait KeyCache: Send + Sync {
    /// Returns the cached material for a wrapped key, if present and live.
    async fn get(&self, wrapped: &str) -> Option<String>;

    /// Stores unwrapped material under its wrapped ciphertext.
    async fn put(&self, wrapped: &str, material: &str);
}

struct CacheEntry {
    material: String,
    inserted_at: Instant,
}

/// In-process key cache with per-entry expiry.
pub struct InMemoryKeyCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl InMemoryKeyCache {
    /// Default liveness boundary for unwrapped key material.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }
}

impl Default for InMemoryKeyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyCache for InMemoryKeyCache {
    async fn get(&self, wrapped: &str) -> Option<String> {
        {
            let entries = self.entries.read().await;
            match entries.get(wrapped) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.material.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop the stale entry
        self.entries.write().await.remove(wrapped);
        None
    }

    async fn put(&self, wrapped: &str, material: &str) {
        self.entries.write().await.insert(
            wrapped.to_string(),
            CacheEntry {
                material: material.to_string(),
                inserted_at: Instant::now(),
            },
        );
    }
}
