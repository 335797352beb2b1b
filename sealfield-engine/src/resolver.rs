//! Master-key resolution.
//!
//! Orchestrates the wrapped-key store, the decrypted-key cache, and the
//! KMS to produce a ready-to-use [`FieldCipher`] for the current request.
//! No process-wide singleton: each request context holds a reference to
//! one resolver instance.

use crate::error::{EngineError, EngineResult};
use crate::key_cache::KeyCache;
use crate::kms::KeyManagement;
use crate::store::WrappedKeyStore;
use sealfield_crypto::{FieldCipher, MasterKey};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempts per resolution before a KMS failure is surfaced.
const MAX_UNWRAP_ATTEMPTS: u32 = 3;

/// Delay between unwrap retries.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Resolves the wrapped master key into a field cipher.
pub struct MasterKeyResolver {
    keys: Arc<dyn WrappedKeyStore>,
    cache: Arc<dyn KeyCache>,
    kms: Arc<dyn KeyManagement>,
}

impl MasterKeyResolver {
    pub fn new(
        keys: Arc<dyn WrappedKeyStore>,
        cache: Arc<dyn KeyCache>,
        kms: Arc<dyn KeyManagement>,
    ) -> Self {
        Self { keys, cache, kms }
    }

    /// Produces a [`FieldCipher`] bound to the current master key.
    ///
    /// Reads the single active wrapped-key record, consults the cache, and
    /// on a miss unwraps via the KMS (bounded retries) before populating
    /// the cache. A missing record is fatal and never retried.
    ///
    /// Two concurrent resolutions on a cold cache may both reach the KMS;
    /// both write identical material, so the race is benign.
    pub async fn resolve(&self) -> EngineResult<FieldCipher> {
        let record = self
            .keys
            .active_record()
            .await?
            .ok_or(EngineError::KeyRecordMissing)?;

        if let Some(material) = self.cache.get(&record.wrapped_key).await {
            debug!("master key cache hit");
            return Ok(FieldCipher::new(&MasterKey::from_material(material)));
        }

        let material = self.unwrap_with_retry(&record.wrapped_key).await?;
        // Only written after a successful unwrap
        self.cache.put(&record.wrapped_key, &material).await;

        Ok(FieldCipher::new(&MasterKey::from_material(material)))
    }

    async fn unwrap_with_retry(&self, wrapped: &str) -> EngineResult<String> {
        let mut last_error = None;
        for attempt in 1..=MAX_UNWRAP_ATTEMPTS {
            match self.kms.unwrap(wrapped).await {
                Ok(material) => {
                    debug!("master key unwrapped on attempt {attempt}");
                    return Ok(material);
                }
                Err(e) => {
                    warn!("KMS unwrap attempt {attempt}/{MAX_UNWRAP_ATTEMPTS} failed: {e}");
                    last_error = Some(e);
                    if attempt < MAX_UNWRAP_ATTEMPTS {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }

        Err(match last_error {
            Some(EngineError::KeyUnavailable(msg)) => EngineError::KeyUnavailable(msg),
            Some(other) => EngineError::KeyUnavailable(other.to_string()),
            None => EngineError::KeyUnavailable("unwrap never attempted".to_string()),
        })
    }
}
