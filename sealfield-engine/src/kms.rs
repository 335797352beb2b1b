//! Key-management abstraction.
//!
//! The master key is never persisted in the clear; it is wrapped and
//! unwrapped by a separate, higher-trust service reached over the network.
//! [`KeyManagement`] captures that contract as opaque strings so a managed
//! cloud KMS can be substituted without touching any caller.
//!
//! [`SimulatedKms`] stands in for the real service: a second symmetric
//! cipher keyed by a dedicated long-lived secret (distinct from the field
//! master key) plus an artificial latency modeling the round trip.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use sealfield_crypto::{FieldCipher, MasterKey};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Wrap/unwrap operations on master key material.
///
/// Both operations are free of side effects and safe to retry; transient
/// failures are retried by the resolver, persistent ones surface as
/// [`EngineError::KeyUnavailable`].
#[async_trait]
pub trait KeyManagement: Send + Sync {
    /// Encrypts raw key material under the KMS root key.
    async fn wrap(&self, raw_key_material: &str) -> EngineResult<String>;

    /// Decrypts previously wrapped key material.
    async fn unwrap(&self, wrapped: &str) -> EngineResult<String>;
}

/// In-process KMS simulation.
pub struct SimulatedKms {
    cipher: FieldCipher,
    latency: Duration,
    failures_remaining: AtomicU32,
}

impl SimulatedKms {
    /// Default artificial round-trip latency.
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

    /// Builds a simulated KMS keyed by a dedicated root secret.
    pub fn new(root_secret: impl Into<String>) -> Self {
        Self::with_latency(root_secret, Self::DEFAULT_LATENCY)
    }

    pub fn with_latency(root_secret: impl Into<String>, latency: Duration) -> Self {
        Self {
            cipher: FieldCipher::new(&MasterKey::from_material(root_secret)),
            latency,
            failures_remaining: AtomicU32::new(0),
        }
    }

    /// Makes the next `n` calls fail, to exercise caller retry paths.
    pub fn fail_next(&self, n: u32) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    async fn simulate_round_trip(&self) -> EngineResult<()> {
        tokio::time::sleep(self.latency).await;
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(EngineError::KeyUnavailable(
                "simulated transient failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyManagement for SimulatedKms {
    async fn wrap(&self, raw_key_material: &str) -> EngineResult<String> {
        self.simulate_round_trip().await?;
        self.cipher
            .encrypt(raw_key_material)
            .map_err(|e| EngineError::KeyUnavailable(e.to_string()))
    }

    async fn unwrap(&self, wrapped: &str) -> EngineResult<String> {
        self.simulate_round_trip().await?;
        self.cipher
            .decrypt(wrapped)
            .map_err(|e| EngineError::KeyUnavailable(e.to_string()))
    }
}
