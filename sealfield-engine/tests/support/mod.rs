//! Shared test fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use sealfield_engine::{
    initialize_master_key, EngineResult, FieldEngine, InMemoryKeyCache, InMemorySessionStore,
    InMemoryWrappedKeyStore, KeyManagement, MasterKeyResolver, SessionManager, SimulatedKms,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// KMS wrapper that counts unwrap calls.
pub struct CountingKms {
    inner: SimulatedKms,
    unwrap_calls: AtomicU32,
}

impl CountingKms {
    pub fn new(root_secret: &str) -> Self {
        Self {
            inner: SimulatedKms::with_latency(root_secret, Duration::ZERO),
            unwrap_calls: AtomicU32::new(0),
        }
    }

    pub fn unwrap_calls(&self) -> u32 {
        self.unwrap_calls.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self, n: u32) {
        self.inner.fail_next(n);
    }
}

#[async_trait]
impl KeyManagement for CountingKms {
    async fn wrap(&self, raw_key_material: &str) -> EngineResult<String> {
        self.inner.wrap(raw_key_material).await
    }

    async fn unwrap(&self, wrapped: &str) -> EngineResult<String> {
        self.unwrap_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.unwrap(wrapped).await
    }
}

pub struct TestHarness {
    pub engine: FieldEngine,
    pub kms: Arc<CountingKms>,
    pub sessions: Arc<InMemorySessionStore>,
}

/// Builds an engine over in-memory stores with a seeded master key.
pub async fn seeded_engine() -> TestHarness {
    let kms = Arc::new(CountingKms::new("test-kms-root"));
    let keys = Arc::new(InMemoryWrappedKeyStore::new());
    let sessions = Arc::new(InMemorySessionStore::new());

    initialize_master_key(kms.as_ref(), keys.as_ref())
        .await
        .unwrap();

    let resolver = MasterKeyResolver::new(keys, Arc::new(InMemoryKeyCache::new()), kms.clone());
    let engine = FieldEngine::new(resolver, SessionManager::new(sessions.clone()));

    TestHarness {
        engine,
        kms,
        sessions,
    }
}
