//! Persistence ports and first-run key seeding.
//!
//! The engine treats record persistence as an external collaborator: these
//! traits are the seam, and the in-memory implementations back tests and
//! single-process deployments.

use crate::error::{EngineError, EngineResult};
use crate::kms::KeyManagement;
use crate::types::{Session, SessionId, WrappedKeyRecord};
use async_trait::async_trait;
use sealfield_crypto::MasterKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage for the single active wrapped master key record.
#[async_trait]
pub trait WrappedKeyStore: Send + Sync {
    /// Returns the active record, or `None` if the system was never
    /// initialized.
    async fn active_record(&self) -> EngineResult<Option<WrappedKeyRecord>>;

    /// Persists the record produced at initialization.
    async fn put_record(&self, record: WrappedKeyRecord) -> EngineResult<()>;
}

/// Storage for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: SessionId) -> EngineResult<Option<Session>>;
    async fn put(&self, session: Session) -> EngineResult<()>;
}

/// In-memory wrapped-key store.
#[derive(Default)]
pub struct InMemoryWrappedKeyStore {
    record: Arc<RwLock<Option<WrappedKeyRecord>>>,
}

impl InMemoryWrappedKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WrappedKeyStore for InMemoryWrappedKeyStore {
    async fn active_record(&self) -> EngineResult<Option<WrappedKeyRecord>> {
        Ok(self.record.read().await.clone())
    }

    async fn put_record(&self, record: WrappedKeyRecord) -> EngineResult<()> {
        *self.record.write().await = Some(record);
        Ok(())
    }
}

/// In-memory session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: SessionId) -> EngineResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn put(&self, session: Session) -> EngineResult<()> {
        self.sessions.write().await.insert(session.id, session);
        Ok(())
    }
}

/// First-run seeding: generates a master key, wraps it through the KMS,
/// and persists the single active [`WrappedKeyRecord`].
///
/// Returns the generated key so a bootstrap path can use it immediately.
/// Fails with [`EngineError::AlreadyInitialized`] if a record exists; this
/// system does not rotate keys.
pub async fn initialize_master_key(
    kms: &dyn KeyManagement,
    store: &dyn WrappedKeyStore,
) -> EngineResult<MasterKey> {
    if store.active_record().await?.is_some() {
        return Err(EngineError::AlreadyInitialized);
    }

    let master_key = MasterKey::generate();
    let wrapped = kms.wrap(master_key.material()).await?;
    let record = WrappedKeyRecord::new(wrapped);
    debug!("seeded wrapped master key record {}", record.id);
    store.put_record(record).await?;

    Ok(master_key)
}
