//! Encryption-mode state machine.
//!
//! A session is always in exactly one of two modes, `server` or `client`,
//! and only an explicit, two-phase change moves it: `propose_mode_change`
//! records the intent and hands back a token, `commit_mode_change` applies
//! it. The split keeps an accidental call from silently flipping a session
//! into a mode whose data its holder cannot read.
//!
//! Nothing on the session mutates until commit; an unknown token commits
//! nothing.

use crate::error::{EngineError, EngineResult};
use crate::store::SessionStore;
use crate::types::{EncryptionMode, Session, SessionId, UserId};
use chrono::Utc;
use sealfield_crypto::parse_public_key;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Single-use handle for a proposed mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeToken(pub Uuid);

impl ChangeToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct PendingModeChange {
    session_id: SessionId,
    target_mode: EncryptionMode,
    public_key_pem: Option<String>,
}

/// Session lifecycle and mode transitions.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    pending: Arc<RwLock<HashMap<ChangeToken, PendingModeChange>>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            pending: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates and persists a fresh server-mode session.
    pub async fn create_session(&self, user_id: UserId) -> EngineResult<Session> {
        let session = Session::new(user_id);
        self.store.put(session.clone()).await?;
        debug!("created session {} for user {user_id}", session.id);
        Ok(session)
    }

    /// Loads a session, rejecting unknown and revoked ones.
    pub async fn active_session(&self, id: SessionId) -> EngineResult<Session> {
        let session = self
            .store
            .get(id)
            .await?
            .ok_or(EngineError::SessionNotFound(id))?;
        if session.revoked {
            return Err(EngineError::SessionRevoked(id));
        }
        Ok(session)
    }

    /// Marks a session revoked. Terminal; the session rejects every engine
    /// operation afterwards.
    pub async fn revoke(&self, id: SessionId) -> EngineResult<()> {
        let mut session = self
            .store
            .get(id)
            .await?
            .ok_or(EngineError::SessionNotFound(id))?;
        session.revoked = true;
        session.updated_at = Utc::now();
        self.store.put(session).await
    }

    /// Phase one: validates and registers a mode change, returning the
    /// token that commits it.
    ///
    /// Switching to client mode requires a public key, supplied here or
    /// already on the session; the PEM is parsed eagerly so a bad key
    /// fails now instead of on the first read. The session itself is not
    /// touched.
    pub async fn propose_mode_change(
        &self,
        session_id: SessionId,
        target_mode: EncryptionMode,
        public_key_pem: Option<String>,
    ) -> EngineResult<ChangeToken> {
        let session = self.active_session(session_id).await?;

        let public_key_pem = match target_mode {
            EncryptionMode::Client => {
                let pem = public_key_pem
                    .or(session.public_key_pem)
                    .ok_or(EngineError::MissingKeyMaterial)?;
                parse_public_key(&pem)?;
                Some(pem)
            }
            EncryptionMode::Server => None,
        };

        let token = ChangeToken::new();
        self.pending.write().await.insert(
            token,
            PendingModeChange {
                session_id,
                target_mode,
                public_key_pem,
            },
        );
        debug!("proposed {target_mode} mode for session {session_id}");
        Ok(token)
    }

    /// Phase two: consumes the token and applies the change.
    ///
    /// An unknown (or already consumed) token fails with
    /// [`EngineError::UnknownModeChange`] and mutates nothing. Moving to
    /// server mode clears the stored public key.
    pub async fn commit_mode_change(&self, token: ChangeToken) -> EngineResult<Session> {
        let change = self
            .pending
            .write()
            .await
            .remove(&token)
            .ok_or(EngineError::UnknownModeChange)?;

        let mut session = self.active_session(change.session_id).await?;
        session.encryption_mode = change.target_mode;
        session.public_key_pem = match change.target_mode {
            EncryptionMode::Client => change.public_key_pem,
            EncryptionMode::Server => None,
        };
        session.updated_at = Utc::now();

        self.store.put(session.clone()).await?;
        debug!(
            "session {} committed to {} mode",
            session.id, session.encryption_mode
        );
        Ok(session)
    }
}
