//! Engine facade.
//!
//! Ties the master-key resolver, field codecs, and session state machine
//! into the surface collaborators call: encode on write, decode on read,
//! with the session's encryption mode deciding whether decoded fields
//! leave as plaintext or re-encrypted for the session's public key.

use crate::codec::{ClientFieldCodec, FieldCodec, ServerFieldCodec};
use crate::error::{EngineError, EngineResult};
use crate::resolver::MasterKeyResolver;
use crate::session::{ChangeToken, SessionManager};
use crate::types::{EncryptionMode, SensitiveRecord, Session, SessionId, UserId};
use sealfield_crypto::{encrypt_for_recipient, FieldCipher};

/// Field-level envelope encryption engine.
pub struct FieldEngine {
    resolver: MasterKeyResolver,
    sessions: SessionManager,
}

impl FieldEngine {
    pub fn new(resolver: MasterKeyResolver, sessions: SessionManager) -> Self {
        Self { resolver, sessions }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Resolves a [`FieldCipher`] bound to the current master key.
    pub async fn resolve_cipher(&self) -> EngineResult<FieldCipher> {
        self.resolver.resolve().await
    }

    /// Write path: encrypts every present sensitive field under the
    /// current master key. Incoming plaintext never reaches persistence.
    pub async fn encode_sensitive_fields(
        &self,
        record: &SensitiveRecord,
    ) -> EngineResult<SensitiveRecord> {
        let cipher = self.resolver.resolve().await?;
        ServerFieldCodec::new(cipher).encode(record)
    }

    /// Decrypts every present sensitive field back to plaintext.
    pub async fn decode_sensitive_fields(
        &self,
        record: &SensitiveRecord,
    ) -> EngineResult<SensitiveRecord> {
        let cipher = self.resolver.resolve().await?;
        ServerFieldCodec::new(cipher).decode(record)
    }

    /// Re-encrypts an already-decrypted record for a client public key.
    pub fn re_encrypt_for_client(
        &self,
        public_key_pem: &str,
        record: &SensitiveRecord,
    ) -> EngineResult<SensitiveRecord> {
        record.try_map(|value| Ok(encrypt_for_recipient(public_key_pem, value)?))
    }

    /// Read path: delivers a stored record according to the session mode.
    ///
    /// Server mode decrypts to plaintext. Client mode decrypts and
    /// immediately re-encrypts each field for the session's public key; a
    /// client-mode session with no key on file fails with
    /// [`EngineError::MissingKeyMaterial`] rather than falling back to
    /// server-mode delivery.
    pub async fn read_for_session(
        &self,
        session_id: SessionId,
        stored: &SensitiveRecord,
    ) -> EngineResult<SensitiveRecord> {
        let session = self.sessions.active_session(session_id).await?;
        let cipher = self.resolver.resolve().await?;

        match session.encryption_mode {
            EncryptionMode::Server => ServerFieldCodec::new(cipher).decode(stored),
            EncryptionMode::Client => {
                let pem = session
                    .public_key_pem
                    .ok_or(EngineError::MissingKeyMaterial)?;
                ClientFieldCodec::new(cipher, pem).decode(stored)
            }
        }
    }

    /// Creates a server-mode session for a user.
    pub async fn create_session(&self, user_id: UserId) -> EngineResult<Session> {
        self.sessions.create_session(user_id).await
    }

    /// Proposes a session mode change; nothing mutates until commit.
    pub async fn propose_mode_change(
        &self,
        session_id: SessionId,
        target_mode: EncryptionMode,
        public_key_pem: Option<String>,
    ) -> EngineResult<ChangeToken> {
        self.sessions
            .propose_mode_change(session_id, target_mode, public_key_pem)
            .await
    }

    /// Commits a previously proposed mode change.
    pub async fn commit_mode_change(&self, token: ChangeToken) -> EngineResult<Session> {
        self.sessions.commit_mode_change(token).await
    }
}
