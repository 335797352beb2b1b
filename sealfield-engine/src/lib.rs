//! Envelope encryption engine for sealfield.
//!
//! Protects a closed set of sensitive user fields (date of birth, salary,
//! phone number, address) with field-level envelope encryption in two
//! delivery modes:
//!
//! - **server**: the engine decrypts and fields leave as plaintext;
//! - **client**: the engine decrypts and immediately re-encrypts each
//!   field for the session's RSA public key, so only the holder of the
//!   session-specific private key can read them.
//!
//! The master symmetric key is never stored in the clear. At rest it lives
//! wrapped by a key-management service; the [`MasterKeyResolver`] unwraps
//! it through a shared [`KeyCache`] so a warm process pays no KMS round
//! trip. Per-session delivery is governed by the [`SessionManager`]'s
//! two-phase mode-change protocol.
//!
//! HTTP routing, record persistence, and authentication are external
//! collaborators: they hand the engine well-formed field strings, session
//! records, and PEM public keys, and persist the opaque envelopes it
//! returns.

pub mod codec;
pub mod engine;
mod error;
pub mod key_cache;
pub mod kms;
pub mod resolver;
pub mod session;
pub mod store;
pub mod types;

pub use codec::{ClientFieldCodec, FieldCodec, ServerFieldCodec};
pub use engine::FieldEngine;
pub use error::{EngineError, EngineResult};
pub use key_cache::{InMemoryKeyCache, KeyCache};
pub use kms::{KeyManagement, SimulatedKms};
pub use resolver::MasterKeyResolver;
pub use session::{ChangeToken, SessionManager};
pub use store::{
    initialize_master_key, InMemorySessionStore, InMemoryWrappedKeyStore, SessionStore,
    WrappedKeyStore,
};
pub use types::{
    EncryptionMode, SensitiveRecord, Session, SessionId, UserId, WrappedKeyRecord,
    SENSITIVE_FIELDS,
};
