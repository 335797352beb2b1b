//! Encryption primitives for sealfield.
//!
//! Provides field-level envelope encryption using:
//! - ChaCha20-Poly1305 for authenticated symmetric field encryption
//! - SHA-256 derivation of cipher keys from opaque master key material
//! - RSA-OAEP (SHA-256) re-encryption toward a client-held public key
//!
//! # Architecture
//!
//! Sensitive fields at rest are always symmetric ciphertext under a single
//! master key. The master key itself is stored only in wrapped (encrypted)
//! form; the engine crate unwraps it through a KMS abstraction and hands
//! the material to [`FieldCipher`]. When a session opts into client-side
//! encryption, decrypted field values are immediately re-encrypted with
//! the session's RSA public key ([`encrypt_for_recipient`]) so plaintext
//! never reaches the transport layer.
//!
//! This crate is pure and synchronous; orchestration, caching, and session
//! state live in `sealfield-engine`.

mod cipher;
mod error;
mod key;
pub mod recipient;

pub use cipher::{FieldCipher, NONCE_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_cipher_key, MasterKey, KEY_SIZE};
pub use recipient::{encrypt_for_recipient, parse_public_key, RecipientKeyPair, MODULUS_BITS};
