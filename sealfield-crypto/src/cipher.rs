//! Symmetric field cipher.
//!
//! Encrypts individual field values with ChaCha20-Poly1305 under a key
//! derived from the master key material. Envelope format is
//! `base64(nonce) + ":" + base64(ciphertext)`, with the Poly1305 tag
//! appended to the ciphertext half, so a wrong key or a flipped byte is a
//! detectable failure instead of silent garbage.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_cipher_key, MasterKey};
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;

/// Nonce size for ChaCha20-Poly1305 (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Separator between the nonce and ciphertext halves of an envelope.
const ENVELOPE_SEPARATOR: char = ':';

/// Field-level symmetric cipher bound to one master key.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: ChaCha20Poly1305,
}

impl FieldCipher {
    /// Builds a cipher from master key material (hashed into a fixed-length
    /// key before use; the raw material never keys the cipher directly).
    pub fn new(key: &MasterKey) -> Self {
        let derived = derive_cipher_key(key);
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&derived)),
        }
    }

    /// Encrypts a field value into an `nonce:ciphertext` envelope.
    ///
    /// A fresh random nonce is drawn per call, so encrypting the same value
    /// twice yields different envelopes.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Authenticity)?;

        Ok(format!(
            "{}{}{}",
            STANDARD.encode(nonce_bytes),
            ENVELOPE_SEPARATOR,
            STANDARD.encode(&ciphertext)
        ))
    }

    /// Decrypts an `nonce:ciphertext` envelope back to the field value.
    ///
    /// A malformed envelope fails with [`CryptoError::Format`]; a wrong key
    /// or tampered ciphertext fails with [`CryptoError::Authenticity`].
    pub fn decrypt(&self, envelope: &str) -> CryptoResult<String> {
        let (nonce_b64, ciphertext_b64) = envelope
            .split_once(ENVELOPE_SEPARATOR)
            .ok_or_else(|| CryptoError::Format("missing separator".to_string()))?;

        let nonce_bytes = STANDARD
            .decode(nonce_b64)
            .map_err(|e| CryptoError::Format(format!("bad nonce encoding: {e}")))?;
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(CryptoError::Format(format!(
                "nonce must be {NONCE_SIZE} bytes, got {}",
                nonce_bytes.len()
            )));
        }

        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| CryptoError::Format(format!("bad ciphertext encoding: {e}")))?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| CryptoError::Authenticity)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::Authenticity)
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldCipher(..)")
    }
}
