//! Asymmetric re-encryption for a specific client.
//!
//! Encrypts short field plaintexts with RSA-OAEP (SHA-256) under a
//! recipient-supplied SPKI PEM public key, so only the holder of the
//! matching private key can read them. The private half never enters the
//! server-side engine; [`RecipientKeyPair`] exists as the client-side
//! reference implementation and for tests.
//!
//! OAEP bounds the plaintext to `modulus - 2*hash - 2` bytes (190 for
//! RSA-2048). There is no chunking; oversized input is an error. OAEP
//! padding is randomized, so envelope equality is meaningless to callers.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// RSA modulus size used for generated keypairs.
pub const MODULUS_BITS: usize = 2048;

/// SHA-256 digest length, which OAEP subtracts twice from the ceiling.
const HASH_LEN: usize = 32;

fn oaep_ceiling(public_key: &RsaPublicKey) -> usize {
    public_key.size() - 2 * HASH_LEN - 2
}

/// Encrypts a plaintext for the holder of `public_key_pem`.
///
/// Returns base64 ciphertext. Fails with [`CryptoError::InvalidPublicKey`]
/// if the PEM does not parse and [`CryptoError::InputTooLarge`] if the
/// plaintext exceeds the OAEP ceiling for the key's modulus.
pub fn encrypt_for_recipient(public_key_pem: &str, plaintext: &str) -> CryptoResult<String> {
    let public_key = parse_public_key(public_key_pem)?;

    let limit = oaep_ceiling(&public_key);
    if plaintext.len() > limit {
        return Err(CryptoError::InputTooLarge {
            limit,
            actual: plaintext.len(),
        });
    }

    let ciphertext = public_key
        .encrypt(
            &mut rand::rngs::OsRng,
            Oaep::new::<Sha256>(),
            plaintext.as_bytes(),
        )
        .map_err(|e| match e {
            rsa::Error::MessageTooLong => CryptoError::InputTooLarge {
                limit,
                actual: plaintext.len(),
            },
            other => CryptoError::Asymmetric(other.to_string()),
        })?;

    Ok(STANDARD.encode(ciphertext))
}

/// Parses an SPKI PEM public key.
pub fn parse_public_key(pem: &str) -> CryptoResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

/// Client-held RSA-OAEP keypair.
///
/// Generated and stored outside the engine's trust boundary; only the PEM
/// public half crosses into the server. The decrypt half lives here so
/// client tooling and end-to-end tests can exercise the inverse operation.
pub struct RecipientKeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl RecipientKeyPair {
    /// Generates a fresh 2048-bit keypair.
    pub fn generate() -> CryptoResult<Self> {
        let private_key = RsaPrivateKey::new(&mut rand::rngs::OsRng, MODULUS_BITS)
            .map_err(|e| CryptoError::Asymmetric(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Exports the public half as SPKI PEM.
    pub fn public_key_pem(&self) -> CryptoResult<String> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::Asymmetric(e.to_string()))
    }

    /// Decrypts a base64 ciphertext produced by [`encrypt_for_recipient`].
    pub fn decrypt(&self, ciphertext_b64: &str) -> CryptoResult<String> {
        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| CryptoError::Format(format!("bad ciphertext encoding: {e}")))?;

        let plaintext = self
            .private_key
            .decrypt(Oaep::new::<Sha256>(), &ciphertext)
            .map_err(|_| CryptoError::Authenticity)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::Authenticity)
    }
}

impl std::fmt::Debug for RecipientKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecipientKeyPair(..)")
    }
}
