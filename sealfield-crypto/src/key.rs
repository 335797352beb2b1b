//! Master key material and cipher-key derivation.

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a derived cipher key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Opaque master key material.
///
/// The material is treated as text so it survives a wrap/unwrap round trip
/// through the KMS unchanged. It is never used as a cipher key directly;
/// [`derive_cipher_key`] hashes it into a fixed-length key first.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey(String);

impl MasterKey {
    /// Generates fresh key material: 32 random bytes, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let key = Self(hex::encode(bytes));
        bytes.zeroize();
        key
    }

    /// Wraps existing key material (e.g. returned from a KMS unwrap).
    pub fn from_material(material: impl Into<String>) -> Self {
        Self(material.into())
    }

    /// Exposes the raw material for wrapping or caching.
    pub fn material(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("MasterKey(..)")
    }
}

/// Derives a fixed-length cipher key from master key material via SHA-256.
pub fn derive_cipher_key(key: &MasterKey) -> [u8; KEY_SIZE] {
    let digest = Sha256::digest(key.material().as_bytes());
    digest.into()
}
