//! Field codecs.
//!
//! One capability interface, [`FieldCodec`], with two interchangeable
//! implementations selected per session by the encryption-mode state
//! machine:
//!
//! - [`ServerFieldCodec`] — symmetric only; decode yields plaintext.
//! - [`ClientFieldCodec`] — decode re-encrypts every field for the
//!   session's public key, so plaintext never leaves the call.
//!
//! Encoding is identical in both: the at-rest form is always symmetric
//! ciphertext under the current master key.

use crate::error::EngineResult;
use crate::types::SensitiveRecord;
use sealfield_crypto::{encrypt_for_recipient, FieldCipher};

/// Transforms the closed sensitive-field set between its at-rest and
/// delivery forms.
pub trait FieldCodec {
    /// Write path: plaintext record to at-rest envelopes.
    fn encode(&self, record: &SensitiveRecord) -> EngineResult<SensitiveRecord>;

    /// Read path: at-rest envelopes to this codec's delivery form.
    fn decode(&self, record: &SensitiveRecord) -> EngineResult<SensitiveRecord>;
}

/// Server-mode codec: fields are delivered as plaintext.
pub struct ServerFieldCodec {
    cipher: FieldCipher,
}

impl ServerFieldCodec {
    pub fn new(cipher: FieldCipher) -> Self {
        Self { cipher }
    }
}

impl FieldCodec for ServerFieldCodec {
    fn encode(&self, record: &SensitiveRecord) -> EngineResult<SensitiveRecord> {
        record.try_map(|value| Ok(self.cipher.encrypt(value)?))
    }

    fn decode(&self, record: &SensitiveRecord) -> EngineResult<SensitiveRecord> {
        record.try_map(|envelope| Ok(self.cipher.decrypt(envelope)?))
    }
}

/// Client-mode codec: decoded fields are immediately re-encrypted for the
/// session's public key.
pub struct ClientFieldCodec {
    cipher: FieldCipher,
    recipient_pem: String,
}

impl ClientFieldCodec {
    pub fn new(cipher: FieldCipher, recipient_pem: impl Into<String>) -> Self {
        Self {
            cipher,
            recipient_pem: recipient_pem.into(),
        }
    }
}

impl FieldCodec for ClientFieldCodec {
    fn encode(&self, record: &SensitiveRecord) -> EngineResult<SensitiveRecord> {
        record.try_map(|value| Ok(self.cipher.encrypt(value)?))
    }

    fn decode(&self, record: &SensitiveRecord) -> EngineResult<SensitiveRecord> {
        record.try_map(|envelope| {
            let plaintext = self.cipher.decrypt(envelope)?;
            Ok(encrypt_for_recipient(&self.recipient_pem, &plaintext)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealfield_crypto::{MasterKey, RecipientKeyPair};

    fn cipher() -> FieldCipher {
        FieldCipher::new(&MasterKey::from_material("codec-test-key"))
    }

    fn record() -> SensitiveRecord {
        SensitiveRecord {
            date_of_birth: Some("1990-01-01".to_string()),
            salary: Some("42000".to_string()),
            phone_number: None,
            address: Some("12 Main St".to_string()),
        }
    }

    #[test]
    fn server_codec_round_trip() {
        let codec = ServerFieldCodec::new(cipher());
        let encoded = codec.encode(&record()).unwrap();

        // At rest: every present field is an envelope, absent stays absent
        assert!(encoded.date_of_birth.as_deref().unwrap().contains(':'));
        assert_ne!(encoded.salary.as_deref(), Some("42000"));
        assert!(encoded.phone_number.is_none());

        assert_eq!(codec.decode(&encoded).unwrap(), record());
    }

    #[test]
    fn encode_never_stores_plaintext() {
        let codec = ServerFieldCodec::new(cipher());
        let encoded = codec.encode(&record()).unwrap();
        for (stored, plain) in [
            (&encoded.date_of_birth, "1990-01-01"),
            (&encoded.salary, "42000"),
            (&encoded.address, "12 Main St"),
        ] {
            assert!(!stored.as_deref().unwrap().contains(plain));
        }
    }

    #[test]
    fn client_codec_decode_is_readable_only_by_recipient() {
        let keypair = RecipientKeyPair::generate().unwrap();
        let pem = keypair.public_key_pem().unwrap();

        let server = ServerFieldCodec::new(cipher());
        let stored = server.encode(&record()).unwrap();

        let client = ClientFieldCodec::new(cipher(), pem);
        let delivered = client.decode(&stored).unwrap();

        // Delivered fields are not plaintext and not the at-rest envelope
        assert_ne!(delivered.salary, stored.salary);
        assert_ne!(delivered.salary.as_deref(), Some("42000"));

        assert_eq!(
            keypair
                .decrypt(delivered.date_of_birth.as_deref().unwrap())
                .unwrap(),
            "1990-01-01"
        );
        assert_eq!(
            keypair.decrypt(delivered.salary.as_deref().unwrap()).unwrap(),
            "42000"
        );
        assert!(delivered.phone_number.is_none());
    }

    #[test]
    fn client_codec_encodes_like_server() {
        let keypair = RecipientKeyPair::generate().unwrap();
        let client = ClientFieldCodec::new(cipher(), keypair.public_key_pem().unwrap());

        let encoded = client.encode(&record()).unwrap();
        // The at-rest form stays symmetric: the server codec can read it back
        let server = ServerFieldCodec::new(cipher());
        assert_eq!(server.decode(&encoded).unwrap(), record());
    }
}
