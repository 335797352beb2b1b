//! Core engine types: identifiers, sessions, the wrapped-key record, and
//! the closed sensitive-field record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a login session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side decrypts sensitive fields for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionMode {
    /// Server decrypts; fields are delivered as plaintext.
    Server,
    /// Server decrypts then re-encrypts for the session's public key;
    /// only the client can read the delivered fields.
    Client,
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionMode::Server => write!(f, "server"),
            EncryptionMode::Client => write!(f, "client"),
        }
    }
}

/// Per-login session state governing field delivery.
///
/// Created in [`EncryptionMode::Server`] with no public key. The public key
/// is only ever the client's public half; the engine never holds a private
/// key. `revoked` is terminal: a revoked session is unusable for any engine
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub encryption_mode: EncryptionMode,
    pub public_key_pem: Option<String>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates a fresh server-mode session for a user.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id,
            encryption_mode: EncryptionMode::Server,
            public_key_pem: None,
            revoked: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The single persisted wrapped master key.
///
/// Exactly one active record exists; rotation is out of scope, so multiple
/// records are undefined behavior and absence means the system was never
/// initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedKeyRecord {
    pub id: Uuid,
    /// KMS-wrapped master key ciphertext. Doubles as the cache key: it is
    /// a stable identifier for "which master key version".
    pub wrapped_key: String,
    pub created_at: DateTime<Utc>,
}

impl WrappedKeyRecord {
    pub fn new(wrapped_key: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            wrapped_key,
            created_at: Utc::now(),
        }
    }
}

/// Names of the protected fields, in record order.
pub const SENSITIVE_FIELDS: [&str; 4] = ["dateOfBirth", "salary", "phoneNumber", "address"];

/// The closed set of sensitive fields carried on a user record.
///
/// Each field is either absent or exactly one value; at rest a present
/// value is always a `nonce:ciphertext` envelope under the current master
/// key. The engine iterates this closed list rather than reflecting over
/// arbitrary record keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveRecord {
    pub date_of_birth: Option<String>,
    pub salary: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl SensitiveRecord {
    /// Applies a fallible transform to every present field, leaving absent
    /// fields absent. The first failure aborts the whole transform.
    pub fn try_map<F>(&self, f: F) -> Result<Self, crate::error::EngineError>
    where
        F: Fn(&str) -> Result<String, crate::error::EngineError>,
    {
        let apply = |field: &Option<String>| -> Result<Option<String>, crate::error::EngineError> {
            field.as_deref().map(&f).transpose()
        };

        Ok(Self {
            date_of_birth: apply(&self.date_of_birth)?,
            salary: apply(&self.salary)?,
            phone_number: apply(&self.phone_number)?,
            address: apply(&self.address)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_server_mode_without_key() {
        let session = Session::new(UserId::new());
        assert_eq!(session.encryption_mode, EncryptionMode::Server);
        assert!(session.public_key_pem.is_none());
        assert!(!session.revoked);
    }

    #[test]
    fn encryption_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EncryptionMode::Server).unwrap(),
            "\"server\""
        );
        assert_eq!(
            serde_json::to_string(&EncryptionMode::Client).unwrap(),
            "\"client\""
        );
    }

    #[test]
    fn sensitive_record_serializes_camel_case() {
        let record = SensitiveRecord {
            date_of_birth: Some("1990-01-01".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["dateOfBirth"], "1990-01-01");
        assert!(json["salary"].is_null());
    }

    #[test]
    fn try_map_skips_absent_fields() {
        let record = SensitiveRecord {
            salary: Some("42000".to_string()),
            ..Default::default()
        };
        let mapped = record.try_map(|v| Ok(format!("<{v}>"))).unwrap();
        assert_eq!(mapped.salary.as_deref(), Some("<42000>"));
        assert!(mapped.date_of_birth.is_none());
        assert!(mapped.phone_number.is_none());
        assert!(mapped.address.is_none());
    }

    #[test]
    fn try_map_propagates_first_failure() {
        let record = SensitiveRecord {
            date_of_birth: Some("bad".to_string()),
            salary: Some("42000".to_string()),
            ..Default::default()
        };
        let result = record.try_map(|_| Err(crate::error::EngineError::MissingKeyMaterial));
        assert!(result.is_err());
    }
}
