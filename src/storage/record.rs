//! Record codec: sealing records for storage and opening them on read
//!
//! When a session password is available, records are persisted as an
//! `EncryptedEnvelope` carrying the ciphertext plus plaintext timestamps
//! (kept outside the ciphertext so the store can sort without decrypting).
//! When encryption is not possible (no session password, or a cipher
//! failure), writes fall back to the record's plaintext shape; the
//! fallback is reported to the caller as a `StorageMode`, never thrown.
//! Both shapes are accepted on read indefinitely.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{decrypt, encrypt, EncryptedPayload, SessionKey};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, Category, LedgerEntry};

/// The durable encrypted-record layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    pub id: String,
    pub ciphertext: String,
    pub salt: String,
    pub iv: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Either shape a stored value may take
///
/// Envelope detection is structural: a value carrying `ciphertext`,
/// `salt`, and `iv` is an envelope; anything else is a legacy plaintext
/// record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredRecord<T> {
    Encrypted(EncryptedEnvelope),
    Plain(T),
}

/// How a write actually landed in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Sealed in an encrypted envelope
    Encrypted,
    /// Persisted plaintext because encryption was unavailable
    PlaintextFallback,
}

/// A record the codec can seal: carries its own id and timestamps
pub trait Persistable: Serialize + DeserializeOwned {
    /// The storage key for this record
    fn record_id(&self) -> String;

    /// Creation timestamp, mirrored unencrypted on the envelope
    fn record_created_at(&self) -> DateTime<Utc>;

    /// Last-modified timestamp, mirrored unencrypted on the envelope
    fn record_updated_at(&self) -> DateTime<Utc>;
}

impl Persistable for LedgerEntry {
    fn record_id(&self) -> String {
        self.id.as_uuid().to_string()
    }
    fn record_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn record_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Persistable for Budget {
    fn record_id(&self) -> String {
        self.id.as_uuid().to_string()
    }
    fn record_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn record_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Persistable for Category {
    fn record_id(&self) -> String {
        self.id.as_uuid().to_string()
    }
    fn record_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn record_updated_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Seal a record for storage
///
/// Attempts encryption under the session password; on any failure falls
/// back to the plaintext shape and reports `PlaintextFallback`.
pub fn seal<T: Persistable>(
    record: &T,
    session: &SessionKey,
) -> LedgerResult<(Value, StorageMode)> {
    match try_seal(record, session) {
        Ok(value) => Ok((value, StorageMode::Encrypted)),
        Err(_) => {
            let value = serde_json::to_value(record)?;
            Ok((value, StorageMode::PlaintextFallback))
        }
    }
}

fn try_seal<T: Persistable>(record: &T, session: &SessionKey) -> LedgerResult<Value> {
    let password = session.get().ok_or(LedgerError::NoSessionKey)?;
    let plaintext = serde_json::to_vec(record)?;
    let payload = encrypt(&plaintext, &password)?;

    let envelope = EncryptedEnvelope {
        id: record.record_id(),
        ciphertext: payload.ciphertext,
        salt: payload.salt,
        iv: payload.iv,
        created_at: record.record_created_at(),
        updated_at: record.record_updated_at(),
    };
    Ok(serde_json::to_value(&envelope)?)
}

/// Open a stored value into a typed record
///
/// Decrypts envelopes (propagating `Decryption`; `NoSessionKey` when an
/// envelope is read with no password set) and passes legacy plaintext
/// records through unchanged.
pub fn open<T: Persistable>(value: Value, session: &SessionKey) -> LedgerResult<T> {
    let stored: StoredRecord<T> = serde_json::from_value(value)
        .map_err(|e| LedgerError::Storage(format!("unreadable stored record: {}", e)))?;

    match stored {
        StoredRecord::Plain(record) => Ok(record),
        StoredRecord::Encrypted(envelope) => {
            let password = session.get().ok_or(LedgerError::NoSessionKey)?;
            let payload = EncryptedPayload {
                ciphertext: envelope.ciphertext,
                salt: envelope.salt,
                iv: envelope.iv,
            };
            let plaintext = decrypt(&payload, &password)?;
            serde_json::from_slice(&plaintext)
                .map_err(|e| LedgerError::Decryption(format!("decrypted record unreadable: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, NewEntry};
    use chrono::NaiveDate;

    fn entry() -> LedgerEntry {
        LedgerEntry::new(NewEntry {
            amount: Money::from_cents(10050),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            category: "food".into(),
            notes: "lunch".into(),
        })
    }

    #[test]
    fn test_seal_encrypts_with_session_key() {
        let session = SessionKey::new();
        session.set("pw1");
        let record = entry();

        let (value, mode) = seal(&record, &session).unwrap();
        assert_eq!(mode, StorageMode::Encrypted);
        assert!(value.get("ciphertext").is_some());
        assert!(value.get("salt").is_some());
        assert!(value.get("iv").is_some());
        // Plaintext fields stay off the wire
        assert!(value.get("amount").is_none());
        // Timestamps stay readable for store-level sorting
        assert!(value.get("createdAt").is_some());

        let opened: LedgerEntry = open(value, &session).unwrap();
        assert_eq!(opened, record);
    }

    #[test]
    fn test_seal_falls_back_to_plaintext_without_key() {
        let session = SessionKey::new();
        let record = entry();

        let (value, mode) = seal(&record, &session).unwrap();
        assert_eq!(mode, StorageMode::PlaintextFallback);
        assert!(value.get("ciphertext").is_none());
        assert!(value.get("amount").is_some());

        let opened: LedgerEntry = open(value, &session).unwrap();
        assert_eq!(opened, record);
    }

    #[test]
    fn test_open_legacy_plaintext_with_key_set() {
        // A legacy plaintext record must be accepted even when a session
        // password is present.
        let session = SessionKey::new();
        let record = entry();
        let value = serde_json::to_value(&record).unwrap();

        session.set("pw1");
        let opened: LedgerEntry = open(value, &session).unwrap();
        assert_eq!(opened, record);
    }

    #[test]
    fn test_open_envelope_with_wrong_password_fails() {
        let session = SessionKey::new();
        session.set("pw1");
        let (value, _) = seal(&entry(), &session).unwrap();

        session.clear();
        session.set("pw2");
        let result: LedgerResult<LedgerEntry> = open(value, &session);
        assert!(matches!(result, Err(LedgerError::Decryption(_))));
    }

    #[test]
    fn test_open_envelope_without_password_fails() {
        let session = SessionKey::new();
        session.set("pw1");
        let (value, _) = seal(&entry(), &session).unwrap();

        session.clear();
        let result: LedgerResult<LedgerEntry> = open(value, &session);
        assert!(matches!(result, Err(LedgerError::NoSessionKey)));
    }
}
