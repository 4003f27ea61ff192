//! AES-256-GCM encryption/decryption
//!
//! Provides password-based authenticated encryption for data at rest.
//! Each encryption call generates a fresh random salt and nonce; the key
//! is re-derived from the password and salt on both sides. Tag mismatch
//! surfaces as a typed decryption failure, never as garbled plaintext.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

use super::key_derivation::{derive_key, generate_salt, SALT_SIZE};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// An encrypted payload with the metadata needed to decrypt it
///
/// All fields are base64 encoded so the payload can sit in a
/// text-oriented store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// The encrypted ciphertext with authentication tag
    pub ciphertext: String,
    /// The key-derivation salt used for this payload
    pub salt: String,
    /// The nonce used for this encryption
    pub iv: String,
}

impl EncryptedPayload {
    fn new(ciphertext: &[u8], salt: &[u8], nonce: &[u8]) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        Self {
            ciphertext: STANDARD.encode(ciphertext),
            salt: STANDARD.encode(salt),
            iv: STANDARD.encode(nonce),
        }
    }

    fn decode_field(field: &str, name: &str) -> LedgerResult<Vec<u8>> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        STANDARD
            .decode(field)
            .map_err(|e| LedgerError::Decryption(format!("invalid {} encoding: {}", name, e)))
    }
}

/// Encrypt plaintext under a password using AES-256-GCM
///
/// Generates a fresh random salt and nonce for every call.
pub fn encrypt(plaintext: &[u8], password: &str) -> LedgerResult<EncryptedPayload> {
    let salt = generate_salt();
    let key = derive_key(password, &salt);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LedgerError::Encryption(format!("failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| LedgerError::Encryption(format!("encryption failed: {}", e)))?;

    Ok(EncryptedPayload::new(&ciphertext, &salt, &nonce_bytes))
}

/// Decrypt a payload under a password
///
/// Re-derives the key from the stored salt; any authentication failure
/// (wrong password or corrupted payload) is a `Decryption` error.
pub fn decrypt(payload: &EncryptedPayload, password: &str) -> LedgerResult<Vec<u8>> {
    let salt = EncryptedPayload::decode_field(&payload.salt, "salt")?;
    if salt.len() != SALT_SIZE {
        return Err(LedgerError::Decryption(format!(
            "invalid salt size: expected {}, got {}",
            SALT_SIZE,
            salt.len()
        )));
    }

    let nonce_bytes = EncryptedPayload::decode_field(&payload.iv, "iv")?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(LedgerError::Decryption(format!(
            "invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }

    let ciphertext = EncryptedPayload::decode_field(&payload.ciphertext, "ciphertext")?;

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LedgerError::Encryption(format!("failed to create cipher: {}", e)))?;

    let nonce = Nonce::from_slice(&nonce_bytes);
    cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| LedgerError::Decryption("invalid key or corrupted data".into()))
}
