//! Cryptographic functions for ledgerbook
//!
//! Provides AES-256-GCM authenticated encryption with PBKDF2-HMAC-SHA256
//! key derivation, and the in-memory session key holder.

pub mod encryption;
pub mod key_derivation;
pub mod session;

pub use encryption::{decrypt, encrypt, EncryptedPayload};
pub use key_derivation::{derive_key, generate_salt, DerivedKey, PBKDF2_ITERATIONS};
pub use session::SessionKey;
