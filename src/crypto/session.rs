//! Session key holder
//!
//! Holds the user's encryption password in process memory only, for the
//! lifetime of a login session. The secret is never written to any
//! persistent medium; it is zeroed when cleared or dropped. The holder is
//! an explicit capability object injected into the storage layer rather
//! than an ambient global, so the encryption dependency stays visible and
//! testable.

use std::fmt;
use std::sync::RwLock;

use zeroize::Zeroizing;

/// Process-memory holder for the session encryption password
#[derive(Default)]
pub struct SessionKey {
    inner: RwLock<Option<Zeroizing<String>>>,
}

impl SessionKey {
    /// Create an empty holder (no password set)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session password, replacing any previous one
    pub fn set(&self, password: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Zeroizing::new(password.into()));
    }

    /// Get a copy of the session password, if one is set
    ///
    /// The returned copy zeroes itself on drop.
    pub fn get(&self) -> Option<Zeroizing<String>> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Whether a password is currently set
    pub fn is_set(&self) -> bool {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.is_some()
    }

    /// Clear the session password (logout, session expiry, delete-all)
    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

// Never reveal the secret in Debug output
impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("set", &self.is_set())
            .finish()
    }
}
