//! Credential store port
//!
//! The bearer token is resolved out of band: the REST adapter writes it on
//! login, and both the REST adapter and the streaming transport read it.
//! Absence of a token is a precondition failure for opening a stream, not
//! a runtime error.

use std::sync::Mutex;

/// Stores the bearer token for the current user.
///
/// Intentionally synchronous — lookups happen on the hot path of every
/// request and implementations keep the token in memory or a small file.
pub trait CredentialStore: Send + Sync {
    /// The stored token, if any.
    fn token(&self) -> Option<String>;

    /// Persist a new token, replacing any previous one.
    fn store(&self, token: &str);

    /// Forget the stored token.
    fn clear(&self);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn store(&self, token: &str) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.token(), None);

        store.store("abc123");
        assert_eq!(store.token(), Some("abc123".to_string()));

        store.clear();
        assert_eq!(store.token(), None);
    }
}
