//! Session token ownership.
//!
//! A [`Session`] is constructed once and injected into the gateway. It reads the
//! persisted token a single time at construction; after that the in-memory value
//! is authoritative and every change is broadcast to subscribers.

mod store;

pub use store::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};

use std::sync::Arc;
use tokio::sync::watch;

use crate::auth::{self, Claims};
use crate::error::AuthTokenError;

pub struct Session {
    store: Arc<dyn TokenStore>,
    key: String,
    changes: watch::Sender<Option<String>>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = store.get(&key).filter(|t| !t.is_empty());
        let (changes, _) = watch::channel(initial);
        Self { store, key, changes }
    }

    /// Session backed by nothing but memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::default()), "token")
    }

    pub fn token(&self) -> Option<String> {
        self.changes.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.changes.borrow().is_some()
    }

    pub fn set_token(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        self.store.set(&self.key, &token)?;
        self.changes.send_replace(Some(token));
        tracing::info!("session started");
        Ok(())
    }

    /// Removes the token from memory even when the store fails to forget it
    pub fn clear(&self) -> Result<(), StorageError> {
        self.changes.send_replace(None);
        tracing::info!("session cleared");
        self.store.clear(&self.key)
    }

    /// Receiver that observes every login and logout
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.changes.subscribe()
    }

    pub fn claims(&self) -> Result<Claims, AuthTokenError> {
        let token = self.token().ok_or(AuthTokenError::Missing)?;
        auth::decode_claims(&token)
    }

    pub fn user_id(&self) -> Result<String, AuthTokenError> {
        let token = self.token().ok_or(AuthTokenError::Missing)?;
        auth::decode_user_id(&token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
