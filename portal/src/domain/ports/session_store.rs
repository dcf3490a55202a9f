//! Driven port for durable session persistence.
//!
//! The store is the only component that touches storage directly. It holds
//! at most one [`SessionSnapshot`] and must keep the token and user entries
//! together: both present or both absent.

use std::sync::Mutex;

use crate::domain::SessionSnapshot;

/// Errors surfaced by session store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    /// Backing storage could not be read or written.
    #[error("session storage I/O failed: {message}")]
    Io {
        /// Adapter-specific description.
        message: String,
    },
    /// Snapshot could not be serialised for storage.
    #[error("session snapshot encoding failed: {message}")]
    Encode {
        /// Serialiser error text.
        message: String,
    },
}

impl SessionStoreError {
    /// Storage read or write failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Serialisation failure.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }
}

/// Synchronous key/value persistence for the signed-in session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Read the stored snapshot. A missing, partial, or unreadable snapshot
    /// is reported as `None`.
    fn get(&self) -> Result<Option<SessionSnapshot>, SessionStoreError>;

    /// Replace the stored snapshot atomically.
    fn set(&self, snapshot: &SessionSnapshot) -> Result<(), SessionStoreError>;

    /// Remove any stored snapshot. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Volatile store used by tests and short-lived processes.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: Mutex<Option<SessionSnapshot>>,
}

impl InMemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot, as after a previous sign-in.
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionSnapshot>> {
        // A poisoned slot still holds a whole snapshot or none.
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> Result<Option<SessionSnapshot>, SessionStoreError> {
        Ok(self.lock().clone())
    }

    fn set(&self, snapshot: &SessionSnapshot) -> Result<(), SessionStoreError> {
        *self.lock() = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.lock() = None;
        Ok(())
    }
}

/// Store for execution contexts without durable storage.
///
/// Reads report no session and writes are discarded, so callers behave as a
/// permanently signed-out client instead of failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSessionStore;

impl SessionStore for DetachedSessionStore {
    fn get(&self) -> Result<Option<SessionSnapshot>, SessionStoreError> {
        Ok(None)
    }

    fn set(&self, _snapshot: &SessionSnapshot) -> Result<(), SessionStoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        Ok(())
    }
}
