//! Shared application session.
//!
//! The session outlives any single form. Forms never hold their own copy:
//! they read a snapshot while rendering and write only through
//! [`SessionStore::apply_patch`] after a successful mutation.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

/// Server-tracked state about the current user.
pub type Session = Map<String, Value>;

/// Partial session returned by a mutation.
pub type SessionPatch = Map<String, Value>;

/// Shallow merge: patch keys overwrite, absent keys are left alone.
pub fn merge(current: &Session, patch: &SessionPatch) -> Session {
    let mut merged = current.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Process-wide session handle.
///
/// Cloning the store shares the underlying session.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
}

impl SessionStore {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Get a clone of the current session.
    pub fn get(&self) -> Session {
        self.inner.read().clone()
    }

    /// Merge `patch` into the shared session and return the result.
    pub fn apply_patch(&self, patch: &SessionPatch) -> Session {
        let mut guard = self.inner.write();
        let merged = merge(&guard, patch);
        *guard = merged;
        tracing::debug!(keys = ?patch.keys().collect::<Vec<_>>(), "Session patch applied");
        guard.clone()
    }
}
