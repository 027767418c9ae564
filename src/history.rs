//! Navigation blocking for forms with unsaved changes.
//!
//! One [`HistoryBlocker`] exists per application. Forms register a
//! predicate while they are dirty; in-app navigation and page unload consult
//! every registered predicate.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::config::NavigationConfig;
use crate::router::Router;

/// Returns `true` when navigation away should be challenged.
pub type BlockCallback = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Attempted to unblock a callback that was never registered")]
    UnregisteredCallback,
}

/// `window.confirm`-style prompt.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Block,
}

/// Outcome of a `beforeunload` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeforeUnload {
    Allow,
    /// Cancel the unload. The browser shows its own text; `return_value`
    /// is always empty.
    Prompt { return_value: String },
}

pub struct HistoryBlocker {
    callbacks: Mutex<Vec<BlockCallback>>,
    confirm_message: String,
    modal_suffix: String,
}

impl Default for HistoryBlocker {
    fn default() -> Self {
        Self::new(&NavigationConfig::default())
    }
}

impl HistoryBlocker {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
            confirm_message: config.confirm_message.clone(),
            modal_suffix: config.modal_suffix.clone(),
        }
    }

    pub fn block(&self, callback: BlockCallback) {
        self.callbacks.lock().push(callback);
    }

    /// Remove a callback by identity.
    pub fn unblock(&self, callback: &BlockCallback) -> Result<(), HistoryError> {
        let mut callbacks = self.callbacks.lock();
        let index = callbacks
            .iter()
            .position(|registered| Arc::ptr_eq(registered, callback))
            .ok_or(HistoryError::UnregisteredCallback)?;
        callbacks.remove(index);
        Ok(())
    }

    pub fn registered(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn should_block(&self) -> bool {
        // Callbacks read form state; don't hold the registry lock while they run.
        let callbacks = self.callbacks.lock().clone();
        callbacks.iter().any(|callback| callback())
    }

    pub fn before_unload(&self) -> BeforeUnload {
        if self.should_block() {
            BeforeUnload::Prompt {
                return_value: String::new(),
            }
        } else {
            BeforeUnload::Allow
        }
    }

    /// `true` when one path is the other plus the modal suffix.
    pub fn is_same_modal_route(&self, a: &str, b: &str) -> bool {
        a.strip_suffix(self.modal_suffix.as_str()) == Some(b)
            || b.strip_suffix(self.modal_suffix.as_str()) == Some(a)
    }

    /// Decide whether a transition from `from` to `to` may proceed.
    ///
    /// Without a prompt (no browser) a guarded transition is allowed.
    pub fn check_transition(
        &self,
        from: &str,
        to: &str,
        prompt: Option<&dyn ConfirmPrompt>,
    ) -> NavigationDecision {
        if self.is_same_modal_route(from, to) || !self.should_block() {
            return NavigationDecision::Allow;
        }

        let Some(prompt) = prompt else {
            tracing::debug!(from = %from, to = %to, "No confirm prompt available, allowing navigation");
            return NavigationDecision::Allow;
        };

        if prompt.confirm(&self.confirm_message) {
            NavigationDecision::Allow
        } else {
            tracing::debug!(from = %from, to = %to, "Navigation cancelled by user");
            NavigationDecision::Block
        }
    }

    /// Guarded `router.push(to)`.
    pub fn navigate(
        &self,
        router: &dyn Router,
        to: &str,
        prompt: Option<&dyn ConfirmPrompt>,
    ) -> NavigationDecision {
        let decision = self.check_transition(&router.current_path(), to, prompt);
        if decision == NavigationDecision::Allow {
            router.push(to);
        }
        decision
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Guarded,
    Unguarded,
}

/// One form's registration with the [`HistoryBlocker`].
///
/// Registers its callback on entering [`GuardState::Guarded`] and removes it
/// on leaving, so each form holds at most one registration.
pub struct HistoryGuard {
    blocker: Arc<HistoryBlocker>,
    callback: BlockCallback,
    state: GuardState,
}

impl HistoryGuard {
    pub fn new(blocker: Arc<HistoryBlocker>, callback: BlockCallback) -> Self {
        Self {
            blocker,
            callback,
            state: GuardState::Unguarded,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn sync(&mut self, guarded: bool) -> Result<(), HistoryError> {
        match (self.state, guarded) {
            (GuardState::Unguarded, true) => {
                self.blocker.block(Arc::clone(&self.callback));
                self.state = GuardState::Guarded;
            }
            (GuardState::Guarded, false) => {
                self.blocker.unblock(&self.callback)?;
                self.state = GuardState::Unguarded;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), HistoryError> {
        self.sync(false)
    }
}

impl Drop for HistoryGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "Failed to release history guard");
        }
    }
}
