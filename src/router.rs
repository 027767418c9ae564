//! Router collaborator.
//!
//! Only two primitives are needed: where are we, and go somewhere else.
//! Navigation guarding lives in [`crate::history`] on top of these.

use parking_lot::Mutex;

pub trait Router: Send + Sync {
    /// Path of the current location, e.g. `/onboarding/step/1`.
    fn current_path(&self) -> String;

    /// Navigate to `path`.
    fn push(&self, path: &str);
}

/// Router that only records where it was sent.
///
/// Stands in for a real router on the server render path and in tests.
#[derive(Debug)]
pub struct MemoryRouter {
    history: Mutex<Vec<String>>,
}

impl MemoryRouter {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![initial_path.into()]),
        }
    }

    /// Every path visited so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// Pop the current entry, like a browser back button.
    ///
    /// Returns `(from, to)` when there was somewhere to go back to.
    pub fn back(&self) -> Option<(String, String)> {
        let mut history = self.history.lock();
        if history.len() < 2 {
            return None;
        }
        let from = history.pop()?;
        let to = history.last()?.clone();
        Some((from, to))
    }
}

impl Router for MemoryRouter {
    fn current_path(&self) -> String {
        self.history.lock().last().cloned().unwrap_or_default()
    }

    fn push(&self, path: &str) {
        self.history.lock().push(path.to_string());
    }
}
