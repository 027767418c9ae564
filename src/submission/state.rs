use serde::{Deserialize, Serialize};

use crate::errors::{FormErrors, NamespacedFormErrorMap};
use crate::mvi::UiState;
use crate::value::FormData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    /// Succeeded and navigating away; stays loading through the transition.
    SuccessRedirecting,
}

/// Where a successful submission navigated from and to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessRedirect {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionState {
    pub phase: Phase,
    pub is_loading: bool,
    pub errors: Option<FormErrors>,
    pub namespaced_errors: Option<NamespacedFormErrorMap>,
    pub is_dirty: bool,
    pub was_submitted_successfully: bool,
    pub last_success_redirect: Option<SuccessRedirect>,
    /// Snapshot dirtiness is measured against.
    pub initial: FormData,
    pub current: FormData,
}

impl UiState for SubmissionState {}

impl SubmissionState {
    pub fn new(initial: FormData) -> Self {
        Self {
            current: initial.clone(),
            initial,
            ..Self::default()
        }
    }

    /// Seed a state that already carries server errors.
    pub fn with_errors(
        mut self,
        errors: FormErrors,
        namespaced_errors: Option<NamespacedFormErrorMap>,
    ) -> Self {
        self.errors = Some(errors);
        self.namespaced_errors = namespaced_errors;
        self
    }

    /// Whether the form should hold a navigation guard.
    pub fn should_guard(&self) -> bool {
        self.is_dirty && !self.was_submitted_successfully
    }
}
