use serde_json::Value;

use crate::errors::{FormErrors, NamespacedFormErrorMap};
use crate::mvi::Intent;

use super::state::SuccessRedirect;

#[derive(Debug, Clone)]
pub enum SubmissionIntent {
    FieldChanged { field: String, value: Value },
    /// Ignored while a submission is already in flight.
    Submit,
    /// The server rejected the input.
    Failed {
        errors: FormErrors,
        namespaced_errors: Option<NamespacedFormErrorMap>,
    },
    /// The mutation itself failed (network, transport).
    TransportFailed { message: String },
    Succeeded { redirect: Option<SuccessRedirect> },
    /// The router moved from `from` to `to`.
    RouteChanged { from: String, to: String },
    /// Restore the initial snapshot.
    Reset,
}

impl Intent for SubmissionIntent {}
