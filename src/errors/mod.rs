//! Server error normalization.
//!
//! Mutations report validation problems as a flat list of
//! [`ServerFieldError`]s. Everything below the submission boundary works
//! with the grouped [`FormErrors`] shape instead; raw lists are normalized
//! exactly once, when a response arrives.

mod namespaced;
mod normalize;

pub use namespaced::{
    normalize_namespaced, FieldErrorsPayload, FormsetErrors, FormsetErrorsPayload,
    NamespacedErrors, NamespacedFormErrorMap, NamespacedServerErrors,
};
pub use normalize::{normalize, FormErrors, ServerFieldError, NON_FIELD_ERRORS};
