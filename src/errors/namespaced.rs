//! Errors for forms that embed formsets.
//!
//! The server reports one payload per top-level field ("namespace"). A plain
//! field's payload carries `fieldErrors`; a formset's payload carries
//! `formErrors`, one list per row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::normalize::{normalize, FormErrors, ServerFieldError};

/// Wire payload for a plain namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorsPayload {
    #[serde(default)]
    pub non_field_errors: Vec<String>,
    pub field_errors: Vec<ServerFieldError>,
}

/// Wire payload for a formset namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormsetErrorsPayload {
    #[serde(default)]
    pub non_form_errors: Vec<String>,
    pub form_errors: Vec<Vec<ServerFieldError>>,
}

/// One namespace's raw errors, discriminated by which list it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamespacedServerErrors {
    Formset(FormsetErrorsPayload),
    Fields(FieldErrorsPayload),
}

/// Normalized errors of a formset: errors about the set as a whole plus one
/// [`FormErrors`] per row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormsetErrors {
    pub non_form_errors: Vec<String>,
    pub form_errors: Vec<FormErrors>,
}

impl FormsetErrors {
    /// Errors for row `index`, if the server reported any.
    pub fn for_row(&self, index: usize) -> Option<&FormErrors> {
        self.form_errors.get(index).filter(|errors| !errors.is_empty())
    }

    pub fn count(&self) -> usize {
        self.non_form_errors.len() + self.form_errors.iter().map(FormErrors::count).sum::<usize>()
    }
}

/// Normalized errors of a single namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamespacedErrors {
    Formset(FormsetErrors),
    Fields(FormErrors),
}

impl NamespacedErrors {
    pub fn count(&self) -> usize {
        match self {
            NamespacedErrors::Formset(errors) => errors.count(),
            NamespacedErrors::Fields(errors) => errors.count(),
        }
    }
}

/// Per-namespace normalized errors plus a total message count.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespacedFormErrorMap {
    pub namespaces: BTreeMap<String, NamespacedErrors>,
    pub error_count: usize,
}

impl NamespacedFormErrorMap {
    pub fn get(&self, namespace: &str) -> Option<&NamespacedErrors> {
        self.namespaces.get(namespace)
    }

    /// Formset errors for `namespace`; `None` for plain or absent namespaces.
    pub fn formset(&self, namespace: &str) -> Option<&FormsetErrors> {
        match self.namespaces.get(namespace) {
            Some(NamespacedErrors::Formset(errors)) => Some(errors),
            _ => None,
        }
    }
}

/// Normalize every namespace of a formset-bearing response.
pub fn normalize_namespaced(
    collection: &BTreeMap<String, NamespacedServerErrors>,
) -> NamespacedFormErrorMap {
    let namespaces: BTreeMap<String, NamespacedErrors> = collection
        .iter()
        .map(|(namespace, payload)| (namespace.clone(), normalize_payload(payload)))
        .collect();
    let error_count = namespaces.values().map(NamespacedErrors::count).sum();

    NamespacedFormErrorMap {
        namespaces,
        error_count,
    }
}

fn normalize_payload(payload: &NamespacedServerErrors) -> NamespacedErrors {
    match payload {
        NamespacedServerErrors::Fields(payload) => {
            let mut errors = normalize(&payload.field_errors);
            let mut non_field = payload.non_field_errors.clone();
            non_field.append(&mut errors.non_field_errors);
            errors.non_field_errors = non_field;
            NamespacedErrors::Fields(errors)
        }
        NamespacedServerErrors::Formset(payload) => NamespacedErrors::Formset(FormsetErrors {
            non_form_errors: payload.non_form_errors.clone(),
            form_errors: payload.form_errors.iter().map(|row| normalize(row)).collect(),
        }),
    }
}
