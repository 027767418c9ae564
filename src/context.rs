//! Per-render form context.
//!
//! A [`FormContext`] hands each field its value, change handle, errors and
//! DOM naming, and remembers which fields were asked for. After a render
//! pass, [`FormContext::log_warnings`] reports any field of the form's data
//! that nothing rendered.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::{FormsetConfig, RenderCheckMode};
use crate::errors::{FormErrors, FormsetErrors, NamespacedErrors, NamespacedFormErrorMap};
use crate::formset::{self, AddEmptyForms, FormsetCollection};
use crate::hidden::HiddenField;
use crate::value::FormData;

/// Programmer errors raised while wiring fields to a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Field '{field}' is not part of this form")]
    UnknownField { field: String },

    #[error("Field '{field}' is not a formset (expected a list of rows)")]
    InvalidFormset { field: String },

    #[error("Row {index} of formset '{formset}' is not an object")]
    InvalidFormsetRow { formset: String, index: usize },

    #[error("Fields were never rendered: {}", fields.join(", "))]
    UnrenderedFields { fields: Vec<String> },
}

/// Receives `(field, new value)` for a form's data.
pub type FieldSetter = Arc<dyn Fn(&str, Value) + Send + Sync>;

/// Change handle bound to one field.
#[derive(Clone)]
pub struct FieldChange {
    field: String,
    setter: FieldSetter,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, setter: FieldSetter) -> Self {
        Self {
            field: field.into(),
            setter,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn set(&self, value: Value) {
        (self.setter)(&self.field, value);
    }
}

impl fmt::Debug for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldChange")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// Everything a field renderer needs.
#[derive(Debug, Clone)]
pub struct FieldProps {
    pub value: Value,
    pub on_change: FieldChange,
    pub errors: Vec<String>,
    pub name: String,
    pub id: String,
    pub is_disabled: bool,
}

/// Render context for one form (or one formset row).
pub struct FormContext<'a> {
    current: &'a FormData,
    setter: FieldSetter,
    id_prefix: String,
    name_prefix: String,
    is_loading: bool,
    errors: Option<&'a FormErrors>,
    namespaced: Option<&'a NamespacedFormErrorMap>,
    check_mode: RenderCheckMode,
    requested: BTreeSet<String>,
}

impl<'a> FormContext<'a> {
    pub fn new(current: &'a FormData, setter: FieldSetter) -> Self {
        Self {
            current,
            setter,
            id_prefix: String::new(),
            name_prefix: String::new(),
            is_loading: false,
            errors: None,
            namespaced: None,
            check_mode: RenderCheckMode::default(),
            requested: BTreeSet::new(),
        }
    }

    pub fn id_prefix(mut self, id_prefix: impl Into<String>) -> Self {
        self.id_prefix = id_prefix.into();
        self
    }

    pub fn name_prefix(mut self, name_prefix: impl Into<String>) -> Self {
        self.name_prefix = name_prefix.into();
        self
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    pub fn errors(mut self, errors: Option<&'a FormErrors>) -> Self {
        self.errors = errors;
        self
    }

    pub fn namespaced_errors(mut self, namespaced: Option<&'a NamespacedFormErrorMap>) -> Self {
        self.namespaced = namespaced;
        self
    }

    pub fn check_mode(mut self, check_mode: RenderCheckMode) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.errors
            .map(|errors| errors.non_field_errors.as_slice())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    fn full_name(&self, field: &str) -> String {
        format!("{}{}", self.name_prefix, field)
    }

    fn field_errors(&self, field: &str) -> Vec<String> {
        let mut messages: Vec<String> = self
            .errors
            .map(|errors| errors.for_field(field).to_vec())
            .unwrap_or_default();
        if let Some(NamespacedErrors::Fields(nested)) =
            self.namespaced.and_then(|map| map.get(field))
        {
            messages.extend(nested.non_field_errors.iter().cloned());
            messages.extend(nested.field_errors.values().flatten().cloned());
        }
        messages
    }

    /// Props for a scalar field. Marks the field as rendered.
    pub fn field_props_for(&mut self, field: &str) -> Result<FieldProps, ContextError> {
        let value = self
            .current
            .get(field)
            .cloned()
            .ok_or_else(|| ContextError::UnknownField {
                field: field.to_string(),
            })?;
        self.requested.insert(field.to_string());

        let name = self.full_name(field);
        Ok(FieldProps {
            value,
            on_change: FieldChange::new(field, Arc::clone(&self.setter)),
            errors: self.field_errors(field),
            id: format!("{}{}", self.id_prefix, name),
            name,
            is_disabled: self.is_loading,
        })
    }

    /// Props for a list-valued field. Marks the field as rendered.
    pub fn formset_props_for(&mut self, formset: &str) -> Result<FormsetProps<'a>, ContextError> {
        let items = match self.current.get(formset) {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(ContextError::InvalidFormset {
                    field: formset.to_string(),
                })
            }
            None => {
                return Err(ContextError::UnknownField {
                    field: formset.to_string(),
                })
            }
        };
        self.requested.insert(formset.to_string());

        Ok(FormsetProps {
            name: self.full_name(formset),
            items,
            errors: self.namespaced.and_then(|map| map.formset(formset)),
            on_change: FieldChange::new(formset, Arc::clone(&self.setter)),
            id_prefix: self.id_prefix.clone(),
            is_loading: self.is_loading,
            check_mode: self.check_mode,
        })
    }

    /// Fields of the form's data never passed to `*_props_for`.
    pub fn unrendered_fields(&self) -> Vec<String> {
        self.current
            .keys()
            .filter(|key| !self.requested.contains(key.as_str()))
            .cloned()
            .collect()
    }

    /// Post-render completeness check.
    ///
    /// Strict mode fails with [`ContextError::UnrenderedFields`]; warn mode
    /// logs and succeeds.
    pub fn log_warnings(&self) -> Result<(), ContextError> {
        let fields = self.unrendered_fields();
        if fields.is_empty() {
            return Ok(());
        }
        match self.check_mode {
            RenderCheckMode::Strict => Err(ContextError::UnrenderedFields { fields }),
            RenderCheckMode::Warn => {
                tracing::warn!(
                    name_prefix = %self.name_prefix,
                    fields = ?fields,
                    "Form fields were never rendered"
                );
                Ok(())
            }
        }
    }
}

/// Layout options for a formset.
#[derive(Debug, Clone, PartialEq)]
pub struct FormsetOptions {
    pub empty_form: Option<Value>,
    pub max_num: Option<usize>,
    pub extra: usize,
    pub is_mounted: bool,
}

impl Default for FormsetOptions {
    fn default() -> Self {
        Self {
            empty_form: None,
            max_num: None,
            extra: 1,
            is_mounted: false,
        }
    }
}

impl FormsetOptions {
    /// Options seeded from the configured formset defaults.
    pub fn from_config(config: &FormsetConfig) -> Self {
        Self {
            max_num: config.default_max_num,
            extra: config.default_extra,
            ..Self::default()
        }
    }

    pub fn empty_form(mut self, empty_form: Value) -> Self {
        self.empty_form = Some(empty_form);
        self
    }

    pub fn mounted(mut self, is_mounted: bool) -> Self {
        self.is_mounted = is_mounted;
        self
    }
}

/// A formset field as handed out by [`FormContext::formset_props_for`].
#[derive(Debug, Clone)]
pub struct FormsetProps<'a> {
    pub name: String,
    pub items: Vec<Value>,
    pub errors: Option<&'a FormsetErrors>,
    pub on_change: FieldChange,
    id_prefix: String,
    is_loading: bool,
    check_mode: RenderCheckMode,
}

impl<'a> FormsetProps<'a> {
    /// Reconcile rows against `options`, ready for rendering.
    pub fn view(self, options: FormsetOptions) -> FormsetView<'a> {
        let collection = formset::add_empty_forms(
            AddEmptyForms::new(self.items.clone(), options.empty_form.as_ref())
                .max_num(options.max_num)
                .extra(options.extra)
                .mounted(options.is_mounted),
        );
        FormsetView {
            props: self,
            collection,
            options,
        }
    }
}

/// Reconciled formset: padded rows plus management fields.
#[derive(Debug, Clone)]
pub struct FormsetView<'a> {
    props: FormsetProps<'a>,
    collection: FormsetCollection<Value>,
    options: FormsetOptions,
}

impl<'a> FormsetView<'a> {
    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn collection(&self) -> &FormsetCollection<Value> {
        &self.collection
    }

    pub fn non_form_errors(&self) -> &[String] {
        self.props
            .errors
            .map(|errors| errors.non_form_errors.as_slice())
            .unwrap_or_default()
    }

    pub fn management_fields(&self) -> Vec<HiddenField> {
        formset::management_fields(&self.props.name, &self.collection, self.options.max_num)
    }

    /// One nested context per row, named `${formset}-${index}-${field}`.
    ///
    /// Row edits are written back through the formset's change handle after
    /// re-trimming trailing blank rows.
    pub fn rows(&self) -> Result<Vec<FormContext<'_>>, ContextError> {
        self.collection
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let Value::Object(row) = item else {
                    return Err(ContextError::InvalidFormsetRow {
                        formset: self.props.name.clone(),
                        index,
                    });
                };
                Ok(FormContext::new(row, self.row_setter(index))
                    .id_prefix(self.props.id_prefix.clone())
                    .name_prefix(format!("{}-{}-", self.props.name, index))
                    .loading(self.props.is_loading)
                    .errors(self.props.errors.and_then(|errors| errors.for_row(index)))
                    .check_mode(self.props.check_mode))
            })
            .collect()
    }

    fn row_setter(&self, index: usize) -> FieldSetter {
        let items = self.collection.items.clone();
        let empty_form = self.options.empty_form.clone();
        let on_change = self.props.on_change.clone();

        Arc::new(move |field: &str, value: Value| {
            let mut row = items.get(index).cloned().unwrap_or_else(|| Value::Object(FormData::new()));
            if let Value::Object(map) = &mut row {
                map.insert(field.to_string(), value);
            }
            let updated = formset::set_row(items.clone(), index, row, empty_form.as_ref());
            on_change.set(Value::Array(updated));
        })
    }
}
