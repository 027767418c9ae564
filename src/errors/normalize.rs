use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name the server uses for form-wide errors.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// One entry of a mutation's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerFieldError {
    pub field: String,
    pub messages: Vec<String>,
}

impl ServerFieldError {
    pub fn new<I, S>(field: impl Into<String>, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// A form-wide error (`field == "__all__"`).
    pub fn non_field<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(NON_FIELD_ERRORS, messages)
    }
}

/// Errors grouped by field, ready for rendering.
///
/// Every entry in `field_errors` holds at least one message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormErrors {
    pub non_field_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.non_field_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Messages for one field; empty when the field has none.
    pub fn for_field(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of individual messages.
    pub fn count(&self) -> usize {
        self.non_field_errors.len() + self.field_errors.values().map(Vec::len).sum::<usize>()
    }

    /// Flatten back into the list shape a server would send.
    ///
    /// Non-field errors come first, then one entry per field.
    pub fn to_server_shape(&self) -> Vec<ServerFieldError> {
        let mut out = Vec::with_capacity(self.field_errors.len() + 1);
        if !self.non_field_errors.is_empty() {
            out.push(ServerFieldError::non_field(self.non_field_errors.clone()));
        }
        out.extend(
            self.field_errors
                .iter()
                .map(|(field, messages)| ServerFieldError::new(field.clone(), messages.clone())),
        );
        out
    }

    fn push(&mut self, error: &ServerFieldError) {
        if error.field == NON_FIELD_ERRORS {
            self.non_field_errors.extend(error.messages.iter().cloned());
            return;
        }
        if error.messages.is_empty() {
            return;
        }
        self.field_errors
            .entry(error.field.clone())
            .or_default()
            .extend(error.messages.iter().cloned());
    }
}

/// Group a flat server error list by field.
///
/// Repeated entries for one field are concatenated in server order.
pub fn normalize(errors: &[ServerFieldError]) -> FormErrors {
    let mut result = FormErrors::default();
    for error in errors {
        result.push(error);
    }
    result
}
