use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{FormErrors, NamespacedFormErrorMap};
use crate::hidden::HiddenField;
use crate::value::FormData;

use super::{GRAPHQL_FIELD, LEGACY_FORM_ID_FIELD};

/// What the server did with a full-page POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LegacyOutcome {
    /// Validation failed; errors are already normalized.
    #[serde(rename_all = "camelCase")]
    Errors {
        errors: FormErrors,
        #[serde(default)]
        namespaced_errors: Option<NamespacedFormErrorMap>,
    },
    /// The mutation succeeded with `output`.
    Success { output: Value },
}

/// The last full-page POST the server handled for this page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPost {
    pub graphql: String,
    #[serde(default)]
    pub legacy_form_id: Option<String>,
    /// Submitted values, in the form's input shape.
    pub input: FormData,
    pub outcome: LegacyOutcome,
    /// Names of every field in the raw POST body.
    #[serde(default)]
    pub post_field_names: Vec<String>,
}

impl LegacyPost {
    pub fn matches(&self, graphql: &str, legacy_form_id: Option<&str>) -> bool {
        self.graphql == graphql && self.legacy_form_id.as_deref() == legacy_form_id
    }

    /// A "persist" form stays on its page after success instead of redirecting.
    pub fn is_persist_form(&self, persist_field_prefix: &str) -> bool {
        self.post_field_names
            .iter()
            .any(|name| name.starts_with(persist_field_prefix))
    }
}

/// Holds the server-provided POST record until one form claims it.
///
/// Claiming consumes the record, so re-renders after hydration never
/// replay it a second time.
#[derive(Debug, Default)]
pub struct LegacyPostSlot {
    post: Mutex<Option<LegacyPost>>,
}

impl LegacyPostSlot {
    pub fn new(post: Option<LegacyPost>) -> Self {
        Self {
            post: Mutex::new(post),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.post.lock().is_none()
    }

    /// Take the record if it belongs to the form identified by the arguments.
    pub fn take_matching(&self, graphql: &str, legacy_form_id: Option<&str>) -> Option<LegacyPost> {
        let mut post = self.post.lock();
        if post
            .as_ref()
            .is_some_and(|post| post.matches(graphql, legacy_form_id))
        {
            post.take()
        } else {
            None
        }
    }
}

/// Hidden inputs identifying which form a POST came from.
pub fn discriminator_fields(graphql: &str, legacy_form_id: Option<&str>) -> Vec<HiddenField> {
    let mut fields = vec![HiddenField::new(GRAPHQL_FIELD, graphql)];
    if let Some(id) = legacy_form_id {
        fields.push(HiddenField::new(LEGACY_FORM_ID_FIELD, id));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(legacy_form_id: Option<&str>) -> LegacyPost {
        LegacyPost {
            graphql: "login".to_string(),
            legacy_form_id: legacy_form_id.map(str::to_string),
            input: FormData::new(),
            outcome: LegacyOutcome::Success { output: json!({}) },
            post_field_names: vec!["graphql".to_string(), "__persist-page".to_string()],
        }
    }

    #[test]
    fn discriminator_requires_mutation_and_form_id() {
        let with_id = post(Some("a"));
        assert!(with_id.matches("login", Some("a")));
        assert!(!with_id.matches("login", Some("b")));
        assert!(!with_id.matches("login", None));
        assert!(!with_id.matches("logout", Some("a")));
        assert!(post(None).matches("login", None));
    }

    #[test]
    fn slot_is_consumed_once() {
        let slot = LegacyPostSlot::new(Some(post(None)));
        assert!(slot.take_matching("logout", None).is_none());
        assert!(!slot.is_empty());
        assert!(slot.take_matching("login", None).is_some());
        assert!(slot.take_matching("login", None).is_none());
        assert!(slot.is_empty());
    }

    #[test]
    fn persist_prefix_detected() {
        assert!(post(None).is_persist_form("__persist"));
        assert!(!post(None).is_persist_form("__keep"));
    }

    #[test]
    fn hidden_fields_include_form_id_only_when_set() {
        assert_eq!(
            discriminator_fields("login", None),
            vec![HiddenField::new("graphql", "login")]
        );
        assert_eq!(
            discriminator_fields("login", Some("sidebar")),
            vec![
                HiddenField::new("graphql", "login"),
                HiddenField::new("legacyFormId", "sidebar"),
            ]
        );
    }

    #[test]
    fn deserializes_server_record() {
        let record: LegacyPost = serde_json::from_value(json!({
            "graphql": "login",
            "input": { "phoneNumber": "555" },
            "outcome": {
                "status": "errors",
                "errors": { "nonFieldErrors": ["Invalid credentials"], "fieldErrors": {} }
            }
        }))
        .unwrap();
        assert_eq!(record.legacy_form_id, None);
        match record.outcome {
            LegacyOutcome::Errors { errors, .. } => {
                assert_eq!(errors.non_field_errors, vec!["Invalid credentials"]);
            }
            other => panic!("expected errors, got {other:?}"),
        }
    }
}
