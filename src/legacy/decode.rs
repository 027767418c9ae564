//! Decoding of flat POST bodies into the nested form input shape.
//!
//! Formset rows arrive as `${formset}-${index}-${field}` with their count in
//! `${formset}-TOTAL_FORMS`; everything else is a top-level field. Fields
//! that repeat become lists.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::formset::{INITIAL_FORMS, MAX_NUM_FORMS, MIN_NUM_FORMS, TOTAL_FORMS};
use crate::value::FormData;

use super::is_discriminator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyError {
    #[error("Management field '{field}' has invalid value '{value}'")]
    InvalidManagementField { field: String, value: String },

    #[error("Management field '{field}' declares {total} rows, more than the limit of {max}")]
    TooManyForms {
        field: String,
        total: usize,
        max: usize,
    },
}

/// Decode a POST body, rejecting formsets that declare more than
/// `absolute_max` rows.
pub fn decode_post_fields(
    fields: &[(String, String)],
    absolute_max: usize,
) -> Result<FormData, LegacyError> {
    let mut formsets: BTreeMap<String, Vec<FormData>> = BTreeMap::new();
    for (name, value) in fields {
        let Some(prefix) = name.strip_suffix(&format!("-{TOTAL_FORMS}")) else {
            continue;
        };
        let total: usize = value
            .trim()
            .parse()
            .map_err(|_| LegacyError::InvalidManagementField {
                field: name.clone(),
                value: value.clone(),
            })?;
        if total > absolute_max {
            return Err(LegacyError::TooManyForms {
                field: name.clone(),
                total,
                max: absolute_max,
            });
        }
        formsets.insert(prefix.to_string(), vec![FormData::new(); total]);
    }

    let mut data = FormData::new();
    for (name, value) in fields {
        if is_discriminator(name) || is_management_field(name, &formsets) {
            continue;
        }
        if let Some((prefix, index, field)) = split_row_field(name, &formsets) {
            if let Some(row) = formsets.get_mut(prefix).and_then(|rows| rows.get_mut(index)) {
                insert_value(row, field, value);
            }
            continue;
        }
        insert_value(&mut data, name, value);
    }

    for (prefix, rows) in formsets {
        data.insert(
            prefix,
            Value::Array(rows.into_iter().map(Value::Object).collect()),
        );
    }
    Ok(data)
}

fn is_management_field(name: &str, formsets: &BTreeMap<String, Vec<FormData>>) -> bool {
    [TOTAL_FORMS, INITIAL_FORMS, MIN_NUM_FORMS, MAX_NUM_FORMS]
        .iter()
        .any(|suffix| {
            name.strip_suffix(*suffix)
                .and_then(|rest| rest.strip_suffix('-'))
                .is_some_and(|prefix| formsets.contains_key(prefix))
        })
}

/// Split `prefix-index-field` where `prefix` is a known formset.
fn split_row_field<'a>(
    name: &'a str,
    formsets: &BTreeMap<String, Vec<FormData>>,
) -> Option<(&'a str, usize, &'a str)> {
    formsets.keys().find_map(|prefix| {
        let rest = name.strip_prefix(prefix.as_str())?.strip_prefix('-')?;
        let (index, field) = rest.split_once('-')?;
        let index = index.parse().ok()?;
        Some((&name[..prefix.len()], index, field))
    })
}

/// Insert, turning repeated names into lists.
fn insert_value(target: &mut FormData, name: &str, value: &str) {
    let value = Value::String(value.to_string());
    match target.get_mut(name) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            target.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formset::DEFAULT_ABSOLUTE_MAX;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decodes_rows_and_scalars() {
        let body = pairs(&[
            ("graphql", "priorCases"),
            ("hasPriorCases", "True"),
            ("cases-TOTAL_FORMS", "2"),
            ("cases-INITIAL_FORMS", "1"),
            ("cases-0-court", "housing"),
            ("cases-1-court", ""),
        ]);
        let data = decode_post_fields(&body, DEFAULT_ABSOLUTE_MAX).unwrap();

        assert_eq!(
            Value::Object(data),
            json!({
                "hasPriorCases": "True",
                "cases": [{ "court": "housing" }, { "court": "" }]
            })
        );
    }

    #[test]
    fn repeated_fields_become_lists() {
        let body = pairs(&[("issues", "HEAT"), ("issues", "MOLD")]);
        let data = decode_post_fields(&body, DEFAULT_ABSOLUTE_MAX).unwrap();
        assert_eq!(data.get("issues"), Some(&json!(["HEAT", "MOLD"])));
    }

    #[test]
    fn rows_past_total_are_ignored() {
        let body = pairs(&[
            ("cases-TOTAL_FORMS", "1"),
            ("cases-0-court", "a"),
            ("cases-3-court", "b"),
        ]);
        let data = decode_post_fields(&body, DEFAULT_ABSOLUTE_MAX).unwrap();
        assert_eq!(data.get("cases"), Some(&json!([{ "court": "a" }])));
    }

    #[test]
    fn bad_total_is_rejected() {
        let body = pairs(&[("cases-TOTAL_FORMS", "lots")]);
        let err = decode_post_fields(&body, DEFAULT_ABSOLUTE_MAX).unwrap_err();
        assert_eq!(
            err,
            LegacyError::InvalidManagementField {
                field: "cases-TOTAL_FORMS".to_string(),
                value: "lots".to_string(),
            }
        );
    }

    #[test]
    fn oversized_total_is_rejected() {
        let huge = usize::MAX.to_string();
        let body = pairs(&[("cases-TOTAL_FORMS", huge.as_str())]);
        let err = decode_post_fields(&body, DEFAULT_ABSOLUTE_MAX).unwrap_err();
        assert_eq!(
            err,
            LegacyError::TooManyForms {
                field: "cases-TOTAL_FORMS".to_string(),
                total: usize::MAX,
                max: DEFAULT_ABSOLUTE_MAX,
            }
        );
    }

    #[test]
    fn total_at_the_limit_is_accepted() {
        let data = decode_post_fields(&pairs(&[("cases-TOTAL_FORMS", "3")]), 3).unwrap();
        assert_eq!(data.get("cases").and_then(Value::as_array).map(Vec::len), Some(3));

        let err = decode_post_fields(&pairs(&[("cases-TOTAL_FORMS", "4")]), 3).unwrap_err();
        assert!(matches!(err, LegacyError::TooManyForms { total: 4, max: 3, .. }));
    }
}
