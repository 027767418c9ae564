//! Structural comparison of JSON-like form values.
//!
//! Forms rebuild plain data on every edit, so nothing here relies on
//! identity. Exact equality is plain `Value` equality; [`equivalent`] is the
//! looser comparison used for dirtiness, where arrays compare as multisets.

use serde_json::{Map, Value};

/// A form's field values keyed by field name.
pub type FormData = Map<String, Value>;

/// Structural equality where arrays ignore element order.
///
/// Objects compare key by key (key order ignored), scalars by value.
pub fn equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(left), Value::Array(right)) => arrays_equivalent(left, right),
        (Value::Object(left), Value::Object(right)) => objects_equivalent(left, right),
        _ => a == b,
    }
}

/// [`equivalent`] lifted to whole form snapshots.
pub fn data_equivalent(a: &FormData, b: &FormData) -> bool {
    objects_equivalent(a, b)
}

fn objects_equivalent(left: &FormData, right: &FormData) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| equivalent(value, other)))
}

fn arrays_equivalent(left: &[Value], right: &[Value]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    // Greedy matching is exact here: `equivalent` is an equivalence relation.
    let mut used = vec![false; right.len()];
    left.iter().all(|item| {
        let found = right
            .iter()
            .enumerate()
            .find(|(i, candidate)| !used[*i] && equivalent(item, candidate));
        match found {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}
