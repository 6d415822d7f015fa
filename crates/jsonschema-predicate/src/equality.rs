//! JSON equality in two flavours.
//!
//! Structural equality compares numbers by value (`1 == 1.0`) and keeps arrays
//! and objects distinct. Native equality is `serde_json`'s own `==`, used when
//! fast assertions trade precision for speed.
use serde_json::{Map, Value};

use crate::number::equal_numbers;

#[must_use]
pub fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => equal_numbers(left, right),
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[inline]
fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| equal(l, r))
}

#[inline]
fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| equal(value, other)))
}

/// Whether all array items are pairwise distinct under the given equality.
pub(crate) fn is_unique(items: &[Value], eq: impl Fn(&Value, &Value) -> bool) -> bool {
    match items {
        [] | [_] => true,
        [first, second] => !eq(first, second),
        _ => items
            .iter()
            .enumerate()
            .all(|(idx, item)| items[idx + 1..].iter().all(|other| !eq(item, other))),
    }
}
