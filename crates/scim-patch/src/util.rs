//! Structural equality and merge over attribute maps and lists.
//!
//! Attribute maps are unordered: two maps are equal when they hold the same
//! keys with equal values, whatever their insertion order.

use scim_schema::Attribute;
use serde_json::Value;

use crate::types::Resource;

/// Recursive equality. Numbers compare by value, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => eq_map(x, y),
        _ => a == b,
    }
}

/// Same key set and pointwise equal values.
pub fn eq_map(a: &Resource, b: &Resource) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(k, v)| b.get(k).is_some_and(|other| values_equal(v, other)))
}

/// Writes every entry of `src` into `dst` that is absent or different.
/// Returns true if `dst` changed.
pub fn merge_map(dst: &mut Resource, src: &Resource) -> bool {
    let mut changed = false;
    for (key, value) in src {
        let same = dst.get(key).is_some_and(|old| values_equal(old, value));
        if !same {
            dst.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Succeeds iff `value` is a list whose elements are all maps.
pub fn as_maps(value: &Value) -> Option<Vec<Resource>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|item| item.as_object().cloned())
        .collect()
}

pub fn contains_map(list: &[Value], item: &Resource) -> bool {
    list.iter()
        .any(|v| v.as_object().is_some_and(|m| eq_map(m, item)))
}

pub fn contains_item(list: &[Value], item: &Value) -> bool {
    list.iter().any(|v| values_equal(v, item))
}

/// Order-insensitive multiset comparison.
pub fn same_elements(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    'outer: for x in a {
        for (i, y) in b.iter().enumerate() {
            if !used[i] && values_equal(x, y) {
                used[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

pub fn is_multi_valued_complex(attr: &Attribute) -> bool {
    attr.multi_valued() && attr.has_sub_attributes()
}

/// True for values that count as "nothing": `null`, `{}`, `[]`.
pub(crate) fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}
