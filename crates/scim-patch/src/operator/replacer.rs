//! `replace` (RFC 7644 §3.5.2.3): overwrite what is there.

use scim_filter::Expression;
use serde_json::Value;

use super::Operator;
use crate::logger::PatchLogger;
use crate::matcher::is_match;
use crate::types::Resource;
use crate::util::{eq_map, is_empty_container, same_elements, values_equal};

#[derive(Debug, Clone, Copy, Default)]
pub struct Replacer;

impl Operator for Replacer {
    fn direct(
        &self,
        _log: &dyn PatchLogger,
        scoped: &mut Resource,
        key: &str,
        value: &Value,
    ) -> bool {
        if value.is_null() {
            return false;
        }
        // replacing with `[]` or `{}` clears the attribute
        if is_empty_container(value) {
            return scoped.shift_remove(key).is_some();
        }
        let unchanged = match (scoped.get(key), value) {
            (Some(Value::Array(old)), Value::Array(items)) => same_elements(old, items),
            (Some(Value::Object(old)), Value::Object(map)) => eq_map(old, map),
            (Some(old), _) => values_equal(old, value),
            (None, _) => false,
        };
        if unchanged {
            return false;
        }
        scoped.insert(key.to_string(), value.clone());
        true
    }

    fn by_value_expression_for_item(
        &self,
        log: &dyn PatchLogger,
        mut scoped: Vec<Resource>,
        expr: &Expression,
        value: &Value,
    ) -> (Vec<Resource>, bool) {
        let Some(replacement) = value.as_object() else {
            log.debug("replace: filtered item value is not an object, ignoring");
            return (scoped, false);
        };

        let mut changed = false;
        for element in scoped.iter_mut().filter(|e| is_match(e, expr)) {
            if !eq_map(element, replacement) {
                *element = replacement.clone();
                changed = true;
            }
        }
        (scoped, changed)
    }

    fn by_value_expression_for_attribute(
        &self,
        _log: &dyn PatchLogger,
        mut scoped: Vec<Resource>,
        expr: &Expression,
        sub_attribute: &str,
        value: &Value,
    ) -> (Vec<Resource>, bool) {
        if value.is_null() {
            return (scoped, false);
        }

        let mut changed = false;
        for element in scoped.iter_mut().filter(|e| is_match(e, expr)) {
            if !element
                .get(sub_attribute)
                .is_some_and(|old| values_equal(old, value))
            {
                element.insert(sub_attribute.to_string(), value.clone());
                changed = true;
            }
        }
        (scoped, changed)
    }
}
