//! `add` (RFC 7644 §3.5.2.1): merge into what is there.

use scim_filter::Expression;
use serde_json::Value;

use super::Operator;
use crate::logger::PatchLogger;
use crate::matcher::{is_match, to_resource};
use crate::types::Resource;
use crate::util::{contains_item, contains_map, merge_map, values_equal};

#[derive(Debug, Clone, Copy, Default)]
pub struct Adder;

impl Adder {
    /// Appends the elements of `items` not already in the list.
    fn add_list(scoped: &mut Resource, key: &str, items: &[Value]) -> bool {
        if items.is_empty() {
            return false;
        }
        if !matches!(scoped.get(key), Some(Value::Array(_))) {
            scoped.insert(key.to_string(), Value::Array(Vec::new()));
        }
        let Some(Value::Array(existing)) = scoped.get_mut(key) else {
            return false;
        };
        let mut changed = false;
        for item in items {
            let present = match item.as_object() {
                Some(map) => contains_map(existing, map),
                None => contains_item(existing, item),
            };
            if !present {
                existing.push(item.clone());
                changed = true;
            }
        }
        changed
    }

    fn add_map(scoped: &mut Resource, key: &str, map: &Resource) -> bool {
        if map.is_empty() {
            return false;
        }
        match scoped.get_mut(key) {
            Some(Value::Object(existing)) => merge_map(existing, map),
            _ => {
                scoped.insert(key.to_string(), Value::Object(map.clone()));
                true
            }
        }
    }

    fn add_value(scoped: &mut Resource, key: &str, value: &Value) -> bool {
        if scoped.get(key).is_some_and(|old| values_equal(old, value)) {
            return false;
        }
        scoped.insert(key.to_string(), value.clone());
        true
    }
}

impl Operator for Adder {
    fn direct(
        &self,
        _log: &dyn PatchLogger,
        scoped: &mut Resource,
        key: &str,
        value: &Value,
    ) -> bool {
        match value {
            Value::Null => false,
            Value::Array(items) => Self::add_list(scoped, key, items),
            Value::Object(map) => Self::add_map(scoped, key, map),
            _ => Self::add_value(scoped, key, value),
        }
    }

    fn by_value_expression_for_item(
        &self,
        log: &dyn PatchLogger,
        mut scoped: Vec<Resource>,
        expr: &Expression,
        value: &Value,
    ) -> (Vec<Resource>, bool) {
        let Some(patch) = value.as_object() else {
            log.debug("add: filtered item value is not an object, ignoring");
            return (scoped, false);
        };

        let mut changed = false;
        let mut found = false;
        for element in scoped.iter_mut().filter(|e| is_match(e, expr)) {
            found = true;
            changed |= merge_map(element, patch);
        }

        if !found {
            let mut element = to_resource(expr);
            if !element.is_empty() {
                merge_map(&mut element, patch);
                scoped.push(element);
                changed = true;
            }
        }
        (scoped, changed)
    }

    fn by_value_expression_for_attribute(
        &self,
        log: &dyn PatchLogger,
        mut scoped: Vec<Resource>,
        expr: &Expression,
        sub_attribute: &str,
        value: &Value,
    ) -> (Vec<Resource>, bool) {
        if value.is_null() {
            return (scoped, false);
        }

        let mut changed = false;
        let mut found = false;
        for element in scoped.iter_mut().filter(|e| is_match(e, expr)) {
            found = true;
            if !element
                .get(sub_attribute)
                .is_some_and(|old| values_equal(old, value))
            {
                element.insert(sub_attribute.to_string(), value.clone());
                changed = true;
            }
        }

        if !found {
            let mut element = to_resource(expr);
            if element.is_empty() {
                log.debug("add: filter cannot describe a new element, ignoring");
            } else {
                element.insert(sub_attribute.to_string(), value.clone());
                scoped.push(element);
                changed = true;
            }
        }
        (scoped, changed)
    }
}
