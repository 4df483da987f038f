//! `remove` (RFC 7644 §3.5.2.2). The operation value is ignored.

use scim_filter::Expression;
use serde_json::Value;

use super::Operator;
use crate::logger::PatchLogger;
use crate::matcher::is_match;
use crate::types::Resource;

#[derive(Debug, Clone, Copy, Default)]
pub struct Remover;

impl Operator for Remover {
    fn direct(
        &self,
        _log: &dyn PatchLogger,
        scoped: &mut Resource,
        key: &str,
        _value: &Value,
    ) -> bool {
        scoped.shift_remove(key).is_some()
    }

    fn by_value_expression_for_item(
        &self,
        _log: &dyn PatchLogger,
        mut scoped: Vec<Resource>,
        expr: &Expression,
        _value: &Value,
    ) -> (Vec<Resource>, bool) {
        let before = scoped.len();
        scoped.retain(|element| !is_match(element, expr));
        let changed = scoped.len() != before;
        (scoped, changed)
    }

    fn by_value_expression_for_attribute(
        &self,
        _log: &dyn PatchLogger,
        mut scoped: Vec<Resource>,
        expr: &Expression,
        sub_attribute: &str,
        _value: &Value,
    ) -> (Vec<Resource>, bool) {
        let mut changed = false;
        for element in scoped.iter_mut().filter(|e| is_match(e, expr)) {
            changed |= element.shift_remove(sub_attribute).is_some();
        }
        (scoped, changed)
    }
}
