//! Mutation strategies for `add`, `replace` and `remove`.
//!
//! Each strategy implements [`Operator`]. The patcher picks the capability
//! from the path shape:
//!
//! | Path                       | Capability                              |
//! |----------------------------|-----------------------------------------|
//! | none, `attr`, `attr.sub`   | [`Operator::direct`]                    |
//! | `attr[filter]`             | [`Operator::by_value_expression_for_item`] |
//! | `attr[filter].sub`         | [`Operator::by_value_expression_for_attribute`] |
//!
//! Operators never fail. Values that do not fit the target shape are no-ops.
//!
//! The returned flag tells the patcher whether the operator wrote anything.
//! On `false` a scoped map is put back without pruning empty containers, and
//! a scoped list is not written back at all. The changed flag reported to
//! callers is computed separately, by comparing the resource before and
//! after.

use scim_filter::Expression;
use serde_json::Value;

use crate::logger::PatchLogger;
use crate::types::Resource;

mod adder;
mod remover;
mod replacer;

pub use adder::Adder;
pub use remover::Remover;
pub use replacer::Replacer;

pub trait Operator: Send + Sync {
    /// Mutates `scoped[key]`. Must return true whenever the map was written.
    fn direct(&self, log: &dyn PatchLogger, scoped: &mut Resource, key: &str, value: &Value)
        -> bool;

    /// Acts on the elements matching `expr` as a whole. The list is written
    /// back only when the flag is true.
    fn by_value_expression_for_item(
        &self,
        log: &dyn PatchLogger,
        scoped: Vec<Resource>,
        expr: &Expression,
        value: &Value,
    ) -> (Vec<Resource>, bool);

    /// Acts on `sub_attribute` of the elements matching `expr`.
    fn by_value_expression_for_attribute(
        &self,
        log: &dyn PatchLogger,
        scoped: Vec<Resource>,
        expr: &Expression,
        sub_attribute: &str,
        value: &Value,
    ) -> (Vec<Resource>, bool);
}
