//! Filter evaluation against elements of a multi-valued attribute.
//!
//! Only `attr eq literal` is interpreted. Every other expression shape or
//! operator matches nothing.

use scim_filter::{AttributePath, CompareOperator, Expression};
use serde_json::Value;

use crate::types::Resource;
use crate::util::values_equal;

/// Returns the attribute name and literal of a plain `attr eq literal` filter.
fn equality(expr: &Expression) -> Option<(&str, &Value)> {
    match expr {
        Expression::Attribute {
            path:
                AttributePath {
                    uri_prefix: None,
                    attribute_name,
                    sub_attribute: None,
                },
            operator: CompareOperator::Eq,
            value,
        } => Some((attribute_name.as_str(), value)),
        _ => None,
    }
}

pub fn is_match(fragment: &Resource, expr: &Expression) -> bool {
    match equality(expr) {
        Some((name, literal)) => fragment
            .get(name)
            .is_some_and(|stored| values_equal(stored, literal)),
        None => false,
    }
}

/// Materializes an `eq` filter as a one-attribute element, e.g.
/// `type eq "work"` becomes `{"type": "work"}`. Empty for any other filter.
pub fn to_resource(expr: &Expression) -> Resource {
    let mut out = Resource::new();
    if let Some((name, literal)) = equality(expr) {
        out.insert(name.to_string(), literal.clone());
    }
    out
}
