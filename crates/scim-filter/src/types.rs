//! SCIM path and filter types based on RFC 7644 §3.4.2.2 and §3.5.2.

use serde_json::Value;

/// An attribute reference: `[URI ":"] name ["." subAttr]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    /// Schema URI prefix, e.g. `urn:ietf:params:scim:schemas:extension:enterprise:2.0:User`.
    pub uri_prefix: Option<String>,
    /// Attribute name: `emails`, `name`, `department`.
    pub attribute_name: String,
    /// Sub-attribute name: `givenName` in `name.givenName`.
    pub sub_attribute: Option<String>,
}

impl AttributePath {
    pub fn new(attribute_name: impl Into<String>) -> Self {
        Self {
            uri_prefix: None,
            attribute_name: attribute_name.into(),
            sub_attribute: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri_prefix = Some(uri.into());
        self
    }

    pub fn with_sub_attribute(mut self, sub: impl Into<String>) -> Self {
        self.sub_attribute = Some(sub.into());
        self
    }
}

/// Target of a PATCH operation.
///
/// ```text
/// PATH = attrPath / valuePath [subAttr]
/// ```
///
/// `sub_attribute` holds either the `attrPath` sub-attribute (`name.givenName`)
/// or the sub-attribute following a value filter (`emails[type eq "work"].value`);
/// the grammar never allows both.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub uri_prefix: Option<String>,
    pub attribute_name: String,
    pub sub_attribute: Option<String>,
    /// Value filter of a `valuePath`: `type eq "work"`.
    pub value_expression: Option<Expression>,
}

impl Path {
    pub fn new(attribute_name: impl Into<String>) -> Self {
        Self {
            uri_prefix: None,
            attribute_name: attribute_name.into(),
            sub_attribute: None,
            value_expression: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri_prefix = Some(uri.into());
        self
    }

    pub fn with_sub_attribute(mut self, sub: impl Into<String>) -> Self {
        self.sub_attribute = Some(sub.into());
        self
    }

    pub fn with_filter(mut self, expr: Expression) -> Self {
        self.value_expression = Some(expr);
        self
    }
}

/// Filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Presence test: `title pr`
    Present(AttributePath),
    /// Comparison: `type eq "work"`
    Attribute {
        path: AttributePath,
        operator: CompareOperator,
        value: Value,
    },
    /// Logical expression: `a eq 1 and b eq 2`
    Logical {
        operator: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Negation: `not (a eq 1)`
    Not(Box<Expression>),
    /// Nested value path: `emails[type eq "work"]`
    ValuePath {
        path: AttributePath,
        filter: Box<Expression>,
    },
}

impl Expression {
    /// Shorthand for `name eq value`.
    pub fn equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Expression::Attribute {
            path: AttributePath::new(name),
            operator: CompareOperator::Eq,
            value: value.into(),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    Eq, // equal
    Ne, // not equal
    Co, // contains
    Sw, // starts with
    Ew, // ends with
    Gt, // greater than
    Ge, // greater than or equal to
    Lt, // less than
    Le, // less than or equal to
}

impl CompareOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOperator::Eq => "eq",
            CompareOperator::Ne => "ne",
            CompareOperator::Co => "co",
            CompareOperator::Sw => "sw",
            CompareOperator::Ew => "ew",
            CompareOperator::Gt => "gt",
            CompareOperator::Ge => "ge",
            CompareOperator::Lt => "lt",
            CompareOperator::Le => "le",
        }
    }

    /// Operator keywords are case-insensitive.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Some(CompareOperator::Eq),
            "ne" => Some(CompareOperator::Ne),
            "co" => Some(CompareOperator::Co),
            "sw" => Some(CompareOperator::Sw),
            "ew" => Some(CompareOperator::Ew),
            "gt" => Some(CompareOperator::Gt),
            "ge" => Some(CompareOperator::Ge),
            "lt" => Some(CompareOperator::Lt),
            "le" => Some(CompareOperator::Le),
            _ => None,
        }
    }
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}
