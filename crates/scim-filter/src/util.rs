//! Canonical string rendering for paths and filters.
//!
//! The output parses back to an equal AST with [`ScimPathParser`](crate::ScimPathParser).

use std::fmt;

use crate::types::*;

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(uri) = &self.uri_prefix {
            write!(f, "{uri}:")?;
        }
        f.write_str(&self.attribute_name)?;
        if let Some(sub) = &self.sub_attribute {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(uri) = &self.uri_prefix {
            write!(f, "{uri}:")?;
        }
        f.write_str(&self.attribute_name)?;
        if let Some(expr) = &self.value_expression {
            write!(f, "[{expr}]")?;
        }
        if let Some(sub) = &self.sub_attribute {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Present(path) => write!(f, "{path} pr"),
            Expression::Attribute {
                path,
                operator,
                value,
            } => write!(f, "{path} {operator} {value}"),
            Expression::Logical {
                operator,
                left,
                right,
            } => {
                write_operand(f, left, *operator, false)?;
                write!(f, " {operator} ")?;
                write_operand(f, right, *operator, true)
            }
            Expression::Not(inner) => write!(f, "not ({inner})"),
            Expression::ValuePath { path, filter } => write!(f, "{path}[{filter}]"),
        }
    }
}

/// The parser is left-associative with `and` binding tighter than `or`, so
/// an `or` below an `and`, or any logical right operand that would otherwise
/// re-associate, gets parentheses.
fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &Expression,
    parent: LogicalOperator,
    is_right: bool,
) -> fmt::Result {
    let wrap = match operand {
        Expression::Logical { operator, .. } => {
            (*operator == LogicalOperator::Or && parent == LogicalOperator::And)
                || (is_right && (*operator == parent || parent == LogicalOperator::And))
        }
        _ => false,
    };
    if wrap {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

/// Renders a path in its canonical text form.
pub fn path_to_string(path: &Path) -> String {
    path.to_string()
}

/// Renders a filter expression in its canonical text form.
pub fn expression_to_string(expr: &Expression) -> String {
    expr.to_string()
}
