//! SCIM attribute path and filter expressions (RFC 7644 §3.4.2.2).
//!
//! This crate parses the `path` of a PATCH operation and standalone filter
//! expressions into an AST, and renders the AST back to text.
//!
//! # Example
//!
//! ```
//! use scim_filter::{CompareOperator, Expression, ScimPathParser};
//!
//! let path = ScimPathParser::parse_path(r#"emails[type eq "work"].value"#).unwrap();
//! assert_eq!(path.attribute_name, "emails");
//! assert_eq!(path.sub_attribute.as_deref(), Some("value"));
//!
//! match path.value_expression {
//!     Some(Expression::Attribute { operator, .. }) => assert_eq!(operator, CompareOperator::Eq),
//!     other => panic!("unexpected filter: {other:?}"),
//! }
//! ```

mod types;
pub use types::*;

mod parser;
pub use parser::{ParseError, ScimPathParser};

mod util;
pub use util::{expression_to_string, path_to_string};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_attribute() {
        let path = ScimPathParser::parse_path("displayName").unwrap();
        assert_eq!(path, Path::new("displayName"));
    }

    #[test]
    fn test_parse_sub_attribute() {
        let path = ScimPathParser::parse_path("name.familyName").unwrap();
        assert_eq!(path, Path::new("name").with_sub_attribute("familyName"));
    }

    #[test]
    fn test_parse_extension_attribute() {
        let path = ScimPathParser::parse_path(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department",
        )
        .unwrap();
        assert_eq!(
            path,
            Path::new("department")
                .with_uri("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User")
        );
    }

    #[test]
    fn test_parse_value_path() {
        let path = ScimPathParser::parse_path(r#"emails[type eq "work"]"#).unwrap();
        assert_eq!(
            path,
            Path::new("emails").with_filter(Expression::equals("type", "work"))
        );
    }

    #[test]
    fn test_parse_value_path_sub_attribute() {
        let path = ScimPathParser::parse_path(r#"addresses[primary eq true].locality"#).unwrap();
        assert_eq!(path.attribute_name, "addresses");
        assert_eq!(path.sub_attribute.as_deref(), Some("locality"));
        assert_eq!(
            path.value_expression,
            Some(Expression::equals("primary", json!(true)))
        );
    }

    #[test]
    fn test_parse_rejects_sub_attribute_before_filter() {
        assert_eq!(
            ScimPathParser::parse_path(r#"name.givenName[value eq "x"]"#),
            Err(ParseError::UnexpectedChar('['))
        );
    }

    #[test]
    fn test_parse_rejects_trailing_input() {
        assert!(matches!(
            ScimPathParser::parse_path(r#"emails[type eq "work"]x"#),
            Err(ParseError::TrailingInput(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ScimPathParser::parse_path(""), Err(ParseError::UnexpectedEnd));
        assert_eq!(ScimPathParser::parse_filter("   "), Err(ParseError::UnexpectedEnd));
    }
}
