use scim_filter::{
    AttributePath, CompareOperator, Expression, LogicalOperator, ParseError, Path, ScimPathParser,
};
use serde_json::json;

const ENTERPRISE: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

#[test]
fn path_matrix() {
    let cases: Vec<(&str, Path)> = vec![
        ("userName", Path::new("userName")),
        ("name.givenName", Path::new("name").with_sub_attribute("givenName")),
        ("  active  ", Path::new("active")),
        (
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:employeeNumber",
            Path::new("employeeNumber").with_uri(ENTERPRISE),
        ),
        (
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.value",
            Path::new("manager")
                .with_uri(ENTERPRISE)
                .with_sub_attribute("value"),
        ),
        (
            "urn:ietf:params:scim:schemas:core:2.0:User:displayName",
            Path::new("displayName").with_uri("urn:ietf:params:scim:schemas:core:2.0:User"),
        ),
        (
            r#"members[value eq "2819c223"]"#,
            Path::new("members").with_filter(Expression::equals("value", "2819c223")),
        ),
        (
            r#"emails[type eq "work"].value"#,
            Path::new("emails")
                .with_filter(Expression::equals("type", "work"))
                .with_sub_attribute("value"),
        ),
        (
            r#"urn:ivixvi:testSchema:testString[value eq "delete"]"#,
            Path::new("testString")
                .with_uri("urn:ivixvi:testSchema")
                .with_filter(Expression::equals("value", "delete")),
        ),
    ];

    for (input, expected) in cases {
        let parsed = ScimPathParser::parse_path(input)
            .unwrap_or_else(|e| panic!("failed to parse {input:?}: {e}"));
        assert_eq!(parsed, expected, "input: {input}");
    }
}

#[test]
fn filter_matrix() {
    let cases: Vec<(&str, Expression)> = vec![
        (
            r#"userName Eq "bjensen""#,
            Expression::equals("userName", "bjensen"),
        ),
        (
            "title pr",
            Expression::Present(AttributePath::new("title")),
        ),
        (
            r#"name.familyName co "O'Malley""#,
            Expression::Attribute {
                path: AttributePath::new("name").with_sub_attribute("familyName"),
                operator: CompareOperator::Co,
                value: json!("O'Malley"),
            },
        ),
        (
            "meta.lastModified gt 1000",
            Expression::Attribute {
                path: AttributePath::new("meta").with_sub_attribute("lastModified"),
                operator: CompareOperator::Gt,
                value: json!(1000),
            },
        ),
        (
            "primary eq TRUE",
            Expression::equals("primary", json!(true)),
        ),
        (
            "manager eq null",
            Expression::equals("manager", json!(null)),
        ),
        (
            r#"title pr and userType eq "Employee""#,
            Expression::Logical {
                operator: LogicalOperator::And,
                left: Box::new(Expression::Present(AttributePath::new("title"))),
                right: Box::new(Expression::equals("userType", "Employee")),
            },
        ),
        (
            r#"userType eq "Employee" and not (emails co "example.com")"#,
            Expression::Logical {
                operator: LogicalOperator::And,
                left: Box::new(Expression::equals("userType", "Employee")),
                right: Box::new(Expression::Not(Box::new(Expression::Attribute {
                    path: AttributePath::new("emails"),
                    operator: CompareOperator::Co,
                    value: json!("example.com"),
                }))),
            },
        ),
        (
            r#"emails[type eq "work" and value co "@example.com"]"#,
            Expression::ValuePath {
                path: AttributePath::new("emails"),
                filter: Box::new(Expression::Logical {
                    operator: LogicalOperator::And,
                    left: Box::new(Expression::equals("type", "work")),
                    right: Box::new(Expression::Attribute {
                        path: AttributePath::new("value"),
                        operator: CompareOperator::Co,
                        value: json!("@example.com"),
                    }),
                }),
            },
        ),
    ];

    for (input, expected) in cases {
        let parsed = ScimPathParser::parse_filter(input)
            .unwrap_or_else(|e| panic!("failed to parse {input:?}: {e}"));
        assert_eq!(parsed, expected, "input: {input}");
    }
}

#[test]
fn precedence_and_binds_tighter() {
    let expr = ScimPathParser::parse_filter("a pr or b pr and c pr").unwrap();
    match expr {
        Expression::Logical {
            operator: LogicalOperator::Or,
            right,
            ..
        } => assert!(matches!(
            *right,
            Expression::Logical {
                operator: LogicalOperator::And,
                ..
            }
        )),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn error_matrix() {
    let cases: Vec<(&str, ParseError)> = vec![
        ("", ParseError::UnexpectedEnd),
        ("emails[", ParseError::UnexpectedEnd),
        (r#"emails[type eq "work""#, ParseError::UnexpectedEnd),
        (r#"emails[type eq "work"#, ParseError::UnclosedString),
        (r#"emails[type zz "work"]"#, ParseError::UnknownOperator("zz".into())),
        ("emails[type eq work]", ParseError::InvalidCompareValue),
        ("emails[type eq 1.]", ParseError::InvalidNumber),
        (r#"emails[type eq "\q"]"#, ParseError::InvalidEscape),
        ("1name", ParseError::InvalidAttributeName("1name".into())),
        ("name.", ParseError::InvalidAttributeName("".into())),
        (r#"name.givenName[value eq "x"]"#, ParseError::UnexpectedChar('[')),
        ("userName extra", ParseError::TrailingInput("extra".into())),
    ];

    for (input, expected) in cases {
        assert_eq!(
            ScimPathParser::parse_path(input),
            Err(expected),
            "input: {input}"
        );
    }
}

#[test]
fn display_round_trips_through_parser() {
    let inputs = [
        r#"emails[type eq "work"].value"#,
        r#"urn:ivixvi:testSchema:testString[value eq "delete"]"#,
        r#"addresses[type eq "home" and (primary eq true or locality sw "Lon")].street"#,
        r#"x509Certificates[not (value pr)]"#,
    ];
    for input in inputs {
        let parsed = ScimPathParser::parse_path(input).unwrap();
        let rendered = parsed.to_string();
        assert_eq!(ScimPathParser::parse_path(&rendered).unwrap(), parsed, "input: {input}");
    }
}
