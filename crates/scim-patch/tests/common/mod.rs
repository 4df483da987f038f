#![allow(dead_code)]

use scim_filter::{Path, ScimPathParser};
use scim_patch::{OpKind, PatchOperation, Patcher, PatcherOptions, Resource};
use scim_schema::{core_user_schema, enterprise_user_extension, Attribute, Mutability, Schema};
use serde_json::Value;

pub const ENTERPRISE: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
pub const TEST_SCHEMA: &str = "urn:ivixvi:testSchema";

/// Extension with a multi-valued simple attribute and an immutable one.
pub fn test_extension() -> Schema {
    Schema::new(TEST_SCHEMA)
        .with_name("test")
        .with_description("test")
        .with_attribute(Attribute::string("testString").multi())
        .with_attribute(Attribute::string("immutableString").with_mutability(Mutability::Immutable))
}

pub fn patcher() -> Patcher {
    Patcher::new(
        core_user_schema(),
        vec![enterprise_user_extension(), test_extension()],
        PatcherOptions::default(),
    )
}

pub fn path(s: &str) -> Option<Path> {
    match ScimPathParser::parse_path(s) {
        Ok(p) => Some(p),
        Err(e) => panic!("failed to parse {s}: {e}"),
    }
}

pub fn resource(v: Value) -> Resource {
    match v {
        Value::Object(m) => m,
        other => panic!("fixture is not an object: {other}"),
    }
}

pub fn op(kind: OpKind, p: &str, value: Value) -> PatchOperation {
    let p = if p.is_empty() { None } else { path(p) };
    PatchOperation::new(kind, p, value)
}

/// One row of a patch matrix.
pub struct Case {
    pub name: &'static str,
    pub op: PatchOperation,
    pub data: Value,
    pub expected: Value,
    pub changed: bool,
}

pub fn run_cases(cases: Vec<Case>) {
    let patcher = patcher();
    for case in cases {
        let mut res = resource(case.data);
        let changed = patcher
            .apply(&case.op, &mut res)
            .unwrap_or_else(|e| panic!("{}: unexpected error {e}", case.name));
        assert_eq!(Value::Object(res), case.expected, "{}", case.name);
        assert_eq!(changed, case.changed, "{}: changed", case.name);
    }
}
