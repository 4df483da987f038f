//! JSON codec for PATCH requests (RFC 7644 §3.5.2) and error bodies (§3.12).

use scim_filter::ScimPathParser;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::types::{OpKind, PatchError, PatchOperation};

pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";
pub const ERROR_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// The PatchOp message envelope. Operations stay raw until decoded with
/// [`from_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRequest {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations", alias = "operations")]
    pub operations: Vec<Value>,
}

// ── Decoding ──────────────────────────────────────────────────────────────

fn decode_op(v: &Value) -> Result<OpKind, PatchError> {
    v.as_str()
        .ok_or_else(|| PatchError::InvalidSyntax("op must be a string".into()))?
        .parse()
}

fn decode_path(v: Option<&Value>) -> Result<Option<scim_filter::Path>, PatchError> {
    let text = match v {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s,
        Some(_) => return Err(PatchError::InvalidPath("path must be a string".into())),
    };
    ScimPathParser::parse_path(text)
        .map(Some)
        .map_err(|e| PatchError::InvalidPath(format!("{text}: {e}")))
}

/// Decodes a single operation object: `{"op": ..., "path": ..., "value": ...}`.
pub fn from_json(v: &Value) -> Result<PatchOperation, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidSyntax("operation must be an object".into()))?;
    let op = decode_op(
        obj.get("op")
            .ok_or_else(|| PatchError::InvalidSyntax("missing op".into()))?,
    )?;
    let path = decode_path(obj.get("path"))?;
    let value = obj.get("value").cloned().unwrap_or(Value::Null);
    Ok(PatchOperation { op, path, value })
}

/// Decodes a PatchOp request body.
pub fn from_json_request(v: &Value) -> Result<Vec<PatchOperation>, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidSyntax("request must be an object".into()))?;
    let schemas = obj
        .get("schemas")
        .and_then(Value::as_array)
        .ok_or_else(|| PatchError::InvalidSyntax("missing schemas".into()))?;
    if !schemas.iter().any(|s| s.as_str() == Some(PATCH_OP_SCHEMA)) {
        return Err(PatchError::InvalidSyntax(format!(
            "schemas must contain {PATCH_OP_SCHEMA}"
        )));
    }
    let operations = obj
        .get("Operations")
        .or_else(|| obj.get("operations"))
        .ok_or_else(|| PatchError::InvalidSyntax("missing Operations".into()))?
        .as_array()
        .ok_or_else(|| PatchError::InvalidValue("Operations must be a list".into()))?;
    operations.iter().map(from_json).collect()
}

/// Decodes request text: a PatchOp request, a list of operations, or a single
/// operation.
pub fn parse_request(text: &str) -> Result<Vec<PatchOperation>, PatchError> {
    let v: Value =
        serde_json::from_str(text).map_err(|e| PatchError::InvalidSyntax(e.to_string()))?;
    match &v {
        Value::Array(ops) => ops.iter().map(from_json).collect(),
        Value::Object(obj) if obj.contains_key("op") => Ok(vec![from_json(&v)?]),
        _ => from_json_request(&v),
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────

pub fn to_json(op: &PatchOperation) -> Value {
    let mut obj = Map::new();
    obj.insert("op".into(), Value::String(op.op.as_str().into()));
    if let Some(path) = &op.path {
        obj.insert("path".into(), Value::String(path.to_string()));
    }
    if !op.value.is_null() {
        obj.insert("value".into(), op.value.clone());
    }
    Value::Object(obj)
}

pub fn to_json_request(ops: &[PatchOperation]) -> Value {
    json!({
        "schemas": [PATCH_OP_SCHEMA],
        "Operations": ops.iter().map(to_json).collect::<Vec<_>>(),
    })
}

impl From<&[PatchOperation]> for PatchRequest {
    fn from(ops: &[PatchOperation]) -> Self {
        PatchRequest {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations: ops.iter().map(to_json).collect(),
        }
    }
}

impl PatchRequest {
    pub fn decode(&self) -> Result<Vec<PatchOperation>, PatchError> {
        if !self.schemas.iter().any(|s| s == PATCH_OP_SCHEMA) {
            return Err(PatchError::InvalidSyntax(format!(
                "schemas must contain {PATCH_OP_SCHEMA}"
            )));
        }
        self.operations.iter().map(from_json).collect()
    }
}

/// Renders an RFC 7644 §3.12 error response body.
pub fn error_to_json(err: &PatchError) -> Value {
    json!({
        "schemas": [ERROR_SCHEMA],
        "status": err.status().to_string(),
        "scimType": err.scim_type(),
        "detail": err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scim_filter::{Expression, Path};

    #[test]
    fn decode_request() {
        let ops = from_json_request(&json!({
            "schemas": [PATCH_OP_SCHEMA],
            "Operations": [
                {"op": "Add", "path": "emails[type eq \"work\"].value", "value": "a@example.com"},
                {"op": "remove", "path": "title"},
                {"op": "replace", "value": {"displayName": "Babs"}}
            ]
        }))
        .unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].op, OpKind::Add);
        assert_eq!(
            ops[0].path,
            Some(
                Path::new("emails")
                    .with_filter(Expression::equals("type", "work"))
                    .with_sub_attribute("value")
            )
        );
        assert_eq!(ops[1].value, Value::Null);
        assert_eq!(ops[2].path, None);
    }

    #[test]
    fn decode_errors() {
        let no_schema = json!({"schemas": [], "Operations": []});
        assert!(matches!(
            from_json_request(&no_schema),
            Err(PatchError::InvalidSyntax(_))
        ));

        let not_a_list = json!({"schemas": [PATCH_OP_SCHEMA], "Operations": {}});
        assert!(matches!(
            from_json_request(&not_a_list),
            Err(PatchError::InvalidValue(_))
        ));

        assert!(matches!(
            from_json(&json!({"op": "move", "path": "title"})),
            Err(PatchError::InvalidSyntax(_))
        ));
        assert!(matches!(
            from_json(&json!({"op": "add", "path": "emails[type eq]"})),
            Err(PatchError::InvalidPath(_))
        ));
        assert!(matches!(
            from_json(&json!({"path": "title"})),
            Err(PatchError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn empty_path_means_no_path() {
        let op = from_json(&json!({"op": "add", "path": "", "value": {"title": "x"}})).unwrap();
        assert_eq!(op.path, None);
    }

    #[test]
    fn parse_request_accepts_three_shapes() {
        assert_eq!(
            parse_request(r#"{"op": "remove", "path": "title"}"#).unwrap().len(),
            1
        );
        assert_eq!(
            parse_request(r#"[{"op": "remove", "path": "title"}, {"op": "remove", "path": "nickName"}]"#)
                .unwrap()
                .len(),
            2
        );
        let text = format!(r#"{{"schemas": ["{PATCH_OP_SCHEMA}"], "Operations": []}}"#);
        assert!(parse_request(&text).unwrap().is_empty());
        assert!(matches!(parse_request("{"), Err(PatchError::InvalidSyntax(_))));
    }

    #[test]
    fn encode_request() {
        let ops = vec![
            PatchOperation::add(
                Some(Path::new("emails").with_filter(Expression::equals("type", "work"))),
                json!({"value": "a@example.com"}),
            ),
            PatchOperation::remove(Path::new("title")),
        ];
        let encoded = to_json_request(&ops);
        assert_eq!(
            encoded,
            json!({
                "schemas": [PATCH_OP_SCHEMA],
                "Operations": [
                    {"op": "add", "path": "emails[type eq \"work\"]", "value": {"value": "a@example.com"}},
                    {"op": "remove", "path": "title"}
                ]
            })
        );
        assert_eq!(from_json_request(&encoded).unwrap(), ops);
    }

    #[test]
    fn typed_request_envelope() {
        let ops = vec![PatchOperation::remove(Path::new("title"))];
        let request = PatchRequest::from(ops.as_slice());
        let text = serde_json::to_string(&request).unwrap();
        assert!(text.contains("\"Operations\""));
        let back: PatchRequest = serde_json::from_str(&text).unwrap();
        assert_eq!(back.decode().unwrap(), ops);
    }

    #[test]
    fn error_body() {
        assert_eq!(
            error_to_json(&PatchError::NoTarget),
            json!({
                "schemas": [ERROR_SCHEMA],
                "status": "400",
                "scimType": "noTarget",
                "detail": "remove operation requires a path"
            })
        );
    }
}
