//! The PATCH dispatcher.

use std::borrow::Cow;

use scim_filter::Path;
use scim_schema::{external_id, Attribute, Mutability, Schema};
use serde_json::Value;

use crate::dot::resolve_dot_notation;
use crate::logger::{NoopLogger, PatchLogger};
use crate::operator::{Adder, Operator, Remover, Replacer};
use crate::scope::{put_object, restore_object, take_object, ScopeNavigator, SIMPLE_VALUE_KEY};
use crate::types::{OpKind, PatchError, PatchOperation, PatchResult, Resource};
use crate::util::{eq_map, is_multi_valued_complex, values_equal};

/// Overrides for the strategies and logger a [`Patcher`] uses. Unset fields
/// fall back to [`Adder`], [`Replacer`], [`Remover`] and [`NoopLogger`].
#[derive(Default)]
pub struct PatcherOptions {
    pub adder: Option<Box<dyn Operator>>,
    pub replacer: Option<Box<dyn Operator>>,
    pub remover: Option<Box<dyn Operator>>,
    pub logger: Option<Box<dyn PatchLogger>>,
}

impl PatcherOptions {
    pub fn with_adder(mut self, adder: impl Operator + 'static) -> Self {
        self.adder = Some(Box::new(adder));
        self
    }

    pub fn with_replacer(mut self, replacer: impl Operator + 'static) -> Self {
        self.replacer = Some(Box::new(replacer));
        self
    }

    pub fn with_remover(mut self, remover: impl Operator + 'static) -> Self {
        self.remover = Some(Box::new(remover));
        self
    }

    pub fn with_logger(mut self, logger: impl PatchLogger + 'static) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }
}

/// Applies PATCH operations to resources of one resource type.
///
/// A patcher is built once per resource type from its core schema and
/// extension schemas, and is immutable afterwards.
pub struct Patcher {
    schema: Schema,
    extensions: Vec<Schema>,
    external_id: Attribute,
    adder: Box<dyn Operator>,
    replacer: Box<dyn Operator>,
    remover: Box<dyn Operator>,
    logger: Box<dyn PatchLogger>,
}

/// A path resolved against the registered schemas.
struct Target<'p> {
    attr: &'p Attribute,
    /// Extension URI the attribute is nested under.
    uri: Option<&'p str>,
    /// Canonical sub-attribute name.
    sub: Option<&'p str>,
    sub_attr: Option<&'p Attribute>,
}

impl Patcher {
    pub fn new(schema: Schema, extensions: Vec<Schema>, options: PatcherOptions) -> Self {
        Self {
            schema,
            extensions,
            external_id: external_id(),
            adder: options.adder.unwrap_or_else(|| Box::new(Adder)),
            replacer: options.replacer.unwrap_or_else(|| Box::new(Replacer)),
            remover: options.remover.unwrap_or_else(|| Box::new(Remover)),
            logger: options.logger.unwrap_or_else(|| Box::new(NoopLogger)),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn extensions(&self) -> &[Schema] {
        &self.extensions
    }

    /// Applies one operation. Returns whether the resource changed.
    ///
    /// A rejected operation leaves `resource` untouched.
    pub fn apply(&self, op: &PatchOperation, resource: &mut Resource) -> Result<bool, PatchError> {
        let operator = self.operator(op.op);
        let result = match &op.path {
            // RFC 7644 §3.5.2.2: remove without a path is a noTarget error
            None if op.op == OpKind::Remove => Err(PatchError::NoTarget),
            None => Ok(self.apply_without_path(operator, &op.value, resource)),
            Some(path) => self.apply_with_path(op.op, operator, path, &op.value, resource),
        };
        if let Err(err) = &result {
            self.logger.debug(&format!("{} rejected: {err}", op.op));
        }
        result
    }

    /// Applies operations in order, stopping at the first error. Operations
    /// applied before the failure are kept.
    pub fn apply_ops(
        &self,
        ops: &[PatchOperation],
        resource: &mut Resource,
    ) -> Result<PatchResult, PatchError> {
        let mut result = PatchResult {
            changed: false,
            results: Vec::with_capacity(ops.len()),
        };
        for (index, op) in ops.iter().enumerate() {
            match self.apply(op, resource) {
                Ok(changed) => {
                    result.changed |= changed;
                    result.results.push(changed);
                }
                Err(err) => {
                    self.logger
                        .error(&format!("operation {index} ({}) failed: {err}", op.op));
                    return Err(err);
                }
            }
        }
        Ok(result)
    }

    fn operator(&self, kind: OpKind) -> &dyn Operator {
        match kind {
            OpKind::Add => self.adder.as_ref(),
            OpKind::Replace => self.replacer.as_ref(),
            OpKind::Remove => self.remover.as_ref(),
        }
    }

    fn extension(&self, uri: &str) -> Option<&Schema> {
        self.extensions
            .iter()
            .find(|ext| ext.id().eq_ignore_ascii_case(uri))
    }

    fn core_attribute(&self, name: &str) -> Option<&Attribute> {
        self.schema.contains_attribute(name).or_else(|| {
            name.eq_ignore_ascii_case(self.external_id.name())
                .then_some(&self.external_id)
        })
    }

    // ── Path specified ───────────────────────────────────────────────────

    fn resolve<'p>(&'p self, path: &Path) -> Result<Target<'p>, PatchError> {
        let invalid = || PatchError::InvalidPath(path.to_string());
        let name = path.attribute_name.as_str();

        let (attr, uri) = match path.uri_prefix.as_deref() {
            Some(prefix) if prefix.eq_ignore_ascii_case(self.schema.id()) => {
                (self.core_attribute(name).ok_or_else(invalid)?, None)
            }
            Some(prefix) => {
                let ext = self.extension(prefix).ok_or_else(invalid)?;
                (ext.contains_attribute(name).ok_or_else(invalid)?, Some(ext.id()))
            }
            None => match self.schema.contains_attribute(name) {
                Some(attr) => (attr, None),
                None => self
                    .extensions
                    .iter()
                    .find_map(|ext| ext.contains_attribute(name).map(|a| (a, Some(ext.id()))))
                    .or_else(|| self.core_attribute(name).map(|a| (a, None)))
                    .ok_or_else(invalid)?,
            },
        };

        let (sub, sub_attr) = match path.sub_attribute.as_deref() {
            None => (None, None),
            // `emails.value` without a filter does not address a single element
            Some(_) if attr.multi_valued() && path.value_expression.is_none() => {
                return Err(invalid());
            }
            Some(sub) if attr.has_sub_attributes() => {
                let sub_attr = attr.sub_attribute(sub).ok_or_else(invalid)?;
                (Some(sub_attr.name()), Some(sub_attr))
            }
            Some(sub) if attr.multi_valued() && sub.eq_ignore_ascii_case(SIMPLE_VALUE_KEY) => {
                (Some(SIMPLE_VALUE_KEY), None)
            }
            Some(_) => return Err(invalid()),
        };

        Ok(Target {
            attr,
            uri,
            sub,
            sub_attr,
        })
    }

    fn apply_with_path(
        &self,
        kind: OpKind,
        operator: &dyn Operator,
        path: &Path,
        value: &Value,
        resource: &mut Resource,
    ) -> Result<bool, PatchError> {
        let target = self.resolve(path)?;
        check_mutability(kind, target.attr, path)?;
        if let Some(sub_attr) = target.sub_attr {
            check_mutability(kind, sub_attr, path)?;
        }

        let log = self.logger.as_ref();
        let slot = target.uri.unwrap_or(target.attr.name());
        let before = resource.get(slot).cloned();

        match (&path.value_expression, target.attr.multi_valued()) {
            // `attr[expr]` and `attr[expr].sub`
            (Some(expr), true) => {
                let nav = ScopeNavigator::new(target.attr, target.uri, None);
                let elements = nav.scoped_maps(resource);
                let (elements, written) = match target.sub {
                    Some(sub) => {
                        operator.by_value_expression_for_attribute(log, elements, expr, sub, value)
                    }
                    None => {
                        let value = element_value(target.attr, value);
                        operator.by_value_expression_for_item(log, elements, expr, &value)
                    }
                };
                if written {
                    nav.apply_scoped_maps(resource, elements);
                }
            }
            // `attr` and `attr.sub`
            _ => {
                let nav = ScopeNavigator::new(target.attr, target.uri, target.sub);
                let value = if target.sub.is_none() && target.attr.multi_valued() {
                    as_list(value)
                } else {
                    Cow::Borrowed(value)
                };
                let (mut scoped, key) = nav.scoped_map(resource);
                if operator.direct(log, &mut scoped, &key, &value) {
                    nav.apply_scoped_map(resource, scoped);
                } else {
                    nav.restore_scoped_map(resource, scoped);
                }
            }
        }

        let changed = match (before.as_ref(), resource.get(slot)) {
            (None, None) => false,
            (Some(a), Some(b)) => !values_equal(a, b),
            _ => true,
        };
        Ok(changed)
    }

    // ── Path not specified ───────────────────────────────────────────────

    /// The value is a map of attributes to apply at the resource root.
    /// Extension URI keys hold maps of extension attributes.
    fn apply_without_path(
        &self,
        operator: &dyn Operator,
        value: &Value,
        resource: &mut Resource,
    ) -> bool {
        let Some(fields) = value.as_object() else {
            self.logger
                .debug("operation without path has a non-object value, ignoring");
            return false;
        };

        let before = resource.clone();
        for (key, value) in fields {
            let scope = if key.eq_ignore_ascii_case(self.schema.id()) {
                Some(None)
            } else {
                self.extension(key).map(|ext| Some(ext.id()))
            };

            match scope {
                Some(uri) => match value.as_object() {
                    Some(attrs) => {
                        for (name, value) in attrs {
                            self.direct_in_scope(operator, resource, uri, name, value);
                        }
                    }
                    None => self
                        .logger
                        .debug(&format!("value under schema {key} is not an object, ignoring")),
                },
                None => {
                    let (uri, name) = self.strip_schema_prefix(key).unwrap_or((None, key.as_str()));
                    self.direct_in_scope(operator, resource, uri, name, value);
                }
            }
        }
        !eq_map(&before, resource)
    }

    /// Splits `<schema id>:<attribute>` keys into the extension URI (`None`
    /// for the core schema) and the attribute part.
    fn strip_schema_prefix<'s, 'k>(&'s self, key: &'k str) -> Option<(Option<&'s str>, &'k str)> {
        let strip = |id: &str| -> Option<&'k str> {
            key.get(..id.len())
                .filter(|head| head.eq_ignore_ascii_case(id))
                .and_then(|_| key[id.len()..].strip_prefix(':'))
                .filter(|rest| !rest.is_empty())
        };
        if let Some(rest) = strip(self.schema.id()) {
            return Some((None, rest));
        }
        self.extensions
            .iter()
            .find_map(|ext| strip(ext.id()).map(|rest| (Some(ext.id()), rest)))
    }

    fn direct_in_scope(
        &self,
        operator: &dyn Operator,
        resource: &mut Resource,
        uri: Option<&str>,
        key: &str,
        value: &Value,
    ) -> bool {
        match uri {
            None => self.direct_dotted(operator, resource, key, value),
            Some(uri) => {
                let mut ext = take_object(resource, uri);
                let changed = self.direct_dotted(operator, &mut ext, key, value);
                if changed {
                    put_object(resource, uri, ext);
                } else {
                    restore_object(resource, uri, ext);
                }
                changed
            }
        }
    }

    fn direct_dotted(
        &self,
        operator: &dyn Operator,
        container: &mut Resource,
        key: &str,
        value: &Value,
    ) -> bool {
        let log = self.logger.as_ref();
        resolve_dot_notation(container, key, |scope, leaf| {
            operator.direct(log, scope, leaf, value)
        })
    }
}

fn check_mutability(kind: OpKind, attr: &Attribute, path: &Path) -> Result<(), PatchError> {
    let rejected = match attr.mutability() {
        Mutability::ReadOnly => true,
        Mutability::Immutable => matches!(kind, OpKind::Replace | OpKind::Remove),
        Mutability::ReadWrite | Mutability::WriteOnly => false,
    };
    if rejected {
        Err(PatchError::Mutability(path.to_string()))
    } else {
        Ok(())
    }
}

/// Elements of simple multi-valued attributes are `{"value": x}` while
/// filtered, so a bare value is wrapped the same way.
fn element_value<'v>(attr: &Attribute, value: &'v Value) -> Cow<'v, Value> {
    if is_multi_valued_complex(attr) || value.is_object() || value.is_null() {
        return Cow::Borrowed(value);
    }
    let mut element = Resource::new();
    element.insert(SIMPLE_VALUE_KEY.to_string(), value.clone());
    Cow::Owned(Value::Object(element))
}

/// A single value aimed at a multi-valued attribute becomes a one-element list.
fn as_list(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::Array(_) | Value::Null => Cow::Borrowed(value),
        other => Cow::Owned(Value::Array(vec![other.clone()])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::RecordingLogger;
    use scim_filter::{Expression, ScimPathParser};
    use scim_schema::{core_user_schema, enterprise_user_extension, ENTERPRISE_USER_SCHEMA};
    use serde_json::json;
    use std::sync::Arc;

    fn patcher() -> Patcher {
        Patcher::new(
            core_user_schema(),
            vec![enterprise_user_extension()],
            PatcherOptions::default(),
        )
    }

    fn path(s: &str) -> Option<Path> {
        Some(ScimPathParser::parse_path(s).unwrap())
    }

    fn resource(v: Value) -> Resource {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn patcher_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Patcher>();
    }

    #[test]
    fn resolve_prefers_core_then_extensions() {
        let p = patcher();
        let target = p.resolve(&Path::new("displayname")).unwrap();
        assert_eq!(target.attr.name(), "displayName");
        assert_eq!(target.uri, None);

        let target = p.resolve(&Path::new("department")).unwrap();
        assert_eq!(target.uri, Some(ENTERPRISE_USER_SCHEMA));

        let target = p.resolve(&Path::new("externalId")).unwrap();
        assert_eq!(target.attr.name(), "externalId");
    }

    #[test]
    fn resolve_rejects_unknown_paths() {
        let p = patcher();
        for s in [
            "nope",
            "urn:example:unknown:department",
            "name.nope",
            "displayName.value",
            "emails.value",
        ] {
            let err = p.resolve(&ScimPathParser::parse_path(s).unwrap()).err();
            assert!(matches!(err, Some(PatchError::InvalidPath(_))), "{s}");
        }
    }

    #[test]
    fn resolve_canonicalizes_sub_attribute() {
        let p = patcher();
        let target = p
            .resolve(&ScimPathParser::parse_path("NAME.givenname").unwrap())
            .unwrap();
        assert_eq!(target.attr.name(), "name");
        assert_eq!(target.sub, Some("givenName"));
    }

    #[test]
    fn mutability_rules() {
        let p = patcher();
        let mut res = resource(json!({"userName": "bjensen"}));

        let op = PatchOperation::add(path("groups"), json!([{"value": "g1"}]));
        assert!(matches!(p.apply(&op, &mut res), Err(PatchError::Mutability(_))));

        let op = PatchOperation::replace(
            path("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName"),
            json!("Boss"),
        );
        assert!(matches!(p.apply(&op, &mut res), Err(PatchError::Mutability(_))));
        assert_eq!(Value::Object(res), json!({"userName": "bjensen"}));
    }

    #[test]
    fn single_value_for_multi_valued_attribute_is_wrapped() {
        let p = patcher();
        let mut res = Resource::new();
        let op = PatchOperation::add(path("emails"), json!({"value": "a@example.com"}));
        assert_eq!(p.apply(&op, &mut res), Ok(true));
        assert_eq!(
            Value::Object(res),
            json!({"emails": [{"value": "a@example.com"}]})
        );
    }

    #[test]
    fn filter_on_singular_attribute_falls_back_to_direct() {
        let p = patcher();
        let mut res = resource(json!({"name": {"givenName": "Barbara"}}));
        let op = PatchOperation::replace(
            Some(
                Path::new("name")
                    .with_filter(Expression::equals("givenName", "Barbara"))
                    .with_sub_attribute("familyName"),
            ),
            json!("Jensen"),
        );
        assert_eq!(p.apply(&op, &mut res), Ok(true));
        assert_eq!(
            Value::Object(res),
            json!({"name": {"givenName": "Barbara", "familyName": "Jensen"}})
        );
    }

    #[test]
    fn schema_prefixed_keys_without_path() {
        let p = patcher();
        let mut res = resource(json!({"userName": "bjensen"}));
        let op = PatchOperation::add(
            None,
            json!({
                "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department": "Tour Operations",
                "urn:ietf:params:scim:schemas:core:2.0:User:displayName": "Babs",
                "urn:ietf:params:scim:schemas:core:2.0:User": {"nickName": "B"}
            }),
        );
        assert_eq!(p.apply(&op, &mut res), Ok(true));
        assert_eq!(
            Value::Object(res),
            json!({
                "userName": "bjensen",
                "displayName": "Babs",
                "nickName": "B",
                ENTERPRISE_USER_SCHEMA: {"department": "Tour Operations"}
            })
        );
    }

    #[test]
    fn rejected_operations_are_logged() {
        let log = Arc::new(RecordingLogger::default());
        let p = Patcher::new(
            core_user_schema(),
            vec![],
            PatcherOptions::default().with_logger(SharedLogger(log.clone())),
        );
        let mut res = Resource::new();
        let ops = vec![PatchOperation::new(OpKind::Remove, None, Value::Null)];
        assert_eq!(p.apply_ops(&ops, &mut res), Err(PatchError::NoTarget));
        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("debug: remove rejected"));
        assert!(lines[1].starts_with("error: operation 0 (remove) failed"));
    }

    struct SharedLogger(Arc<RecordingLogger>);

    impl PatchLogger for SharedLogger {
        fn error(&self, message: &str) {
            self.0.error(message)
        }

        fn debug(&self, message: &str) {
            self.0.debug(message)
        }
    }

    #[test]
    fn custom_operator_is_used() {
        struct Frozen;

        impl Operator for Frozen {
            fn direct(&self, _: &dyn PatchLogger, _: &mut Resource, _: &str, _: &Value) -> bool {
                false
            }

            fn by_value_expression_for_item(
                &self,
                _: &dyn PatchLogger,
                scoped: Vec<Resource>,
                _: &Expression,
                _: &Value,
            ) -> (Vec<Resource>, bool) {
                (scoped, false)
            }

            fn by_value_expression_for_attribute(
                &self,
                _: &dyn PatchLogger,
                scoped: Vec<Resource>,
                _: &Expression,
                _: &str,
                _: &Value,
            ) -> (Vec<Resource>, bool) {
                (scoped, false)
            }
        }

        let p = Patcher::new(
            core_user_schema(),
            vec![],
            PatcherOptions::default().with_adder(Frozen),
        );
        let mut res = Resource::new();
        let op = PatchOperation::add(path("displayName"), json!("Babs"));
        assert_eq!(p.apply(&op, &mut res), Ok(false));
        assert!(res.is_empty());
    }
}
