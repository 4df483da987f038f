//! Scope navigation: from a resolved path to the container an operator acts on.
//!
//! The navigator takes the scoped container out of the resource, lets the
//! operator mutate it, and writes it back. Containers that end up empty are
//! deleted on the way back, up to and including the extension map.

use std::mem;

use scim_schema::Attribute;
use serde_json::Value;

use crate::types::Resource;

/// Key under which elements of multi-valued simple attributes are exposed to
/// filters: `testString[value eq "x"]`.
pub const SIMPLE_VALUE_KEY: &str = "value";

pub struct ScopeNavigator<'a> {
    attr: &'a Attribute,
    uri: Option<&'a str>,
    sub_attribute: Option<&'a str>,
}

impl<'a> ScopeNavigator<'a> {
    /// `uri` is the extension schema the attribute lives under, `sub_attribute`
    /// the canonical name of a targeted sub-attribute of a singular complex
    /// attribute.
    pub fn new(attr: &'a Attribute, uri: Option<&'a str>, sub_attribute: Option<&'a str>) -> Self {
        Self {
            attr,
            uri,
            sub_attribute,
        }
    }

    /// Takes the map holding the target key out of `resource`, together with
    /// that key. Must be paired with [`apply_scoped_map`](Self::apply_scoped_map).
    pub fn scoped_map(&self, resource: &mut Resource) -> (Resource, String) {
        let name = self.attr.name();
        match (self.uri, self.sub_attribute) {
            (None, None) => (mem::take(resource), name.to_string()),
            (Some(uri), None) => (take_object(resource, uri), name.to_string()),
            (None, Some(sub)) => (take_object(resource, name), sub.to_string()),
            (Some(uri), Some(sub)) => {
                let scoped = match resource.get_mut(uri) {
                    Some(Value::Object(ext)) => take_object(ext, name),
                    _ => Resource::new(),
                };
                (scoped, sub.to_string())
            }
        }
    }

    pub fn apply_scoped_map(&self, resource: &mut Resource, scoped: Resource) {
        let name = self.attr.name();
        match (self.uri, self.sub_attribute) {
            (None, None) => *resource = scoped,
            (Some(uri), None) => put_object(resource, uri, scoped),
            (None, Some(_)) => put_object(resource, name, scoped),
            (Some(uri), Some(_)) => {
                let mut ext = take_object(resource, uri);
                put_object(&mut ext, name, scoped);
                put_object(resource, uri, ext);
            }
        }
    }

    /// Puts back a scoped map the operator left untouched, without pruning
    /// containers that were already empty.
    pub fn restore_scoped_map(&self, resource: &mut Resource, scoped: Resource) {
        let name = self.attr.name();
        match (self.uri, self.sub_attribute) {
            (None, None) => *resource = scoped,
            (Some(uri), None) => restore_object(resource, uri, scoped),
            (None, Some(_)) => restore_object(resource, name, scoped),
            (Some(uri), Some(_)) => {
                if let Some(Value::Object(ext)) = resource.get_mut(uri) {
                    restore_object(ext, name, scoped);
                }
            }
        }
    }

    /// Reads the attribute's list as maps. Non-map elements of complex lists
    /// are dropped; every element of a simple list is wrapped as
    /// `{"value": x}`.
    pub fn scoped_maps(&self, resource: &Resource) -> Vec<Resource> {
        let scope = match self.uri {
            None => Some(resource),
            Some(uri) => resource.get(uri).and_then(Value::as_object),
        };
        let Some(Value::Array(items)) = scope.and_then(|s| s.get(self.attr.name())) else {
            return Vec::new();
        };
        if self.attr.has_sub_attributes() {
            items.iter().filter_map(|v| v.as_object().cloned()).collect()
        } else {
            items.iter().map(wrap_simple).collect()
        }
    }

    /// Writes the list back, dropping empty elements and unwrapping simple
    /// values. An empty list deletes the attribute.
    pub fn apply_scoped_maps(&self, resource: &mut Resource, updated: Vec<Resource>) {
        let name = self.attr.name();
        let values: Vec<Value> = if self.attr.has_sub_attributes() {
            updated
                .into_iter()
                .filter(|m| !m.is_empty())
                .map(Value::Object)
                .collect()
        } else {
            updated.into_iter().filter_map(unwrap_simple).collect()
        };

        match self.uri {
            None => put_list(resource, name, values),
            Some(uri) => {
                let mut ext = take_object(resource, uri);
                put_list(&mut ext, name, values);
                put_object(resource, uri, ext);
            }
        }
    }
}

fn wrap_simple(value: &Value) -> Resource {
    let mut m = Resource::new();
    m.insert(SIMPLE_VALUE_KEY.to_string(), value.clone());
    m
}

fn unwrap_simple(mut element: Resource) -> Option<Value> {
    element
        .shift_remove(SIMPLE_VALUE_KEY)
        .filter(|v| !v.is_null())
}

/// Moves the map stored at `key` out, leaving an empty map in its slot so the
/// key keeps its position. Anything other than a map reads as empty.
pub(crate) fn take_object(map: &mut Resource, key: &str) -> Resource {
    match map.get_mut(key) {
        Some(Value::Object(m)) => mem::take(m),
        _ => Resource::new(),
    }
}

/// Moves `scoped` back into the slot [`take_object`] emptied. Nothing is
/// written when the slot does not hold a map.
pub(crate) fn restore_object(map: &mut Resource, key: &str, scoped: Resource) {
    if let Some(Value::Object(m)) = map.get_mut(key) {
        *m = scoped;
    }
}

/// Stores `scoped` at `key`, or deletes the key when `scoped` is empty. A
/// non-map value at `key` survives an empty write.
pub(crate) fn put_object(map: &mut Resource, key: &str, scoped: Resource) {
    if scoped.is_empty() {
        if matches!(map.get(key), Some(Value::Object(_)) | Some(Value::Null)) {
            map.shift_remove(key);
        }
        return;
    }
    match map.get_mut(key) {
        Some(slot) => *slot = Value::Object(scoped),
        None => {
            map.insert(key.to_string(), Value::Object(scoped));
        }
    }
}

fn put_list(map: &mut Resource, key: &str, values: Vec<Value>) {
    if values.is_empty() {
        if matches!(map.get(key), Some(Value::Array(_)) | Some(Value::Null)) {
            map.shift_remove(key);
        }
        return;
    }
    match map.get_mut(key) {
        Some(slot) => *slot = Value::Array(values),
        None => {
            map.insert(key.to_string(), Value::Array(values));
        }
    }
}
