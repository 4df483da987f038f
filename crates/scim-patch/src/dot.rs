//! Dot-notation keys in path-less operations.
//!
//! Some provisioning clients (Microsoft Entra ID among them) send
//! `{"name.givenName": "Barbara"}` instead of a nested object when no path
//! is given. Only one level of nesting is resolved.

use crate::scope::{put_object, restore_object, take_object};
use crate::types::Resource;

/// Splits `name.givenName` into `("name", "givenName")`. URN-shaped keys are
/// never split, since schema URIs contain dots (`...:2.0:User`).
pub fn split_dot_notation(key: &str) -> Option<(&str, &str)> {
    let (prefix, leaf) = key.split_once('.')?;
    if prefix.is_empty() || leaf.is_empty() || prefix.contains(':') {
        return None;
    }
    Some((prefix, leaf))
}

/// Runs `write` against the map and leaf key a dotted key addresses and
/// returns what `write` returned.
///
/// The parent map is read from `container` (empty when missing or not a
/// map). It is stored back only when `write` reports a change: a non-map
/// parent is then replaced, and a parent left empty is deleted. Otherwise
/// `container` keeps its previous shape.
pub fn resolve_dot_notation<F>(container: &mut Resource, key: &str, write: F) -> bool
where
    F: FnOnce(&mut Resource, &str) -> bool,
{
    let Some((prefix, leaf)) = split_dot_notation(key) else {
        return write(container, key);
    };
    let mut scope = take_object(container, prefix);
    let changed = write(&mut scope, leaf);
    if changed {
        put_object(container, prefix, scope);
    } else {
        restore_object(container, prefix, scope);
    }
    changed
}
