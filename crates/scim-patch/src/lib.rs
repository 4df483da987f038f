//! SCIM PATCH (RFC 7644 §3.5.2) for JSON resources.
//!
//! A [`Patcher`] is built from a resource type's core schema and its
//! extension schemas. It applies `add`, `replace` and `remove` operations to
//! a resource held as a JSON object, resolving attribute paths and filters
//! against the schemas and enforcing attribute mutability.
//!
//! # Example
//!
//! ```
//! use scim_patch::{codec, Patcher, PatcherOptions};
//! use scim_schema::{core_user_schema, enterprise_user_extension};
//! use serde_json::json;
//!
//! let patcher = Patcher::new(
//!     core_user_schema(),
//!     vec![enterprise_user_extension()],
//!     PatcherOptions::default(),
//! );
//! let ops = codec::from_json_request(&json!({
//!     "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
//!     "Operations": [
//!         {"op": "add", "path": "emails", "value": [{"type": "home", "value": "babs@example.com"}]},
//!         {"op": "replace", "path": "emails[type eq \"work\"].primary", "value": true},
//!         {"op": "remove", "path": "nickName"}
//!     ]
//! }))
//! .unwrap();
//!
//! let mut user = json!({
//!     "userName": "bjensen",
//!     "nickName": "Babs",
//!     "emails": [{"type": "work", "value": "bjensen@example.com"}]
//! })
//! .as_object()
//! .cloned()
//! .unwrap();
//!
//! let result = patcher.apply_ops(&ops, &mut user).unwrap();
//! assert_eq!(result.results, vec![true, true, true]);
//! assert_eq!(
//!     serde_json::Value::Object(user),
//!     json!({
//!         "userName": "bjensen",
//!         "emails": [
//!             {"type": "work", "value": "bjensen@example.com", "primary": true},
//!             {"type": "home", "value": "babs@example.com"}
//!         ]
//!     })
//! );
//! ```

pub mod cli;
pub mod codec;
pub mod dot;
pub mod logger;
pub mod matcher;
pub mod operator;
pub mod patcher;
pub mod scope;
pub mod types;
pub mod util;

pub use logger::{NoopLogger, PatchLogger, TracingLogger};
pub use operator::{Adder, Operator, Remover, Replacer};
pub use patcher::{Patcher, PatcherOptions};
pub use types::{OpKind, PatchError, PatchOperation, PatchResult, Resource};
