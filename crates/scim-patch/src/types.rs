//! Core types for the PATCH engine.

use std::fmt;
use std::str::FromStr;

use scim_filter::Path;
use serde_json::{Map, Value};
use thiserror::Error;

/// A SCIM resource: attribute name to value. Extension attributes live under
/// a top-level key equal to the extension schema URI.
pub type Resource = Map<String, Value>;

// ── Errors ────────────────────────────────────────────────────────────────

/// Errors map onto the RFC 7644 §3.12 `scimType` values a PATCH may return.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("remove operation requires a path")]
    NoTarget,
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("attribute {0} cannot be modified by this operation")]
    Mutability(String),
    #[error("invalid syntax: {0}")]
    InvalidSyntax(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl PatchError {
    /// HTTP status of the error response. Every PATCH error is a 400.
    pub fn status(&self) -> u16 {
        400
    }

    pub fn scim_type(&self) -> &'static str {
        match self {
            PatchError::NoTarget => "noTarget",
            PatchError::InvalidPath(_) => "invalidPath",
            PatchError::Mutability(_) => "mutability",
            PatchError::InvalidSyntax(_) => "invalidSyntax",
            PatchError::InvalidValue(_) => "invalidValue",
        }
    }
}

// ── Operations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Replace,
    Remove,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Replace => "replace",
            OpKind::Remove => "remove",
        }
    }
}

impl FromStr for OpKind {
    type Err = PatchError;

    /// Op names are case-insensitive on the wire (`"Replace"` is common).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(OpKind::Add),
            "replace" => Ok(OpKind::Replace),
            "remove" => Ok(OpKind::Remove),
            other => Err(PatchError::InvalidSyntax(format!("unknown op: {other}"))),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single PATCH operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOperation {
    pub op: OpKind,
    pub path: Option<Path>,
    pub value: Value,
}

impl PatchOperation {
    pub fn new(op: OpKind, path: Option<Path>, value: Value) -> Self {
        Self { op, path, value }
    }

    pub fn add(path: Option<Path>, value: Value) -> Self {
        Self::new(OpKind::Add, path, value)
    }

    pub fn replace(path: Option<Path>, value: Value) -> Self {
        Self::new(OpKind::Replace, path, value)
    }

    pub fn remove(path: Path) -> Self {
        Self::new(OpKind::Remove, Some(path), Value::Null)
    }
}

/// Outcome of applying a batch of operations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchResult {
    /// True if any operation changed the resource.
    pub changed: bool,
    /// Per-operation changed flags, in request order.
    pub results: Vec<bool>,
}
