//! SCIM PATCH support (RFC 7644 §3.5.2).
//!
//! A PATCH body carries an ordered list of operations. Each one is resolved
//! against the typed resource by the [`PatchEngine`]:
//!
//! * [`path`] turns the `path` string into a [`PathTarget`]
//! * [`matcher`] selects the item of a multi-valued attribute a filter names
//! * [`engine`] applies add, remove and replace per target shape
//!
//! Operations the engine does not understand are skipped rather than failing
//! the request, unless the server runs with [`PathPolicy::Reject`].
//!
//! [`PathPolicy::Reject`]: crate::config::PathPolicy::Reject

pub mod engine;
pub mod matcher;
pub mod path;

pub use engine::{PatchEngine, PatchOutcome};
pub use path::{FilterKey, PathTarget, ValueFilter, parse_path};

use crate::schema::PATCH_OP_SCHEMA;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a PATCH request.
///
/// `Operations` stays optional here so that a missing list can be reported
/// as a 400 instead of a body syntax error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRequest {
    #[serde(default = "default_patch_schemas")]
    pub schemas: Vec<String>,
    #[serde(rename = "Operations", alias = "operations")]
    pub operations: Option<Vec<PatchOperation>>,
}

fn default_patch_schemas() -> Vec<String> {
    vec![PATCH_OP_SCHEMA.to_string()]
}

impl PatchRequest {
    /// Create a request carrying `operations`.
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: default_patch_schemas(),
            operations: Some(operations),
        }
    }
}

/// One `{op, path, value}` instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    #[serde(default)]
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::with_path("add", path, Some(value))
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::with_path("replace", path, Some(value))
    }

    pub fn remove(path: impl Into<String>, value: Option<Value>) -> Self {
        Self::with_path("remove", path, value)
    }

    /// An operation without a path, merging `value` onto the resource.
    pub fn merge(op: impl Into<String>, value: Value) -> Self {
        Self {
            op: op.into(),
            path: None,
            value: Some(value),
        }
    }

    fn with_path(op: &str, path: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            op: op.to_string(),
            path: Some(path.into()),
            value,
        }
    }

    /// The operation kind, or `None` when `op` is not add, remove or replace.
    pub fn kind(&self) -> Option<PatchOpKind> {
        PatchOpKind::parse(&self.op)
    }
}

/// Supported operation kinds. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOpKind {
    Add,
    Remove,
    Replace,
}

impl PatchOpKind {
    pub fn parse(op: &str) -> Option<Self> {
        if op.eq_ignore_ascii_case("add") {
            Some(Self::Add)
        } else if op.eq_ignore_ascii_case("remove") {
            Some(Self::Remove)
        } else if op.eq_ignore_ascii_case("replace") {
            Some(Self::Replace)
        } else {
            None
        }
    }
}
