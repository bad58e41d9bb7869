//! Errors raised by storage backends.
//!
//! These carry no SCIM semantics. The provider maps every one of them to a
//! 500 response.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Only JSON objects can be stored.
    #[error("Cannot store {key}: expected a JSON object, got {found}")]
    NotAnObject { key: String, found: &'static str },
}

impl StorageError {
    pub fn not_an_object(key: impl ToString, data: &serde_json::Value) -> Self {
        let found = match data {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        };
        Self::NotAnObject {
            key: key.to_string(),
            found,
        }
    }
}
