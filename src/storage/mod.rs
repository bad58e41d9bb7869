//! Storage abstraction layer for SCIM resources.
//!
//! The `StorageProvider` trait defines protocol-agnostic PUT/GET/DELETE
//! operations on JSON documents, keyed by resource type and id. SCIM concerns
//! (metadata, uniqueness, PATCH semantics) live in the provider layer.
//!
//! At the storage level CREATE and UPDATE are the same operation: a document
//! is put at a key. Whether that is a create or an update is business logic.
//!
//! # Example Usage
//!
//! ```rust
//! use scim_provisioner::storage::{InMemoryStorage, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let key = StorageKey::new("User", "123");
//! storage.put(key.clone(), json!({"id": "123", "userName": "alice"})).await?;
//!
//! assert!(storage.get(key.clone()).await?.is_some());
//! assert!(storage.delete(key).await?);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::InMemoryStorage;

use serde_json::Value;
use std::fmt;
use std::future::Future;

/// A key identifying one stored resource: `resource_type` → `resource_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    resource_type: String,
    resource_id: String,
}

impl StorageKey {
    /// Create a new storage key.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Get the resource type.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Get the resource ID.
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Create a prefix for listing every resource of a type.
    pub fn prefix(resource_type: impl Into<String>) -> StoragePrefix {
        StoragePrefix {
            resource_type: resource_type.into(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.resource_id)
    }
}

/// A prefix for querying resources by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePrefix {
    resource_type: String,
}

impl StoragePrefix {
    /// Get the resource type.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }
}

impl fmt::Display for StoragePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_type)
    }
}

/// Core trait for storage providers that handle pure data persistence.
///
/// Implementations must be safe to share between request handlers and must
/// return list results in a stable order (the in-memory backend uses
/// insertion order so 1-based pagination is reproducible).
pub trait StorageProvider: Send + Sync {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store data at the specified key and return the stored data.
    ///
    /// An existing document at the same key is replaced as a whole and keeps
    /// its position in list order.
    fn put(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Retrieve data by key. `None` if nothing is stored there.
    fn get(
        &self,
        key: StorageKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Delete data by key.
    ///
    /// Returns `true` if the resource was deleted, `false` if it didn't exist,
    /// which lets the caller choose between 204 and 404.
    fn delete(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// List resources matching a prefix, skipping `offset` and returning at
    /// most `limit` entries. An `offset` past the end yields an empty vector.
    fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    /// Find resources whose `attribute` equals `value` exactly. Nested
    /// attributes use dot notation (`name.givenName`, `emails.0.value`).
    fn find_by_attribute(
        &self,
        prefix: StoragePrefix,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;
}
