//! In-memory storage implementation for SCIM resources.
//!
//! A thread-safe implementation of [`StorageProvider`] built on a `HashMap`
//! behind tokio's `RwLock`. Nothing survives a restart; it backs tests,
//! development, and the bundled server binary.
//!
//! # Performance Characteristics
//!
//! * PUT/GET/DELETE: O(1) average case
//! * LIST with pagination: O(n log n), entries are sorted by insertion sequence
//! * FIND_BY_ATTRIBUTE: O(n)
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
//! let key = StorageKey::new("User", "user123");
//! storage.put(key.clone(), json!({"id": "user123", "userName": "john.doe"})).await?;
//!
//! let found = storage
//!     .find_by_attribute(StorageKey::prefix("User"), "userName", "john.doe")
//!     .await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::storage::{StorageError, StorageKey, StoragePrefix, StorageProvider};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resources of one type, each tagged with the sequence number of its first put.
#[derive(Default)]
struct TypeBucket {
    next_sequence: u64,
    entries: HashMap<String, (u64, Value)>,
}

impl TypeBucket {
    fn ordered(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(id, (sequence, data))| (*sequence, id, data))
            .collect();
        entries.sort_by_key(|(sequence, _, _)| *sequence);
        entries.into_iter().map(|(_, id, data)| (id, data)).collect()
    }
}

/// Thread-safe in-memory storage.
///
/// Structure: `resource_type` → `resource_id` → `(sequence, data)`.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, TypeBucket>>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract a nested attribute value from JSON data using dot notation.
    fn extract_attribute_value(data: &Value, attribute_path: &str) -> Option<String> {
        let mut current = data;

        for part in attribute_path.split('.') {
            current = match part.parse::<usize>() {
                Ok(index) => current.get(index)?,
                Err(_) => current.get(part)?,
            };
        }

        match current {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl StorageProvider for InMemoryStorage {
    type Error = StorageError;

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, Self::Error> {
        if !data.is_object() {
            return Err(StorageError::not_an_object(&key, &data));
        }

        let mut data_guard = self.data.write().await;
        let bucket = data_guard
            .entry(key.resource_type().to_string())
            .or_default();

        match bucket.entries.get_mut(key.resource_id()) {
            Some((_, existing)) => *existing = data.clone(),
            None => {
                let sequence = bucket.next_sequence;
                bucket.next_sequence += 1;
                bucket
                    .entries
                    .insert(key.resource_id().to_string(), (sequence, data.clone()));
            }
        }

        Ok(data)
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, Self::Error> {
        let data_guard = self.data.read().await;

        Ok(data_guard
            .get(key.resource_type())
            .and_then(|bucket| bucket.entries.get(key.resource_id()))
            .map(|(_, data)| data.clone()))
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let mut data_guard = self.data.write().await;

        Ok(data_guard
            .get_mut(key.resource_type())
            .map(|bucket| bucket.entries.remove(key.resource_id()).is_some())
            .unwrap_or(false))
    }

    async fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let data_guard = self.data.read().await;
        let Some(bucket) = data_guard.get(prefix.resource_type()) else {
            return Ok(Vec::new());
        };

        Ok(bucket
            .ordered()
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, data)| {
                (
                    StorageKey::new(prefix.resource_type(), id.as_str()),
                    data.clone(),
                )
            })
            .collect())
    }

    async fn find_by_attribute(
        &self,
        prefix: StoragePrefix,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        let data_guard = self.data.read().await;
        let Some(bucket) = data_guard.get(prefix.resource_type()) else {
            return Ok(Vec::new());
        };

        Ok(bucket
            .ordered()
            .into_iter()
            .filter(|(_, data)| {
                Self::extract_attribute_value(data, attribute).as_deref() == Some(value)
            })
            .map(|(id, data)| {
                (
                    StorageKey::new(prefix.resource_type(), id.as_str()),
                    data.clone(),
                )
            })
            .collect())
    }
}
