//! In-memory store backend.
//!
//! An ordered id-to-instance mapping behind an async `RwLock`, intended
//! for testing, development, and setups where persistence is not
//! required. Individual operations are atomic; sequences of calls are
//! not, so concurrent mutations to the same id can interleave.

use crate::storage::{StorageError, StoreBackend};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory store.
///
/// Cloning shares the underlying map, so a handle kept outside the
/// resource (e.g. for seeding tests) observes the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all instances (useful for testing).
    pub async fn clear(&self) {
        self.data.write().await.clear();
    }
}

impl StoreBackend for InMemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.data.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Value>, StorageError> {
        Ok(self.data.read().await.values().cloned().collect())
    }

    async fn insert(&self, id: &str, instance: Value) -> Result<Value, StorageError> {
        let mut data = self.data.write().await;
        if data.contains_key(id) {
            return Err(StorageError::already_exists(id));
        }
        data.insert(id.to_string(), instance.clone());
        Ok(instance)
    }

    async fn replace(&self, id: &str, instance: Value) -> Result<Value, StorageError> {
        let mut data = self.data.write().await;
        match data.get_mut(id) {
            Some(slot) => {
                *slot = instance.clone();
                Ok(instance)
            }
            None => Err(StorageError::not_found(id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.data.write().await.remove(id).is_some())
    }

    async fn contains(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.data.read().await.contains_key(id))
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.data.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryStore::new();
        let data = json!({"id": "123", "name": "test"});

        let stored = store.insert("123", data.clone()).await.unwrap();
        assert_eq!(stored, data);
        assert_eq!(store.get("123").await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_rejected() {
        let store = InMemoryStore::new();
        store.insert("123", json!({"id": "123"})).await.unwrap();

        let result = store.insert("123", json!({"id": "123"})).await;
        assert!(matches!(result, Err(StorageError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_replace_requires_existing() {
        let store = InMemoryStore::new();
        let result = store.replace("999", json!({})).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));

        store.insert("999", json!({"v": 1})).await.unwrap();
        store.replace("999", json!({"v": 2})).await.unwrap();
        assert_eq!(store.get("999").await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = InMemoryStore::new();
        store.insert("123", json!({})).await.unwrap();

        assert!(store.delete("123").await.unwrap());
        assert!(!store.delete("123").await.unwrap());
        assert_eq!(store.get("123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_is_id_ordered() {
        let store = InMemoryStore::new();
        store.insert("b", json!({"id": "b"})).await.unwrap();
        store.insert("a", json!({"id": "a"})).await.unwrap();
        store.insert("c", json!({"id": "c"})).await.unwrap();

        let listing = store.list().await.unwrap();
        let ids: Vec<&str> = listing.iter().map(|v| v["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = InMemoryStore::new();
        let handle = store.clone();
        store.insert("1", json!({})).await.unwrap();

        assert!(handle.contains("1").await.unwrap());
        handle.clear().await;
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
