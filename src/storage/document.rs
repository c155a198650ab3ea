//! Document-collection store backend.
//!
//! The external document store (Mongo-like) is an external collaborator:
//! [`DocumentStore`] captures the `find`/`insert`/`update`/`delete`/
//! `count` primitives it must provide, keyed by field filters, and
//! [`DocumentBackend`] adapts any such collection to [`StoreBackend`].
//! Per-operation atomicity is whatever the store guarantees; no
//! cross-call transactions are attempted.

use crate::storage::{StorageError, StoreBackend};
use serde_json::{Map, Value};
use std::future::Future;

/// Name under which document stores keep their internal storage id.
/// Stripped from every fetched document before it leaves the backend.
const STORAGE_ID: &str = "_id";

/// Primitives an external document collection must provide.
///
/// Filters are JSON objects of field-name/value pairs; an empty object
/// matches every document.
pub trait DocumentStore: Send + Sync {
    /// The error type returned by collection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// All documents matching the filter.
    fn find(&self, filter: &Value) -> impl Future<Output = Result<Vec<Value>, Self::Error>> + Send;

    /// Insert one document.
    fn insert(&self, document: Value) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Replace the first document matching the filter; returns whether
    /// one matched.
    fn update(
        &self,
        filter: &Value,
        document: Value,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Delete the first document matching the filter; returns whether
    /// one matched.
    fn delete(&self, filter: &Value) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Number of documents matching the filter.
    fn count(&self, filter: &Value) -> impl Future<Output = Result<usize, Self::Error>> + Send;
}

/// [`StoreBackend`] over an external document collection.
///
/// Instances are located by an id-field filter; the collection's
/// internal storage id is excluded from everything returned.
pub struct DocumentBackend<D> {
    collection: D,
    id_field: String,
}

impl<D: DocumentStore> DocumentBackend<D> {
    /// Adapt `collection`, locating instances by `id_field`.
    ///
    /// The id field must match the one derived for the resource this
    /// backend serves.
    pub fn new(collection: D, id_field: impl Into<String>) -> Self {
        Self {
            collection,
            id_field: id_field.into(),
        }
    }

    fn id_filter(&self, id: &str) -> Value {
        let mut filter = Map::new();
        filter.insert(self.id_field.clone(), Value::String(id.to_string()));
        Value::Object(filter)
    }

    fn match_all() -> Value {
        Value::Object(Map::new())
    }

    fn strip_storage_id(mut document: Value) -> Value {
        if let Some(object) = document.as_object_mut() {
            object.remove(STORAGE_ID);
        }
        document
    }
}

impl<D: DocumentStore> StoreBackend for DocumentBackend<D> {
    async fn get(&self, id: &str) -> Result<Option<Value>, StorageError> {
        let documents = self
            .collection
            .find(&self.id_filter(id))
            .await
            .map_err(StorageError::backend)?;
        Ok(documents.into_iter().next().map(Self::strip_storage_id))
    }

    async fn list(&self) -> Result<Vec<Value>, StorageError> {
        let documents = self
            .collection
            .find(&Self::match_all())
            .await
            .map_err(StorageError::backend)?;
        Ok(documents.into_iter().map(Self::strip_storage_id).collect())
    }

    async fn insert(&self, id: &str, instance: Value) -> Result<Value, StorageError> {
        let filter = self.id_filter(id);
        let existing = self
            .collection
            .count(&filter)
            .await
            .map_err(StorageError::backend)?;
        if existing > 0 {
            return Err(StorageError::already_exists(id));
        }
        self.collection
            .insert(instance.clone())
            .await
            .map_err(StorageError::backend)?;
        Ok(instance)
    }

    async fn replace(&self, id: &str, instance: Value) -> Result<Value, StorageError> {
        let updated = self
            .collection
            .update(&self.id_filter(id), instance.clone())
            .await
            .map_err(StorageError::backend)?;
        if !updated {
            return Err(StorageError::not_found(id));
        }
        Ok(instance)
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        self.collection
            .delete(&self.id_filter(id))
            .await
            .map_err(StorageError::backend)
    }

    async fn contains(&self, id: &str) -> Result<bool, StorageError> {
        let matching = self
            .collection
            .count(&self.id_filter(id))
            .await
            .map_err(StorageError::backend)?;
        Ok(matching > 0)
    }

    async fn count(&self) -> Result<usize, StorageError> {
        self.collection
            .count(&Self::match_all())
            .await
            .map_err(StorageError::backend)
    }
}
