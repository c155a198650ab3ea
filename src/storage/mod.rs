//! Storage abstraction for resource instances.
//!
//! The [`StoreBackend`] trait defines uniform id-keyed operations over
//! JSON documents, keeping endpoint logic independent of where
//! instances live. Two backends are provided: an in-memory ordered
//! mapping ([`InMemoryStore`]) and an adapter over an external document
//! collection ([`DocumentBackend`]).
//!
//! The storage layer knows nothing about fields, factories, or HTTP
//! semantics; create-vs-replace distinctions are expressed through
//! `insert` (fails on a duplicate id) and `replace` (fails on a missing
//! id), so the endpoint layer can pick the right status code.

pub mod document;
pub mod in_memory;

pub use document::{DocumentBackend, DocumentStore};
pub use in_memory::InMemoryStore;

use serde_json::Value;
use std::future::Future;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An instance is already stored under this id
    #[error("instance '{id}' already exists")]
    AlreadyExists { id: String },

    /// No instance is stored under this id
    #[error("instance '{id}' not found")]
    NotFound { id: String },

    /// Failure inside an external backend
    #[error("backend failure: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StorageError {
    /// Create a duplicate-id error.
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Create a missing-id error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Wrap an external backend error.
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Create a backend error from a bare message.
    pub fn backend_message(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }
}

/// Uniform id-keyed operations over one resource's instances.
///
/// Each operation is a single call into the backend; atomicity across
/// calls is not provided (see the crate docs on concurrency).
pub trait StoreBackend: Send + Sync {
    /// Fetch the instance stored under `id`, if any.
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send;

    /// All stored instances, in stable id order.
    fn list(&self) -> impl Future<Output = Result<Vec<Value>, StorageError>> + Send;

    /// Store a new instance under `id`.
    ///
    /// Fails with [`StorageError::AlreadyExists`] when the id is taken;
    /// returns the stored instance otherwise.
    fn insert(
        &self,
        id: &str,
        instance: Value,
    ) -> impl Future<Output = Result<Value, StorageError>> + Send;

    /// Replace the instance stored under `id`.
    ///
    /// Fails with [`StorageError::NotFound`] when nothing is stored
    /// there; returns the stored instance otherwise.
    fn replace(
        &self,
        id: &str,
        instance: Value,
    ) -> impl Future<Output = Result<Value, StorageError>> + Send;

    /// Remove the instance stored under `id`.
    ///
    /// Returns whether it existed, so callers can pick 204 vs 404.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Whether an instance is stored under `id`.
    fn contains(&self, id: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// The number of stored instances.
    fn count(&self) -> impl Future<Output = Result<usize, StorageError>> + Send;
}
