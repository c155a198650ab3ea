//! Shared fixtures for the integration tests.

// not every test binary uses every fixture
#![allow(dead_code)]

use rest_binder::{DocumentStore, InMemoryStore, RestResource, SerdeFactory};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::{Arc, Once};
use tokio::sync::Mutex;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// The canonical test model: a server-assigned id plus two data fields.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    #[serde(default = "fresh_id")]
    pub id: String,
    pub name: String,
    pub age: u32,
}

pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A `people` resource over a shared in-memory store. The returned
/// store clone sees the same data as the resource.
pub fn person_resource() -> (RestResource<InMemoryStore>, InMemoryStore) {
    init_logging();
    let store = InMemoryStore::new();
    let resource = RestResource::builder("people")
        .fields(["id", "name", "age"])
        .factory(SerdeFactory::<Person>::new())
        .store(store.clone())
        .build()
        .expect("fixture resource must build");
    (resource, store)
}

/// Like [`person_resource`] but with `age` marked read-only.
pub fn person_resource_read_only_age() -> (RestResource<InMemoryStore>, InMemoryStore) {
    init_logging();
    let store = InMemoryStore::new();
    let resource = RestResource::builder("people")
        .fields(["id", "name", "age"])
        .read_only("age")
        .factory(SerdeFactory::<Person>::new())
        .store(store.clone())
        .build()
        .expect("fixture resource must build");
    (resource, store)
}

/// Insert a person directly into the store, bypassing the endpoints.
pub async fn seed_person(store: &InMemoryStore, id: &str, name: &str, age: u32) {
    use rest_binder::StoreBackend;
    store
        .insert(id, json!({"id": id, "name": name, "age": age}))
        .await
        .expect("seeding must not collide");
}

/// In-memory stand-in for an external document collection: documents in
/// a `Vec`, filters matched by field equality, `_id` assigned on insert.
#[derive(Clone, Default)]
pub struct FakeCollection {
    documents: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<Mutex<u64>>,
}

fn matches(document: &Value, filter: &Value) -> bool {
    filter
        .as_object()
        .is_some_and(|f| f.iter().all(|(k, v)| document.get(k) == Some(v)))
}

impl DocumentStore for FakeCollection {
    type Error = Infallible;

    async fn find(&self, filter: &Value) -> Result<Vec<Value>, Infallible> {
        let documents = self.documents.lock().await;
        Ok(documents
            .iter()
            .filter(|d| matches(d, filter))
            .cloned()
            .collect())
    }

    async fn insert(&self, mut document: Value) -> Result<(), Infallible> {
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        if let Some(object) = document.as_object_mut() {
            object.insert("_id".to_string(), json!(*next_id));
        }
        self.documents.lock().await.push(document);
        Ok(())
    }

    async fn update(&self, filter: &Value, document: Value) -> Result<bool, Infallible> {
        let mut documents = self.documents.lock().await;
        match documents.iter_mut().find(|d| matches(d, filter)) {
            Some(slot) => {
                *slot = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, filter: &Value) -> Result<bool, Infallible> {
        let mut documents = self.documents.lock().await;
        match documents.iter().position(|d| matches(d, filter)) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self, filter: &Value) -> Result<usize, Infallible> {
        let documents = self.documents.lock().await;
        Ok(documents.iter().filter(|d| matches(d, filter)).count())
    }
}
