//! # REST Resource Binder
//!
//! A library for exposing data models as REST resources with minimal
//! glue: declare the model's fields, supply a factory and a store, and
//! get a complete set of collection, instance, and property endpoints
//! in return. The library is framework-agnostic; the host HTTP stack
//! routes requests into [`RestResource::handle`] and sends back the
//! [`RestResponse`] it returns.
//!
//! ## Features
//!
//! - **Declarative binding**: derive the served field list from the
//!   model's constructor parameters, with protected and read-only
//!   markers ([`model`])
//! - **Three endpoint groups per resource**: collection (`/R`),
//!   instance (`/R/{id}`), and per-field property
//!   (`/R/{id}/{field}`) ([`endpoints`])
//! - **Name-based dispatch**: handlers declare the parameters they
//!   need; binding is by name and order-independent ([`dispatch`])
//! - **Pluggable storage**: an in-memory store for tests and small
//!   deployments, plus an adapter over external document collections
//!   ([`storage`])
//! - **Callback hooks**: async callbacks fired after successful
//!   operations, keyed by endpoint and verb ([`hooks`])
//!
//! ## Quick Start
//!
//! ```rust
//! use rest_binder::{InMemoryStore, RestRequest, RestResource, SerdeFactory};
//! use rest_binder::endpoints::EndpointKind;
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Serialize, Deserialize)]
//! #[serde(deny_unknown_fields)]
//! struct Person {
//!     #[serde(default = "fresh_id")]
//!     id: String,
//!     name: String,
//!     age: u32,
//! }
//!
//! fn fresh_id() -> String {
//!     uuid::Uuid::new_v4().to_string()
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let people = RestResource::builder("people")
//!     .fields(["id", "name", "age"])
//!     .factory(SerdeFactory::<Person>::new())
//!     .store(InMemoryStore::new())
//!     .build()?;
//!
//! let request = RestRequest::new("POST").with_json(&json!({"name": "henry", "age": 469}));
//! let response = people.handle(EndpointKind::Collection, &request).await?;
//! assert_eq!(response.status(), 201);
//! assert!(response.header("Location").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Client mistakes (unknown method, missing parameter, malformed body,
//! duplicate id) become 4xx responses inside
//! [`handle`](RestResource::handle). Storage and hook failures are
//! returned as `Err` so the host framework's generic error path decides
//! how to report them; see [`error`] for the split.
//!
//! ## Concurrency
//!
//! Each store operation is atomic on its own, but a handler that reads
//! then writes (property update) performs two store calls and can lose
//! a race against a concurrent delete. The window is reported as a
//! not-found response rather than papered over.

pub mod dispatch;
pub mod endpoints;
pub mod error;
pub mod hooks;
pub mod model;
pub mod resource;
pub mod storage;

pub use dispatch::{
    Bindings, MethodSpec, REQUEST_PARAM, RestEndpoint, RestRequest, RestResponse, dispatch,
    encode_pretty,
};
pub use endpoints::{
    CollectionEndpoint, EndpointKind, InstanceEndpoint, PARAM_INSTANCE_ID, PARAM_PROPERTY_NAME,
    PropertyEndpoint,
};
pub use error::{
    BuildError, BuildResult, FactoryError, HookError, RestError, RestResult,
};
pub use hooks::{Hook, HookContext, HookRegistry, HookResult};
pub use model::{FieldSet, FnFactory, ModelConfig, ModelFactory, SerdeFactory, factory_fn};
pub use resource::{RestResource, RestResourceBuilder, Route};
pub use storage::{DocumentBackend, DocumentStore, InMemoryStore, StorageError, StoreBackend};
