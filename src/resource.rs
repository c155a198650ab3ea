//! The resource abstraction: one bound model, three endpoint groups.
//!
//! A [`RestResource`] composes a name (the URL path segment), a
//! factory, a backing store, the derived field metadata, and optional
//! callback hooks. Configuration problems surface here, once, as
//! [`BuildError`]s; everything later is per-request.

use crate::dispatch::{RestRequest, RestResponse, dispatch};
use crate::endpoints::{
    CollectionEndpoint, EndpointKind, InstanceEndpoint, PARAM_INSTANCE_ID, PARAM_PROPERTY_NAME,
    PropertyEndpoint,
};
use crate::error::{BuildError, BuildResult, RestError, RestResult};
use crate::hooks::{HookContext, HookRegistry, HookResult};
use crate::model::{FieldSet, ModelConfig, ModelFactory};
use crate::storage::StoreBackend;
use log::warn;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

/// Shared state behind the three endpoint groups.
pub(crate) struct ResourceInner<S> {
    pub(crate) name: String,
    pub(crate) fields: FieldSet,
    pub(crate) factory: Box<dyn ModelFactory>,
    pub(crate) store: S,
    pub(crate) hooks: HookRegistry,
}

impl<S: StoreBackend> ResourceInner<S> {
    /// Project an instance onto the derived field list, in declared
    /// order. Fields absent from the instance render as null.
    pub(crate) fn render(&self, instance: &Value) -> Map<String, Value> {
        self.fields
            .fields()
            .iter()
            .map(|field| {
                (
                    field.clone(),
                    instance.get(field).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }

    pub(crate) fn render_value(&self, instance: &Value) -> Value {
        Value::Object(self.render(instance))
    }

    /// Extract the string form of an instance's id field.
    ///
    /// The factory contract requires the field to be present and
    /// string-like; a violation is an internal error, not a client one.
    pub(crate) fn id_of(&self, instance: &Value) -> RestResult<String> {
        let field = self.fields.id_field();
        match instance.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(RestError::internal(format!(
                "factory produced an instance without a usable '{field}' field"
            ))),
        }
    }

    pub(crate) fn location(&self, id: &str) -> String {
        format!("/{}/{}", self.name, id)
    }
}

/// One registered route: a wildcard-method pattern and the endpoint
/// group behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path pattern with `{instance_id}` / `{property_name}` variables
    pub pattern: String,
    /// Which endpoint group serves the pattern
    pub endpoint: EndpointKind,
}

/// A model bound to a store, serving three endpoint groups.
pub struct RestResource<S> {
    inner: Arc<ResourceInner<S>>,
    collection: CollectionEndpoint<S>,
    instance: InstanceEndpoint<S>,
    property: PropertyEndpoint<S>,
}

impl<S: StoreBackend> RestResource<S> {
    /// Start building a resource named `name`.
    pub fn builder(name: impl Into<String>) -> RestResourceBuilder<S> {
        RestResourceBuilder::new(name)
    }

    /// The resource name (URL path segment).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The derived field metadata.
    pub fn fields(&self) -> &FieldSet {
        &self.inner.fields
    }

    /// The collection endpoint (`/R`).
    pub fn collection(&self) -> &CollectionEndpoint<S> {
        &self.collection
    }

    /// The instance endpoint (`/R/{instance_id}`).
    pub fn instance(&self) -> &InstanceEndpoint<S> {
        &self.instance
    }

    /// The property endpoint (`/R/{instance_id}/{property_name}`).
    pub fn property(&self) -> &PropertyEndpoint<S> {
        &self.property
    }

    /// The three route patterns to register with the host router, all
    /// with a wildcard method.
    pub fn routes(&self) -> [Route; 3] {
        let name = &self.inner.name;
        [
            Route {
                pattern: format!("/{name}"),
                endpoint: EndpointKind::Collection,
            },
            Route {
                pattern: format!("/{name}/{{{PARAM_INSTANCE_ID}}}"),
                endpoint: EndpointKind::Instance,
            },
            Route {
                pattern: format!("/{name}/{{{PARAM_INSTANCE_ID}}}/{{{PARAM_PROPERTY_NAME}}}"),
                endpoint: EndpointKind::Property,
            },
        ]
    }

    /// Handle a request routed to one of the endpoint groups.
    ///
    /// Client errors become 4xx responses here; storage and hook
    /// failures are returned as `Err` for the host framework's generic
    /// error path.
    pub async fn handle(
        &self,
        endpoint: EndpointKind,
        request: &RestRequest,
    ) -> Result<RestResponse, RestError> {
        let result = match endpoint {
            EndpointKind::Collection => dispatch(&self.collection, request).await,
            EndpointKind::Instance => dispatch(&self.instance, request).await,
            EndpointKind::Property => dispatch(&self.property, request).await,
        };

        match result {
            Ok(response) => Ok(response),
            Err(error) if error.is_client() => {
                warn!(
                    "{} /{} ({}) rejected: {} (request: '{}')",
                    request.method(),
                    self.inner.name,
                    endpoint,
                    error,
                    request.request_id()
                );
                Ok(error.to_response())
            }
            Err(error) => Err(error),
        }
    }
}

/// Builder for [`RestResource`], where configuration errors surface.
pub struct RestResourceBuilder<S> {
    name: String,
    declared_fields: Vec<String>,
    config: ModelConfig,
    factory: Option<Box<dyn ModelFactory>>,
    store: Option<S>,
    hooks: HookRegistry,
}

impl<S: StoreBackend> RestResourceBuilder<S> {
    /// Create a builder for a resource named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_fields: Vec::new(),
            config: ModelConfig::default(),
            factory: None,
            store: None,
            hooks: HookRegistry::new(),
        }
    }

    /// Declare the model's constructor parameters, in order.
    pub fn fields<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.declared_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Mark a field as protected: always nulled before construction,
    /// never part of the derived field list.
    pub fn protect(mut self, field: impl Into<String>) -> Self {
        self.config = self.config.protect(field);
        self
    }

    /// Mark a field as read-only: settable only at construction.
    pub fn read_only(mut self, field: impl Into<String>) -> Self {
        self.config = self.config.read_only(field);
        self
    }

    /// Designate the id field explicitly; defaults to the first
    /// derived field.
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.config = self.config.id_field(field);
        self
    }

    /// Set the instance factory.
    pub fn factory(mut self, factory: impl ModelFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Set the backing store.
    pub fn store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    /// Register a callback fired after `(endpoint, verb)` succeeds.
    pub fn hook<F, Fut>(mut self, endpoint: EndpointKind, verb: &str, callback: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.hooks.register(endpoint, verb, callback);
        self
    }

    /// Derive the field metadata and assemble the resource.
    pub fn build(self) -> BuildResult<RestResource<S>> {
        let fields = FieldSet::derive(self.declared_fields, &self.config)?;
        let factory = self.factory.ok_or(BuildError::MissingFactory)?;
        let store = self.store.ok_or(BuildError::MissingStore)?;

        let inner = Arc::new(ResourceInner {
            name: self.name,
            fields,
            factory,
            store,
            hooks: self.hooks,
        });

        Ok(RestResource {
            collection: CollectionEndpoint::new(inner.clone()),
            instance: InstanceEndpoint::new(inner.clone()),
            property: PropertyEndpoint::new(inner.clone()),
            inner,
        })
    }
}
