//! Instance endpoint: retrieval, id-addressed creation, and removal.

use crate::dispatch::{
    Bindings, MethodSpec, REQUEST_PARAM, RestEndpoint, RestRequest, RestResponse, encode_pretty,
};
use crate::endpoints::{EndpointKind, PARAM_INSTANCE_ID};
use crate::error::{RestError, RestResult};
use crate::hooks::HookContext;
use crate::resource::ResourceInner;
use crate::storage::{StorageError, StoreBackend};
use log::info;
use serde_json::Value;
use std::sync::Arc;

const METHODS: &[MethodSpec] = &[
    MethodSpec {
        verb: "GET",
        params: &[PARAM_INSTANCE_ID],
    },
    MethodSpec {
        verb: "PUT",
        params: &[REQUEST_PARAM, PARAM_INSTANCE_ID],
    },
    MethodSpec {
        verb: "DELETE",
        params: &[PARAM_INSTANCE_ID],
    },
];

/// Serves `/R/{instance_id}`.
pub struct InstanceEndpoint<S> {
    inner: Arc<ResourceInner<S>>,
}

impl<S: StoreBackend> InstanceEndpoint<S> {
    pub(crate) fn new(inner: Arc<ResourceInner<S>>) -> Self {
        Self { inner }
    }

    async fn fetch(&self, instance_id: &str) -> RestResult<Value> {
        self.inner
            .store
            .get(instance_id)
            .await?
            .ok_or_else(|| RestError::not_found(instance_id))
    }

    /// Render one instance.
    async fn get(&self, instance_id: &str) -> RestResult<RestResponse> {
        let instance = self.fetch(instance_id).await?;
        let rendering = self.inner.render_value(&instance);

        self.inner
            .hooks
            .fire(
                EndpointKind::Instance,
                "GET",
                HookContext::instance(instance_id, rendering.clone()),
            )
            .await?;

        Ok(RestResponse::json(200, encode_pretty(&rendering)?))
    }

    /// Create an instance under a client-chosen id.
    ///
    /// The id comes from the path, never the payload, and the target id
    /// must be vacant. Replacing an existing instance wholesale is not
    /// supported; per-field updates go through the property endpoint.
    async fn put(&self, request: &RestRequest, instance_id: &str) -> RestResult<RestResponse> {
        let data = request.json_object()?;
        let id_field = self.inner.fields.id_field();
        if data.contains_key(id_field) {
            return Err(RestError::id_in_payload(id_field));
        }

        let mut args = self.inner.fields.prepare_args(data);
        args.insert(
            id_field.to_string(),
            Value::String(instance_id.to_string()),
        );
        let instance = self.inner.factory.construct(args)?;

        let stored = match self.inner.store.insert(instance_id, instance).await {
            Ok(stored) => stored,
            Err(StorageError::AlreadyExists { id }) => return Err(RestError::conflict(id)),
            Err(error) => return Err(error.into()),
        };

        let rendering = self.inner.render_value(&stored);
        self.inner
            .hooks
            .fire(
                EndpointKind::Instance,
                "PUT",
                HookContext::instance(instance_id, rendering.clone()),
            )
            .await?;

        info!(
            "created {} '{}' (request: '{}')",
            self.inner.name,
            instance_id,
            request.request_id()
        );
        // the client chose the id, so no Location header here; only the
        // collection POST reveals a server-assigned address
        Ok(RestResponse::json(201, encode_pretty(&rendering)?))
    }

    /// Remove an instance.
    async fn delete(&self, instance_id: &str) -> RestResult<RestResponse> {
        if !self.inner.store.delete(instance_id).await? {
            return Err(RestError::not_found(instance_id));
        }

        self.inner
            .hooks
            .fire(
                EndpointKind::Instance,
                "DELETE",
                HookContext::removed(instance_id),
            )
            .await?;

        info!("deleted {} '{}'", self.inner.name, instance_id);
        Ok(RestResponse::empty(204))
    }
}

impl<S: StoreBackend> RestEndpoint for InstanceEndpoint<S> {
    fn methods(&self) -> &'static [MethodSpec] {
        METHODS
    }

    async fn invoke(&self, verb: &str, bindings: &Bindings<'_>) -> RestResult<RestResponse> {
        match verb {
            "GET" => self.get(bindings.path(PARAM_INSTANCE_ID)?).await,
            "PUT" => {
                self.put(bindings.request(), bindings.path(PARAM_INSTANCE_ID)?)
                    .await
            }
            "DELETE" => self.delete(bindings.path(PARAM_INSTANCE_ID)?).await,
            other => Err(RestError::MethodNotAllowed {
                method: other.to_string(),
                allowed: METHODS.iter().map(|m| m.verb.to_string()).collect(),
            }),
        }
    }
}
