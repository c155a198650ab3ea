//! Collection endpoint: listing and creation.

use crate::dispatch::{
    Bindings, MethodSpec, REQUEST_PARAM, RestEndpoint, RestRequest, RestResponse, encode_pretty,
};
use crate::endpoints::EndpointKind;
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
        params: &[],
    },
    MethodSpec {
        verb: "POST",
        params: &[REQUEST_PARAM],
    },
];

/// Serves `/R`: listing on GET, creation on POST.
pub struct CollectionEndpoint<S> {
    inner: Arc<ResourceInner<S>>,
}

impl<S: StoreBackend> CollectionEndpoint<S> {
    pub(crate) fn new(inner: Arc<ResourceInner<S>>) -> Self {
        Self { inner }
    }

    /// List all instances as renderings.
    async fn get(&self) -> RestResult<RestResponse> {
        let instances = self.inner.store.list().await?;
        let listing: Vec<Value> = instances
            .iter()
            .map(|instance| self.inner.render_value(instance))
            .collect();

        self.inner
            .hooks
            .fire(
                EndpointKind::Collection,
                "GET",
                HookContext::listing(listing.clone()),
            )
            .await?;

        Ok(RestResponse::json(200, encode_pretty(&listing)?))
    }

    /// Create an instance with a factory-assigned id.
    ///
    /// The id field must not appear in the payload; clients wanting to
    /// pick the id use PUT on the instance endpoint instead.
    async fn post(&self, request: &RestRequest) -> RestResult<RestResponse> {
        let data = request.json_object()?;
        let id_field = self.inner.fields.id_field();
        if data.contains_key(id_field) {
            return Err(RestError::id_in_payload(id_field));
        }

        let args = self.inner.fields.prepare_args(data);
        let instance = self.inner.factory.construct(args)?;
        let id = self.inner.id_of(&instance)?;

        let stored = match self.inner.store.insert(&id, instance).await {
            Ok(stored) => stored,
            Err(StorageError::AlreadyExists { id }) => return Err(RestError::conflict(id)),
            Err(error) => return Err(error.into()),
        };

        let rendering = self.inner.render_value(&stored);
        self.inner
            .hooks
            .fire(
                EndpointKind::Collection,
                "POST",
                HookContext::instance(id.as_str(), rendering.clone()),
            )
            .await?;

        info!(
            "created {} '{}' (request: '{}')",
            self.inner.name,
            id,
            request.request_id()
        );
        Ok(RestResponse::json(201, encode_pretty(&rendering)?)
            .with_header("Location", self.inner.location(&id)))
    }
}

impl<S: StoreBackend> RestEndpoint for CollectionEndpoint<S> {
    fn methods(&self) -> &'static [MethodSpec] {
        METHODS
    }

    async fn invoke(&self, verb: &str, bindings: &Bindings<'_>) -> RestResult<RestResponse> {
        match verb {
            "GET" => self.get().await,
            "POST" => self.post(bindings.request()).await,
            other => Err(RestError::MethodNotAllowed {
                method: other.to_string(),
                allowed: METHODS.iter().map(|m| m.verb.to_string()).collect(),
            }),
        }
    }
}
