//! Property endpoint: per-field reads and updates.

use crate::dispatch::{
    Bindings, MethodSpec, REQUEST_PARAM, RestEndpoint, RestRequest, RestResponse, encode_pretty,
};
use crate::endpoints::{EndpointKind, PARAM_INSTANCE_ID, PARAM_PROPERTY_NAME};
use crate::error::{RestError, RestResult};
use crate::hooks::HookContext;
use crate::resource::ResourceInner;
use crate::storage::{StorageError, StoreBackend};
use log::info;
use serde_json::{Map, Value};
use std::sync::Arc;

const METHODS: &[MethodSpec] = &[
    MethodSpec {
        verb: "GET",
        params: &[PARAM_INSTANCE_ID, PARAM_PROPERTY_NAME],
    },
    MethodSpec {
        verb: "PUT",
        params: &[REQUEST_PARAM, PARAM_INSTANCE_ID, PARAM_PROPERTY_NAME],
    },
    MethodSpec {
        verb: "DELETE",
        params: &[PARAM_INSTANCE_ID, PARAM_PROPERTY_NAME],
    },
];

/// Serves `/R/{instance_id}/{property_name}`.
pub struct PropertyEndpoint<S> {
    inner: Arc<ResourceInner<S>>,
}

impl<S: StoreBackend> PropertyEndpoint<S> {
    pub(crate) fn new(inner: Arc<ResourceInner<S>>) -> Self {
        Self { inner }
    }

    /// A single-pair object, the body shape for every property response.
    fn property_body(property: &str, value: &Value) -> RestResult<Vec<u8>> {
        let mut body = Map::new();
        body.insert(property.to_string(), value.clone());
        encode_pretty(&Value::Object(body))
    }

    async fn fetch(&self, instance_id: &str) -> RestResult<Value> {
        self.inner
            .store
            .get(instance_id)
            .await?
            .ok_or_else(|| RestError::not_found(instance_id))
    }

    /// Read one field.
    async fn get(&self, instance_id: &str, property: &str) -> RestResult<RestResponse> {
        if !self.inner.fields.contains(property) {
            return Err(RestError::unknown_property(property));
        }
        let instance = self.fetch(instance_id).await?;
        let value = instance.get(property).cloned().unwrap_or(Value::Null);

        self.inner
            .hooks
            .fire(
                EndpointKind::Property,
                "GET",
                HookContext::property(instance_id, property, value.clone()),
            )
            .await?;

        Ok(RestResponse::json(200, Self::property_body(property, &value)?))
    }

    /// Overwrite one field.
    ///
    /// The body must carry the new value under the property's own name.
    async fn put(
        &self,
        request: &RestRequest,
        instance_id: &str,
        property: &str,
    ) -> RestResult<RestResponse> {
        if !self.inner.fields.contains(property) {
            return Err(RestError::unknown_property(property));
        }
        if self.inner.fields.is_read_only(property) {
            return Err(RestError::read_only(property));
        }

        let mut data = request.json_object()?;
        let mut instance = self.fetch(instance_id).await?;
        let value = data.remove(property).ok_or_else(|| {
            RestError::malformed_body(format!("body is missing the '{property}' key"))
        })?;
        match instance.as_object_mut() {
            Some(object) => {
                object.insert(property.to_string(), value.clone());
            }
            None => {
                return Err(RestError::internal(format!(
                    "stored instance '{instance_id}' is not an object"
                )));
            }
        }
        self.store_back(instance_id, instance).await?;

        self.inner
            .hooks
            .fire(
                EndpointKind::Property,
                "PUT",
                HookContext::property(instance_id, property, value.clone()),
            )
            .await?;

        info!(
            "updated {} '{}' field '{}' (request: '{}')",
            self.inner.name,
            instance_id,
            property,
            request.request_id()
        );
        Ok(RestResponse::json(200, Self::property_body(property, &value)?))
    }

    /// Clear one field back to null.
    async fn delete(&self, instance_id: &str, property: &str) -> RestResult<RestResponse> {
        if !self.inner.fields.contains(property) {
            return Err(RestError::unknown_property(property));
        }
        if self.inner.fields.is_read_only(property) {
            return Err(RestError::read_only(property));
        }

        let mut instance = self.fetch(instance_id).await?;
        match instance.as_object_mut() {
            Some(object) => {
                object.insert(property.to_string(), Value::Null);
            }
            None => {
                return Err(RestError::internal(format!(
                    "stored instance '{instance_id}' is not an object"
                )));
            }
        }
        self.store_back(instance_id, instance).await?;

        self.inner
            .hooks
            .fire(
                EndpointKind::Property,
                "DELETE",
                HookContext::property(instance_id, property, Value::Null),
            )
            .await?;

        info!(
            "cleared {} '{}' field '{}'",
            self.inner.name, instance_id, property
        );
        Ok(RestResponse::empty(204))
    }

    async fn store_back(&self, instance_id: &str, instance: Value) -> RestResult<Value> {
        match self.inner.store.replace(instance_id, instance).await {
            Ok(stored) => Ok(stored),
            // the instance was fetched moments ago; losing the race to a
            // concurrent delete reads as a missing instance
            Err(StorageError::NotFound { id }) => Err(RestError::not_found(id)),
            Err(error) => Err(error.into()),
        }
    }
}

impl<S: StoreBackend> RestEndpoint for PropertyEndpoint<S> {
    fn methods(&self) -> &'static [MethodSpec] {
        METHODS
    }

    async fn invoke(&self, verb: &str, bindings: &Bindings<'_>) -> RestResult<RestResponse> {
        let instance_id = bindings.path(PARAM_INSTANCE_ID)?;
        let property = bindings.path(PARAM_PROPERTY_NAME)?;
        match verb {
            "GET" => self.get(instance_id, property).await,
            "PUT" => self.put(bindings.request(), instance_id, property).await,
            "DELETE" => self.delete(instance_id, property).await,
            other => Err(RestError::MethodNotAllowed {
                method: other.to_string(),
                allowed: METHODS.iter().map(|m| m.verb.to_string()).collect(),
            }),
        }
    }
}
