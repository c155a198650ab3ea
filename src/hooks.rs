//! Optional user callbacks fired after successful operations.
//!
//! Hooks are keyed two levels deep: endpoint category, then uppercased
//! verb. They run after the core operation succeeds and before the
//! response is returned, receiving whatever context the handler
//! computed. Failures are not caught here; see the crate docs.

use crate::endpoints::EndpointKind;
use crate::error::HookError;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Result of a hook invocation.
pub type HookResult = Result<(), HookError>;

type BoxHookFuture = Pin<Box<dyn Future<Output = HookResult> + Send>>;

/// A registered callback.
pub type Hook = Box<dyn Fn(HookContext) -> BoxHookFuture + Send + Sync>;

/// Contextual values computed by the handler that fired the hook.
///
/// Which fields are populated depends on the endpoint and verb: a
/// collection `GET` carries the listing, an instance mutation carries
/// the id and rendering, a property operation carries the property name
/// and value.
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    /// Id of the affected instance
    pub instance_id: Option<String>,
    /// Rendering of the affected instance
    pub instance: Option<Value>,
    /// Property name, for property-endpoint hooks
    pub property: Option<String>,
    /// Property value, for property-endpoint hooks
    pub value: Option<Value>,
    /// Full listing, for collection `GET`
    pub listing: Option<Vec<Value>>,
}

impl HookContext {
    /// Context for an instance create/replace.
    pub fn instance(id: impl Into<String>, rendering: Value) -> Self {
        Self {
            instance_id: Some(id.into()),
            instance: Some(rendering),
            ..Self::default()
        }
    }

    /// Context for an instance removal.
    pub fn removed(id: impl Into<String>) -> Self {
        Self {
            instance_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Context for a collection listing.
    pub fn listing(listing: Vec<Value>) -> Self {
        Self {
            listing: Some(listing),
            ..Self::default()
        }
    }

    /// Context for a property read or update.
    pub fn property(id: impl Into<String>, property: impl Into<String>, value: Value) -> Self {
        Self {
            instance_id: Some(id.into()),
            property: Some(property.into()),
            value: Some(value),
            ..Self::default()
        }
    }
}

/// Hook table for one resource.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<(EndpointKind, String), Hook>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for an endpoint category and verb,
    /// replacing any previous one.
    pub fn register<F, Fut>(&mut self, endpoint: EndpointKind, verb: &str, callback: F)
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.hooks.insert(
            (endpoint, verb.to_uppercase()),
            Box::new(move |ctx| Box::pin(callback(ctx))),
        );
    }

    /// Whether any hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Invoke the hook for `(endpoint, verb)`, if one is registered.
    pub(crate) async fn fire(
        &self,
        endpoint: EndpointKind,
        verb: &str,
        context: HookContext,
    ) -> HookResult {
        match self.hooks.get(&(endpoint, verb.to_uppercase())) {
            Some(hook) => hook(context).await,
            None => Ok(()),
        }
    }
}
