//! Model metadata and instance construction.
//!
//! A model is an opaque JSON record with named fields, one of which is
//! the identifier. [`FieldSet::derive`] plays the role a constructor
//! signature plays in a dynamic language: it fixes the ordered field
//! list, excludes protected fields, and picks the id field, once, at
//! resource-construction time. [`ModelFactory`] is the factory callable;
//! argument mismatches are client errors, not panics.
//!
//! # Example
//!
//! ```rust
//! use rest_binder::{FieldSet, ModelConfig};
//!
//! let fields = FieldSet::derive(
//!     ["id", "name", "age", "password"],
//!     &ModelConfig::default().protect("password"),
//! )?;
//! assert_eq!(fields.fields(), ["id", "name", "age"]);
//! assert_eq!(fields.id_field(), "id");
//! # Ok::<(), rest_binder::BuildError>(())
//! ```

use crate::error::{BuildError, BuildResult, FactoryError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::marker::PhantomData;

/// Declarative model metadata, evaluated once when a resource is built.
///
/// This is the statically typed replacement for decorator-style metadata
/// attachment: instead of tagging the model type, the markers travel in a
/// configuration struct alongside the factory.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    /// Fields always nulled before construction and excluded from the field list
    pub protected: Vec<String>,
    /// Fields settable only at construction, never via property update
    pub read_only: Vec<String>,
    /// Explicit id field; defaults to the first derived field
    pub id_field: Option<String>,
}

impl ModelConfig {
    /// Mark a field as protected.
    pub fn protect(mut self, field: impl Into<String>) -> Self {
        self.protected.push(field.into());
        self
    }

    /// Mark a field as read-only.
    pub fn read_only(mut self, field: impl Into<String>) -> Self {
        self.read_only.push(field.into());
        self
    }

    /// Designate the id field explicitly.
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }
}

/// The derived field list and id field for one model.
#[derive(Debug, Clone)]
pub struct FieldSet {
    fields: Vec<String>,
    id_field: String,
    protected: Vec<String>,
    read_only: HashSet<String>,
}

impl FieldSet {
    /// Derive the field list from the declared constructor parameters.
    ///
    /// Protected fields are excluded in place, preserving declaration
    /// order for the rest. Fails if nothing remains, if a marker names
    /// an undeclared field, or if the explicit id field did not survive
    /// the exclusion.
    pub fn derive<I, T>(declared: I, config: &ModelConfig) -> BuildResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let declared: Vec<String> = declared.into_iter().map(Into::into).collect();

        for field in &config.protected {
            if !declared.contains(field) {
                return Err(BuildError::UnknownProtectedField {
                    field: field.clone(),
                });
            }
        }

        let fields: Vec<String> = declared
            .into_iter()
            .filter(|f| !config.protected.contains(f))
            .collect();

        let Some(first) = fields.first() else {
            return Err(BuildError::NoUsableFields);
        };

        let id_field = match &config.id_field {
            Some(field) => {
                if !fields.contains(field) {
                    return Err(BuildError::InvalidIdField {
                        field: field.clone(),
                    });
                }
                field.clone()
            }
            None => first.clone(),
        };

        for field in &config.read_only {
            if !fields.contains(field) {
                return Err(BuildError::UnknownReadOnlyField {
                    field: field.clone(),
                });
            }
        }

        Ok(Self {
            fields,
            id_field,
            protected: config.protected.clone(),
            read_only: config.read_only.iter().cloned().collect(),
        })
    }

    /// The ordered field list (protected fields excluded).
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The designated identifier field.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Whether `name` is a recognized field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Whether `name` is marked read-only.
    pub fn is_read_only(&self, name: &str) -> bool {
        self.read_only.contains(name)
    }

    /// The protected field names.
    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    /// Filter a payload into constructor arguments: read-only keys are
    /// dropped, protected fields are force-nulled.
    pub(crate) fn prepare_args(&self, mut data: Map<String, Value>) -> Map<String, Value> {
        data.retain(|key, _| !self.read_only.contains(key));
        for field in &self.protected {
            data.insert(field.clone(), Value::Null);
        }
        data
    }
}

/// Factory for model instances.
///
/// Takes named constructor arguments and returns the instance as a JSON
/// object. The factory owns id assignment: when the id argument is
/// absent (collection create), it must generate one.
pub trait ModelFactory: Send + Sync {
    /// Construct an instance from named arguments.
    fn construct(&self, args: Map<String, Value>) -> Result<Value, FactoryError>;
}

/// Wrap a closure as a [`ModelFactory`].
pub fn factory_fn<F>(f: F) -> FnFactory<F>
where
    F: Fn(Map<String, Value>) -> Result<Value, FactoryError> + Send + Sync,
{
    FnFactory(f)
}

/// Closure-backed factory, see [`factory_fn`].
pub struct FnFactory<F>(F);

impl<F> ModelFactory for FnFactory<F>
where
    F: Fn(Map<String, Value>) -> Result<Value, FactoryError> + Send + Sync,
{
    fn construct(&self, args: Map<String, Value>) -> Result<Value, FactoryError> {
        (self.0)(args)
    }
}

/// Factory backed by a serde-deserializable model type.
///
/// Deserializing through `T` gives constructor-argument matching for
/// free: annotate `T` with `#[serde(deny_unknown_fields)]` to reject
/// unexpected arguments, use `#[serde(default = ...)]` on the id field
/// to make it server-assigned.
pub struct SerdeFactory<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeFactory<T> {
    /// Create a factory for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ModelFactory for SerdeFactory<T>
where
    T: DeserializeOwned + Serialize + Send + Sync,
{
    fn construct(&self, args: Map<String, Value>) -> Result<Value, FactoryError> {
        let typed: T = serde_json::from_value(Value::Object(args))
            .map_err(|e| FactoryError::invalid(e.to_string()))?;
        serde_json::to_value(typed).map_err(|e| FactoryError::invalid(e.to_string()))
    }
}
