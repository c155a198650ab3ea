//! Error types for resource binding and request handling.
//!
//! Errors are split by lifecycle: [`BuildError`] covers configuration
//! mistakes caught once at resource construction, while [`RestError`]
//! covers everything that can happen while serving a request. Client
//! errors carry an HTTP status via [`RestError::status`]; backend and
//! hook failures have no status and propagate to the host framework.

use crate::storage::StorageError;

/// Main error type for request handling.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// No handler is registered for the request method
    #[error("method '{method}' is not allowed (allowed: {})", .allowed.join(", "))]
    MethodNotAllowed {
        method: String,
        allowed: Vec<String>,
    },

    /// A handler parameter has no corresponding path variable or request binding
    #[error("missing required parameter '{parameter}'")]
    MissingParameter { parameter: String },

    /// Request body is absent, not valid JSON, or not the expected shape
    #[error("malformed request body: {detail}")]
    MalformedBody { detail: String },

    /// The id field may not be supplied by the client on this endpoint
    #[error("'{field}' must not be supplied in the payload")]
    IdFieldInPayload { field: String },

    /// The property is not one of the resource's derived fields
    #[error("unknown property '{property}'")]
    UnknownProperty { property: String },

    /// The property is marked read-only and cannot be updated
    #[error("property '{property}' is read-only")]
    ReadOnlyProperty { property: String },

    /// An instance already exists under this id
    #[error("an instance with id '{id}' already exists")]
    Conflict { id: String },

    /// No instance is stored under this id
    #[error("no instance with id '{id}'")]
    NotFound { id: String },

    /// The factory rejected the constructor arguments
    #[error("factory rejected arguments: {0}")]
    Factory(#[from] FactoryError),

    /// Errors from the backing store; not mapped to a status, they
    /// reach the host framework's generic error path
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A user callback failed after the core operation succeeded
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Internal invariant violation (e.g. a factory produced an
    /// instance without its id field)
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl RestError {
    /// Create a missing parameter error.
    pub fn missing_parameter(parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            parameter: parameter.into(),
        }
    }

    /// Create a malformed body error.
    pub fn malformed_body(detail: impl Into<String>) -> Self {
        Self::MalformedBody {
            detail: detail.into(),
        }
    }

    /// Create an id-in-payload error.
    pub fn id_in_payload(field: impl Into<String>) -> Self {
        Self::IdFieldInPayload {
            field: field.into(),
        }
    }

    /// Create an unknown property error.
    pub fn unknown_property(property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            property: property.into(),
        }
    }

    /// Create a read-only property error.
    pub fn read_only(property: impl Into<String>) -> Self {
        Self::ReadOnlyProperty {
            property: property.into(),
        }
    }

    /// Create a duplicate-id conflict error.
    pub fn conflict(id: impl Into<String>) -> Self {
        Self::Conflict { id: id.into() }
    }

    /// Create a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status for client errors; `None` for errors that must
    /// propagate to the framework instead of becoming a response.
    pub fn status(&self) -> Option<u16> {
        Some(match self {
            Self::MethodNotAllowed { .. } => 405,
            Self::NotFound { .. } | Self::UnknownProperty { .. } => 404,
            Self::MissingParameter { .. }
            | Self::MalformedBody { .. }
            | Self::IdFieldInPayload { .. }
            | Self::ReadOnlyProperty { .. }
            | Self::Conflict { .. }
            | Self::Factory(_) => 400,
            Self::Storage(_) | Self::Hook(_) | Self::Internal { .. } => return None,
        })
    }

    /// Whether this error is surfaced to the client as a 4xx response.
    pub fn is_client(&self) -> bool {
        self.status().is_some()
    }
}

/// Errors raised by model factories when constructor arguments don't match.
///
/// These are always client errors: the payload named an argument the
/// factory does not accept, or omitted one it requires.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// A required constructor argument is absent
    #[error("missing argument '{argument}'")]
    MissingArgument { argument: String },

    /// The payload supplied an argument the factory does not accept
    #[error("unexpected argument '{argument}'")]
    UnexpectedArgument { argument: String },

    /// Arguments were present but could not be used to construct an instance
    #[error("invalid arguments: {message}")]
    Invalid { message: String },
}

impl FactoryError {
    /// Create a missing argument error.
    pub fn missing(argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            argument: argument.into(),
        }
    }

    /// Create an unexpected argument error.
    pub fn unexpected(argument: impl Into<String>) -> Self {
        Self::UnexpectedArgument {
            argument: argument.into(),
        }
    }

    /// Create a general invalid-arguments error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Failure of a user-supplied callback hook.
///
/// Hook failures are not caught: they propagate out of request handling
/// and become the response, matching the observed upstream behavior.
#[derive(Debug, thiserror::Error)]
#[error("hook failed: {message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Create a hook error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur while building a resource.
///
/// These are programming errors and should be caught during development
/// rather than at request time.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Excluding protected fields left nothing to bind
    #[error("no usable fields remain after excluding protected fields")]
    NoUsableFields,

    /// The declared id field was excluded or never declared
    #[error("id field '{field}' is not among the usable fields")]
    InvalidIdField { field: String },

    /// A protected marker names a field that was never declared
    #[error("protected field '{field}' is not a declared field")]
    UnknownProtectedField { field: String },

    /// A read-only marker names a field outside the derived field list
    #[error("read-only field '{field}' is not a usable field")]
    UnknownReadOnlyField { field: String },

    /// Resource factory was not configured
    #[error("resource factory is required but not provided")]
    MissingFactory,

    /// Backing store was not configured
    #[error("backing store is required but not provided")]
    MissingStore,
}

// Result type aliases for convenience
pub type RestResult<T> = Result<T, RestError>;
pub type BuildResult<T> = Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_statuses() {
        assert_eq!(RestError::not_found("42").status(), Some(404));
        assert_eq!(RestError::unknown_property("age").status(), Some(404));
        assert_eq!(RestError::conflict("42").status(), Some(400));
        assert_eq!(
            RestError::MethodNotAllowed {
                method: "PATCH".into(),
                allowed: vec!["GET".into()],
            }
            .status(),
            Some(405)
        );
    }

    #[test]
    fn test_backend_errors_have_no_status() {
        let error = RestError::from(StorageError::backend_message("connection reset"));
        assert_eq!(error.status(), None);
        assert!(!error.is_client());

        let error = RestError::from(HookError::new("audit sink down"));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_method_not_allowed_enumerates_methods() {
        let error = RestError::MethodNotAllowed {
            method: "PATCH".into(),
            allowed: vec!["GET".into(), "POST".into()],
        };
        assert!(error.to_string().contains("GET, POST"));
    }

    #[test]
    fn test_factory_error_is_client() {
        let error = RestError::from(FactoryError::unexpected("shoe_size"));
        assert_eq!(error.status(), Some(400));
        assert!(error.to_string().contains("shoe_size"));
    }
}
