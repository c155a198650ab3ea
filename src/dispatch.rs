//! Framework-agnostic request dispatch.
//!
//! The host HTTP framework does path matching and hands this module a
//! [`RestRequest`]: the method, the matched path variables, and the raw
//! body. [`dispatch`] then resolves the handler by uppercased verb,
//! checks that every parameter the handler declares is bindable, and
//! invokes it. Parameter binding is by name, never by position, so it
//! is order-independent with respect to how the path variables were
//! populated.
//!
//! Handlers declare their parameters in a [`MethodSpec`] table instead
//! of relying on runtime signature inspection; the request object is
//! bindable under the reserved name [`REQUEST_PARAM`].

use crate::error::{RestError, RestResult};
use log::debug;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use uuid::Uuid;

/// Reserved binding name under which the request object is available.
pub const REQUEST_PARAM: &str = "request";

/// An inbound request, as prepared by the host framework's router.
#[derive(Debug, Clone)]
pub struct RestRequest {
    method: String,
    path_params: HashMap<String, String>,
    body: Option<Vec<u8>>,
    request_id: String,
}

impl RestRequest {
    /// Create a request with the given HTTP method and a generated
    /// request id.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path_params: HashMap::new(),
            body: None,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Add a matched path variable.
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Attach a raw body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a JSON body.
    pub fn with_json(self, value: &Value) -> Self {
        // to_vec of a Value cannot fail
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.with_body(body)
    }

    /// Override the generated request id (e.g. from a trace header).
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// The HTTP method as received.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// A matched path variable, if present.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// The request id used in log lines.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The raw body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> RestResult<Value> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| RestError::malformed_body("request body is required"))?;
        serde_json::from_slice(body).map_err(|e| RestError::malformed_body(e.to_string()))
    }

    /// Decode the body as a JSON object.
    pub fn json_object(&self) -> RestResult<Map<String, Value>> {
        match self.json()? {
            Value::Object(map) => Ok(map),
            other => Err(RestError::malformed_body(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// An outbound response for the host framework to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl RestResponse {
    /// A response with a JSON body.
    pub fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    /// A bodyless response.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Look up a header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The body bytes, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Decode the body as JSON, mainly for tests and adapters.
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(self.body.as_deref()?).ok()
    }
}

/// Encode a value as UTF-8 JSON, pretty-printed with 4-space indentation.
pub fn encode_pretty<T: Serialize>(value: &T) -> RestResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| RestError::internal(format!("failed to encode response: {e}")))?;
    Ok(buf)
}

/// One registered handler: its verb and the parameter names it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    /// Uppercased HTTP verb
    pub verb: &'static str,
    /// Names the handler binds, in declared order
    pub params: &'static [&'static str],
}

/// The available-argument mapping for one request: path-match variables
/// plus the request object under [`REQUEST_PARAM`].
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    request: &'a RestRequest,
}

impl<'a> Bindings<'a> {
    /// Build the bindings for a request.
    pub fn new(request: &'a RestRequest) -> Self {
        Self { request }
    }

    /// Whether an argument is available under `name`.
    pub fn contains(&self, name: &str) -> bool {
        name == REQUEST_PARAM || self.request.path_params.contains_key(name)
    }

    /// The path variable bound under `name`.
    pub fn path(&self, name: &str) -> RestResult<&'a str> {
        self.request
            .path_param(name)
            .ok_or_else(|| RestError::missing_parameter(name))
    }

    /// The request object itself.
    pub fn request(&self) -> &'a RestRequest {
        self.request
    }
}

/// One endpoint group: a verb table plus the handlers behind it.
pub trait RestEndpoint: Send + Sync {
    /// The registered handlers.
    fn methods(&self) -> &'static [MethodSpec];

    /// Invoke the handler for `verb`, pulling its declared parameters
    /// from `bindings` by name. `verb` is always one of the entries in
    /// [`methods`](Self::methods).
    fn invoke(
        &self,
        verb: &str,
        bindings: &Bindings<'_>,
    ) -> impl Future<Output = RestResult<RestResponse>> + Send;
}

/// Resolve and invoke the handler for a request.
///
/// Fails with [`RestError::MethodNotAllowed`] (enumerating the
/// registered verbs) when no handler matches the uppercased method, and
/// with [`RestError::MissingParameter`] when a declared parameter has no
/// binding.
pub async fn dispatch<E: RestEndpoint>(
    endpoint: &E,
    request: &RestRequest,
) -> RestResult<RestResponse> {
    let verb = request.method().to_uppercase();

    let Some(spec) = endpoint.methods().iter().find(|m| m.verb == verb) else {
        return Err(RestError::MethodNotAllowed {
            method: verb,
            allowed: endpoint
                .methods()
                .iter()
                .map(|m| m.verb.to_string())
                .collect(),
        });
    };

    let bindings = Bindings::new(request);
    if let Some(missing) = spec.params.iter().find(|p| !bindings.contains(p)) {
        return Err(RestError::missing_parameter(*missing));
    }

    debug!(
        "dispatching {} with params {:?} (request: '{}')",
        spec.verb,
        spec.params,
        request.request_id()
    );
    endpoint.invoke(spec.verb, &bindings).await
}

impl RestError {
    /// Render a client error as its response: status from
    /// [`status`](Self::status), a JSON error body, and for 405 an
    /// `Allow` header enumerating the registered methods.
    ///
    /// # Panics
    /// Debug-asserts that the error is a client error; backend errors
    /// have no response form and must propagate instead.
    pub fn to_response(&self) -> RestResponse {
        debug_assert!(self.is_client(), "only client errors map to responses");
        let status = self.status().unwrap_or(500);
        let body =
            encode_pretty(&serde_json::json!({ "error": self.to_string() })).unwrap_or_default();
        let response = RestResponse::json(status, body);
        match self {
            Self::MethodNotAllowed { allowed, .. } => {
                response.with_header("Allow", allowed.join(", "))
            }
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bindings_reserve_request_name() {
        let request = RestRequest::new("GET").with_path_param("instance_id", "42");
        let bindings = Bindings::new(&request);

        assert!(bindings.contains(REQUEST_PARAM));
        assert!(bindings.contains("instance_id"));
        assert!(!bindings.contains("property_name"));
        assert_eq!(bindings.path("instance_id").unwrap(), "42");
        assert!(bindings.path("property_name").is_err());
    }

    #[test]
    fn test_json_body_decoding() {
        let request = RestRequest::new("POST").with_json(&json!({"name": "henry"}));
        assert_eq!(request.json_object().unwrap()["name"], "henry");

        let no_body = RestRequest::new("POST");
        assert!(matches!(
            no_body.json(),
            Err(RestError::MalformedBody { .. })
        ));

        let not_object = RestRequest::new("POST").with_json(&json!([1, 2]));
        assert!(matches!(
            not_object.json_object(),
            Err(RestError::MalformedBody { .. })
        ));

        let garbage = RestRequest::new("POST").with_body(b"{not json".to_vec());
        assert!(matches!(garbage.json(), Err(RestError::MalformedBody { .. })));
    }

    #[test]
    fn test_encode_pretty_uses_four_space_indent() {
        let bytes = encode_pretty(&json!({"name": "henry"})).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n    \"name\": \"henry\"\n}");
    }

    #[test]
    fn test_error_response_carries_allow_header() {
        let error = RestError::MethodNotAllowed {
            method: "PATCH".into(),
            allowed: vec!["GET".into(), "PUT".into()],
        };
        let response = error.to_response();
        assert_eq!(response.status(), 405);
        assert_eq!(response.header("allow"), Some("GET, PUT"));
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = RestResponse::json(201, Vec::new()).with_header("Location", "/people/42");
        assert_eq!(response.header("location"), Some("/people/42"));
        assert_eq!(response.header("LOCATION"), Some("/people/42"));
    }
}
