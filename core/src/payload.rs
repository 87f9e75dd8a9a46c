//! Request and response bodies, and the case transform applied to them at
//! the network boundary.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::case::{to_camel, to_snake};
use crate::error::ApiError;

/// A request or response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured JSON. Object keys follow whichever convention belongs to
    /// the side of the boundary the payload sits on.
    Json(Value),
    /// Anything that is not re-keyed: plain-text responses, pre-encoded
    /// request bodies.
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }

    /// Deserialize camelCased JSON data into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match self {
            Payload::Json(value) => {
                T::deserialize(value).map_err(|e| ApiError::Deserialization(e.to_string()))
            }
            Payload::Text(text) => Err(ApiError::Deserialization(format!(
                "expected a JSON body, got text: {text:?}"
            ))),
        }
    }

    /// Render the body as it will be written to the socket.
    pub fn into_wire_string(self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Text(text) => text,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

/// Snake-case an outbound body. Only plain JSON objects are rewritten;
/// arrays, scalars, and text bodies go out exactly as given.
pub fn transform_request(payload: Payload) -> Payload {
    match payload {
        Payload::Json(value @ Value::Object(_)) => Payload::Json(to_snake(value)),
        other => other,
    }
}

/// Decode an inbound body. JSON is parsed and camel-cased; a body that does
/// not parse is returned as text rather than treated as an error.
pub fn transform_response(body: String) -> Payload {
    match serde_json::from_str::<Value>(&body) {
        Ok(json) => Payload::Json(to_camel(json)),
        Err(e) => {
            tracing::trace!(error = %e, "response body is not JSON, passing through");
            Payload::Text(body)
        }
    }
}
