//! Resource groups: one method per REST endpoint.
//!
//! # Design
//! A resource borrows the `ApiClient` it was obtained from
//! (`client.tickets()`) and owns nothing else. Every method takes any
//! `Serialize` parameter value, pulls the path parameters out of it, routes
//! the listed query keys through the query serializer, and sends what is
//! left as the body. Parameters are normalized to camelCase first, so
//! callers may pass either convention.

mod authorization;
mod tickets;

pub use authorization::Authorization;
pub use tickets::{TicketAction, Tickets};

use percent_encoding::utf8_percent_encode;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::case::{to_camel, to_snake_key};
use crate::error::ApiError;
use crate::payload::Payload;
use crate::query::{stringify_value, QUERY_ENCODE_SET};
use crate::schema::Schema;

/// Query keys shared by every paginated endpoint.
pub(crate) const PAGE_KEYS: [&str; 4] = ["limit", "offset", "sortField", "sortOrder"];

/// A parameter object being taken apart into path, query, and body.
#[derive(Debug, Default)]
pub(crate) struct Params(Map<String, Value>);

impl Params {
    pub(crate) fn from_serialize<P: Serialize + ?Sized>(params: &P) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
        match to_camel(value) {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(ApiError::Validation("data should be object".to_string())),
        }
    }

    /// Remove `key`, keeping the order of the remaining entries.
    fn take(&mut self, key: &str) -> Option<Value> {
        let mut taken = None;
        self.0.retain(|k, v| {
            if k == key {
                taken = Some(std::mem::take(v));
                false
            } else {
                true
            }
        });
        taken
    }

    /// Remove a required path parameter and render it as a URL segment.
    pub(crate) fn path_param(&mut self, key: &str) -> Result<String, ApiError> {
        match self.take(key) {
            Some(Value::String(s)) => Ok(utf8_percent_encode(&s, QUERY_ENCODE_SET).to_string()),
            Some(Value::Null) | None => Err(ApiError::Validation(format!(
                "data should have required property '{}'",
                to_snake_key(key)
            ))),
            Some(other) => Ok(other.to_string()),
        }
    }

    /// Move `keys` into a query string, in the order given.
    pub(crate) fn split_query(&mut self, keys: &[&str]) -> String {
        let mut query = Map::new();
        for key in keys {
            if let Some(value) = self.take(key) {
                query.insert((*key).to_string(), value);
            }
        }
        stringify_value(&Value::Object(query))
    }

    /// Everything that is left, as a query string.
    pub(crate) fn into_query(self) -> String {
        stringify_value(&Value::Object(self.0))
    }

    pub(crate) fn with_action(mut self, action: &str) -> Self {
        self.0.insert("action".to_string(), Value::String(action.to_string()));
        self
    }

    pub(crate) fn into_body(self) -> Payload {
        Payload::Json(Value::Object(self.0))
    }
}

/// Validate `data` against `schema`, stripping undeclared keys. Warnings are
/// logged; any error rejects the call before it reaches the network.
pub(crate) fn sanitize(schema: &Schema, data: &mut Value) -> Result<(), ApiError> {
    let result = schema.validate(data);
    for warning in &result.warnings {
        warn!(%warning, "parameter removed before sending");
    }
    match result.error_message() {
        Some(message) => Err(ApiError::Validation(message)),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A transport that records requests and answers from a fixed script.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::client::ApiClient;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::transport::Transport;

    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        pub(crate) requests: Mutex<Vec<HttpRequest>>,
        pub(crate) status: u16,
        pub(crate) body: String,
    }

    impl RecordingTransport {
        pub(crate) fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                status,
                body: body.to_string(),
            })
        }

        pub(crate) fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().expect("a request was sent")
        }

        pub(crate) fn count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub(crate) fn last_body(&self) -> serde_json::Value {
            serde_json::from_str(self.last().body.as_deref().expect("request has a body")).unwrap()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: vec![("content-type".into(), "application/json".into())],
                body: self.body.clone(),
            })
        }
    }

    pub(crate) fn client(transport: Arc<RecordingTransport>) -> ApiClient {
        ApiClient::builder()
            .base_url("https://stage-api.app.gigwalk.com")
            .transport(transport)
            .build()
            .unwrap()
    }
}
