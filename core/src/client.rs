//! The shared HTTP client every resource group sends through.
//!
//! # Design
//! Each call is split the same way: `build_request` turns a method, path,
//! and optional body into an `HttpRequest` (base URL, default headers, the
//! `Authorization` header, snake-cased body), the request goes through the
//! client's single `RequestQueue`, and `parse_response` maps the status and
//! camel-cases the body. Building and parsing are synchronous and pure, so
//! they are tested without any transport at all.
//!
//! The client holds no global state. Configuration is owned per instance and
//! the credentials set by `authenticate` apply to this instance only.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::payload::{transform_request, transform_response, Payload};
use crate::queue::RequestQueue;
use crate::resources::{Authorization, Tickets};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ApiEnvelope, Credentials};

const ACCEPT: &str = "application/json, text/plain, */*";

/// A decoded response: status and headers as received, body already run
/// through the response transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub data: Payload,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        self.data.deserialize()
    }

    /// Deserialize the standard `{ _meta, code, data, ... }` wrapper.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<ApiEnvelope<T>, ApiError> {
        self.data.deserialize()
    }
}

/// Builder for configuring an [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Credentials>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.config.base_url = format!("https://{hostname}");
        self
    }

    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.config.concurrency_limit = limit;
        self
    }

    /// Kept at millisecond resolution. A zero timeout fails `build`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    /// Send through `transport` instead of the default reqwest transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn build(self) -> Result<ApiClient, ConfigError> {
        let client = match self.transport {
            Some(transport) => ApiClient::with_transport(self.config, transport)?,
            None => ApiClient::new(self.config)?,
        };
        if let Some(credentials) = &self.credentials {
            client.authenticate(credentials);
        }
        Ok(client)
    }
}

/// Async client for the REST API.
///
/// ```rust,ignore
/// use gigwalk_core::{ApiClient, Credentials};
///
/// let client = ApiClient::builder().hostname("stage-api.app.gigwalk.com").build()?;
/// client.authenticate(&Credentials::token("7004cf8b"));
/// let tickets = client.tickets().get(&serde_json::json!({ "limit": 10 })).await?;
/// ```
pub struct ApiClient {
    config: ClientConfig,
    queue: RequestQueue,
    auth_header: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Client backed by a `ReqwestTransport` using `config.timeout()`.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout()).map_err(|e| ConfigError::Transport(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        config.validate()?;
        let queue = RequestQueue::new(transport, config.concurrency_limit);
        Ok(Self {
            config,
            queue,
            auth_header: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// Attach `credentials` to every request this client sends from now on.
    pub fn authenticate(&self, credentials: &Credentials) {
        let header = credentials.header_value();
        *self.auth_header.write().unwrap_or_else(PoisonError::into_inner) = Some(header);
    }

    pub fn clear_authentication(&self) {
        *self.auth_header.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.auth_header.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn authorization(&self) -> Authorization<'_> {
        Authorization::new(self)
    }

    pub fn tickets(&self) -> Tickets<'_> {
        Tickets::new(self)
    }

    pub fn build_request(&self, method: HttpMethod, path: &str, body: Option<Payload>) -> HttpRequest {
        let mut headers = vec![("Accept".to_string(), ACCEPT.to_string())];
        headers.extend(self.config.headers.iter().cloned());
        if let Some(auth) = self.authorization_header() {
            headers.push(("Authorization".to_string(), auth));
        }

        let body = body.map(transform_request).map(|payload| {
            let content_type = match payload {
                Payload::Json(_) => "application/json;charset=utf-8",
                Payload::Text(_) => "text/plain;charset=utf-8",
            };
            headers.push(("Content-Type".to_string(), content_type.to_string()));
            payload.into_wire_string()
        });

        HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url.trim_end_matches('/')),
            headers,
            body,
        }
    }

    #[instrument(skip(self, body))]
    pub async fn request(&self, method: HttpMethod, path: &str, body: Option<Payload>) -> Result<ApiResponse, ApiError> {
        let request = self.build_request(method, path, body);
        let response = self.queue.admit(request).await?;
        debug!(status = response.status, "response received");
        parse_response(response)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<Payload>) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Post, path, body).await
    }

    pub async fn put(&self, path: &str, body: Option<Payload>) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Put, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Delete, path, None).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("queue", &self.queue)
            .field("authenticated", &self.authorization_header().is_some())
            .finish()
    }
}

/// Map non-success statuses to errors and decode the body of the rest.
pub fn parse_response(response: HttpResponse) -> Result<ApiResponse, ApiError> {
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            body: response.body,
        });
    }
    Ok(ApiResponse {
        status: response.status,
        headers: response.headers,
        data: transform_response(response.body),
    })
}
