//! Error types for the API client.
//!
//! # Design
//! `Validation` is produced locally, before anything reaches the transport;
//! its message is every validation error joined by newlines. `Transport`
//! wraps the transport's own failure unchanged. `NotFound` gets a dedicated
//! variant because callers frequently distinguish "the resource does not
//! exist" from "the server returned an unexpected status". All other non-2xx
//! responses land in `Http` with the raw status code and body.

/// Errors returned by `ApiClient` and the resource methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Parameters failed schema validation. The request was never sent.
    #[error("{0}")]
    Validation(String),

    /// The transport failed to complete the round-trip.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response data could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A schema used to check parameters is itself malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Failures reported by a `Transport` implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The transport's own timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// Any other failure while sending or receiving.
    #[error("request failed: {0}")]
    Request(String),

    /// The request queue was closed before this request was admitted.
    #[error("request cancelled before it was sent")]
    Cancelled,
}

/// Malformed schema documents handed to the validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema at {path} must be an object or boolean")]
    NotASchema { path: String },

    #[error("unknown type {name:?} at {path}")]
    UnknownType { path: String, name: String },

    #[error("keyword {keyword:?} at {path} is malformed: {reason}")]
    Malformed {
        path: String,
        keyword: &'static str,
        reason: String,
    },

    #[error("unresolvable $ref {reference:?} at {path}")]
    UnresolvedRef { path: String, reference: String },
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    #[error("base URL {0:?} must start with http:// or https://")]
    UnsupportedScheme(String),

    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid default header {0}")]
    InvalidHeader(String),

    #[error("failed to build HTTP transport: {0}")]
    Transport(String),
}
