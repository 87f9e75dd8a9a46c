//! Async client core for the Gigwalk REST API.
//!
//! # Overview
//! Every endpoint method shapes its parameters into an `HttpRequest`
//! (path templating, query serialization, snake_case body), passes it
//! through a concurrency-limited `RequestQueue`, and hands it to an injected
//! `Transport`. Responses are camel-cased on the way back.
//!
//! # Design
//! - The network is behind the `Transport` trait. `ReqwestTransport` is the
//!   default; tests inject recording or gated transports.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`),
//!   so building and parsing are tested without I/O.
//! - `ApiClient` owns its configuration and credentials. Two clients never
//!   share mutable state.
//! - Parameters can be checked against a JSON Schema before sending
//!   (`schema`); undeclared keys are stripped with a warning.

pub mod case;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod payload;
pub mod query;
pub mod queue;
pub mod resources;
pub mod schema;
pub mod transport;
pub mod types;

pub use case::{to_camel, to_snake, NamingConvention};
pub use client::{ApiClient, ApiClientBuilder, ApiResponse};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, SchemaError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use payload::{transform_request, transform_response, Payload};
pub use query::stringify_query;
pub use queue::RequestQueue;
pub use resources::{Authorization, TicketAction, Tickets};
pub use schema::{validate, Schema, ValidationResult};
pub use transport::{ReqwestTransport, Transport};
pub use types::{ApiEnvelope, Credentials, ForgotPasswordParams, PageQuery, ResetPasswordParams, SearchTicketsParams};
