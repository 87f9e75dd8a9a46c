//! Check the transforms and resource calls against the JSON vectors stored in
//! `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so key order on the
//! wire does not cause false negatives.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gigwalk_core::case::{to_camel_key, to_snake_key};
use gigwalk_core::query::stringify_value;
use gigwalk_core::{
    validate, ApiClient, ApiError, ApiResponse, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

#[test]
fn case_vectors() {
    for case in cases(include_str!("../../test-vectors/case.json")) {
        let camel = case["camel"].as_str().unwrap();
        let snake = case["snake"].as_str().unwrap();

        assert_eq!(to_snake_key(camel), snake, "{camel} to snake");
        assert_eq!(to_snake_key(snake), snake, "{snake} is stable");
        if case["round_trip"].as_bool().unwrap() {
            assert_eq!(to_camel_key(snake), camel, "{snake} back to camel");
        }
    }
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

#[test]
fn query_vectors() {
    for case in cases(include_str!("../../test-vectors/query.json")) {
        let name = case["name"].as_str().unwrap();
        assert_eq!(stringify_value(&case["params"]), case["query"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn validate_vectors() {
    for case in cases(include_str!("../../test-vectors/validate.json")) {
        let name = case["name"].as_str().unwrap();
        let mut data = case["data"].clone();

        let result = validate(&mut data, &case["schema"]).unwrap();

        let errors: Vec<String> = serde_json::from_value(case["errors"].clone()).unwrap();
        let warnings: Vec<String> = serde_json::from_value(case["warnings"].clone()).unwrap();
        assert_eq!(result.errors, errors, "{name}: errors");
        assert_eq!(result.warnings, warnings, "{name}: warnings");
        assert_eq!(result.is_valid(), errors.is_empty(), "{name}: is_valid");
        assert_eq!(data, case["sanitized"], "{name}: sanitized data");
    }
}

// ---------------------------------------------------------------------------
// Resource requests
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Recorder {
    requests: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"{"code":200,"data":[]}"#.to_string(),
        })
    }
}

async fn call(client: &ApiClient, name: &str, params: &Value) -> Result<ApiResponse, ApiError> {
    let tickets = client.tickets();
    match name {
        "search" => tickets.search(params).await,
        "search_filters" => tickets.search_filters(params).await,
        "get" => tickets.get(params).await,
        "get_by_organization" => tickets.get_by_organization(params).await,
        "schedule" => tickets.schedule(params).await,
        "cancel_all" => tickets.cancel_all(params).await,
        "submit" => tickets.submit(params).await,
        "get_events" => tickets.get_events(params).await,
        "create_metadata" => tickets.create_metadata(params).await,
        "withdraw" => tickets.withdraw(params).await,
        other => panic!("no dispatch for {other}"),
    }
}

#[tokio::test]
async fn request_vectors() {
    let recorder = Arc::new(Recorder::default());
    let client = ApiClient::builder()
        .base_url(BASE_URL)
        .transport(recorder.clone())
        .build()
        .unwrap();

    for case in cases(include_str!("../../test-vectors/requests.json")) {
        let name = case["name"].as_str().unwrap();
        call(&client, case["call"].as_str().unwrap(), &case["params"]).await.unwrap();

        let request = recorder.requests.lock().unwrap().pop().unwrap();
        assert_eq!(request.method, parse_method(case["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(request.url, format!("{BASE_URL}{}", case["url"].as_str().unwrap()), "{name}: url");

        let body = request
            .body
            .as_deref()
            .map(|raw| serde_json::from_str::<Value>(raw).unwrap())
            .unwrap_or(Value::Null);
        assert_eq!(body, case["body"], "{name}: body");
    }
}
