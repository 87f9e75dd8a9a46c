use std::sync::LazyLock;

use serde_json::{json, Value};

use super::sanitize;
use crate::case::to_snake;
use crate::client::{ApiClient, ApiResponse};
use crate::error::{ApiError, SchemaError};
use crate::payload::Payload;
use crate::schema::Schema;
use crate::types::ForgotPasswordParams;

static FORGOT_PASSWORD: LazyLock<Result<Schema, SchemaError>> = LazyLock::new(|| {
    Schema::compile(json!({
        "type": "object",
        "properties": {
            "email": { "type": "string", "format": "email" }
        },
        "required": ["email"]
    }))
});

static RESET_PASSWORD: LazyLock<Result<Schema, SchemaError>> = LazyLock::new(|| {
    Schema::compile(json!({
        "type": "object",
        "properties": {
            "check_expired": { "type": "boolean" },
            "email": { "type": "string", "format": "email" },
            "password": { "type": "string", "minLength": 1 },
            "token": { "type": "string", "minLength": 1 }
        },
        "required": ["email", "password", "token"],
        "additionalProperties": false
    }))
});

/// Session and password endpoints.
pub struct Authorization<'a> {
    client: &'a ApiClient,
}

impl<'a> Authorization<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The current session.
    pub async fn get(&self) -> Result<ApiResponse, ApiError> {
        self.client.get("/v1/auth").await
    }

    /// Exchange the client's credentials for a session.
    pub async fn create(&self) -> Result<ApiResponse, ApiError> {
        self.client.post("/v1/auth", None).await
    }

    pub async fn forgot_password(&self, params: &ForgotPasswordParams) -> Result<ApiResponse, ApiError> {
        let body = checked(&FORGOT_PASSWORD, params)?;
        self.client.post("/v1/forgot_password", Some(body)).await
    }

    /// Takes [`ResetPasswordParams`](crate::types::ResetPasswordParams) or any map with the same keys. Keys
    /// other than `email`, `password`, `token`, and `check_expired` are
    /// dropped with a warning.
    pub async fn reset_password<P>(&self, params: &P) -> Result<ApiResponse, ApiError>
    where
        P: serde::Serialize + ?Sized,
    {
        let body = checked(&RESET_PASSWORD, params)?;
        self.client.post("/v1/reset_password", Some(body)).await
    }
}

fn checked<P>(schema: &Result<Schema, SchemaError>, params: &P) -> Result<Payload, ApiError>
where
    P: serde::Serialize + ?Sized,
{
    let schema = schema.as_ref().map_err(|e| ApiError::Schema(e.clone()))?;
    let mut data: Value =
        to_snake(serde_json::to_value(params).map_err(|e| ApiError::Serialization(e.to_string()))?);
    sanitize(schema, &mut data)?;
    Ok(Payload::Json(data))
}
