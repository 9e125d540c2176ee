// src/api/request.rs

use crate::{
    vottun::{
        models::CredentialsInput, resolver::parse_body_text, Credentials, DispatchError,
        ResolveError,
    },
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use super::ApiError;

/// Catalog entry by position or by display name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub endpoint: EndpointRef,
    #[serde(default)]
    pub credentials: CredentialsInput,
    #[serde(default)]
    pub url_params: Map<String, Value>,
    #[serde(default)]
    pub body: Map<String, Value>,
    /// Body as typed JSON text; its keys win over `body`.
    #[serde(default)]
    pub raw_body: Option<String>,
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, e.kind(), e.to_string())
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        let status = match &e {
            DispatchError::IncompleteCredentials => StatusCode::BAD_REQUEST,
            DispatchError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            DispatchError::Permission { .. } => StatusCode::FORBIDDEN,
            DispatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Http { .. } | DispatchError::Unknown(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError::new(status, e.kind(), e.to_string())
    }
}

/// Resolves a catalog endpoint with the caller's input and relays it to Vottun.
pub async fn send_request_handler(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let (index, descriptor) = match &req.endpoint {
        EndpointRef::Index(i) => state.catalog.get(*i).map(|d| (*i, d)),
        EndpointRef::Name(name) => state.catalog.find_by_name(name),
    }
    .ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "UnknownEndpoint",
            format!("Unknown catalog endpoint: {:?}", req.endpoint),
        )
    })?;

    info!("Handling request for endpoint #{} '{}'", index, descriptor.name);

    let mut body_overrides = req.body;
    if let Some(raw) = req.raw_body.as_deref() {
        body_overrides.extend(parse_body_text(raw)?);
    }

    let credentials = Credentials::from(req.credentials);
    let resolved = crate::vottun::resolve(
        descriptor,
        &req.url_params,
        &body_overrides,
        credentials.fallback_address(),
    )?;

    match state.api_client.dispatch(&resolved, &credentials).await {
        Ok(value) => Ok(Json(value)),
        Err(e) => {
            error!("Vottun request '{}' failed: {}", descriptor.name, e);
            Err(e.into())
        }
    }
}
