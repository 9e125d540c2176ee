//! # API Module
//!
//! HTTP handlers for the Vottun explorer.
//!
//! ## Available Endpoints
//!
//! ### Catalog
//! - `GET /endpoints` - List every catalog endpoint with its fields
//! - `GET /endpoints/categories` - Distinct categories in catalog order
//! - `GET /endpoints/:index` - One catalog endpoint
//!
//! ### Vottun API relay
//! - `POST /request` - Resolve a catalog endpoint and send it with the given credentials
//!
//! ### Balance proxy
//! - `GET /networks` - Supported networks and their RPC candidates
//! - `POST /rpc` - Native balance of an address on a network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::AppState;

pub mod balance;
pub mod catalog;
pub mod health;
pub mod request;

/// Error body returned by every handler: `{ "error": ..., "kind": ... }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }
}

// Malformed JSON, wrong field types and a missing content type all come
// back as 400 with the usual error body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.message, "kind": self.kind })),
        )
            .into_response()
    }
}

/// Routes mounted under `/api`.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/endpoints", get(catalog::list_endpoints_handler))
        .route("/endpoints/categories", get(catalog::list_categories_handler))
        .route("/endpoints/:index", get(catalog::get_endpoint_handler))
        .route("/request", post(request::send_request_handler))
        .route("/networks", get(balance::list_networks_handler))
        .route("/rpc", post(balance::balance_proxy_handler))
}
