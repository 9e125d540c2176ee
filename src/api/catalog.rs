// src/api/catalog.rs

use crate::{vottun::EndpointDescriptor, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct EndpointEntry {
    pub index: usize,
    #[serde(flatten)]
    pub endpoint: EndpointDescriptor,
}

pub async fn list_endpoints_handler(State(state): State<AppState>) -> Json<Vec<EndpointEntry>> {
    Json(
        state
            .catalog
            .iter()
            .map(|(index, endpoint)| EndpointEntry {
                index,
                endpoint: endpoint.clone(),
            })
            .collect(),
    )
}

pub async fn list_categories_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .catalog
            .categories()
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

pub async fn get_endpoint_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<EndpointEntry>, ApiError> {
    state
        .catalog
        .get(index)
        .map(|endpoint| {
            Json(EndpointEntry {
                index,
                endpoint: endpoint.clone(),
            })
        })
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                "UnknownEndpoint",
                format!("No catalog endpoint with index {}", index),
            )
        })
}
