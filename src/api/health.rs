use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "endpoints": state.catalog.len(),
        "networks": state.balance_client.registry().list().len(),
    }))
}
