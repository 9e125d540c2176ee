use crate::{
    blockchain::{
        models::{BalanceError, BalanceOutput},
        networks::NetworkInfo,
    },
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, info};
use validator::Validate;

use super::ApiError;

// Body of POST /rpc. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Deserialize, Validate)]
pub struct BalanceRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "network is required"))]
    pub network: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}

impl From<BalanceError> for ApiError {
    fn from(e: BalanceError) -> Self {
        let status = if e.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        ApiError::new(status, e.kind(), e.to_string())
    }
}

/// Relays an `eth_getBalance` call so browsers avoid CORS on public RPCs.
pub async fn balance_proxy_handler(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<BalanceOutput>, ApiError> {
    let Json(req) = payload?;
    let req = BalanceRequest {
        network: req.network.trim().to_string(),
        address: req.address.trim().to_string(),
    };
    if req.validate().is_err() {
        return Err(ApiError::bad_request("Network and address are required"));
    }

    info!("Fetching balance for {} on {}", req.address, req.network);

    match state.balance_client.get_balance(&req.network, &req.address).await {
        Ok(balance) => {
            info!("Balance for {}: {}", req.address, balance.display());
            Ok(Json(BalanceOutput::from(&balance)))
        }
        Err(e) => {
            error!("Failed to get balance for {}: {}", req.address, e);
            Err(e.into())
        }
    }
}

pub async fn list_networks_handler(State(state): State<AppState>) -> Json<Vec<NetworkInfo>> {
    Json(state.balance_client.registry().list().to_vec())
}
