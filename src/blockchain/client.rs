//! Native balance lookups across the supported EVM networks.
//!
//! Every network carries an ordered list of candidate RPC endpoints; the
//! client tries them in turn and returns the first balance it gets.

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::blockchain::{
    models::{Balance, BalanceError},
    networks::{NetworkInfo, NetworkRegistry},
    services::balance,
};

#[derive(Clone)]
pub struct BalanceClient {
    http: Client,
    registry: Arc<NetworkRegistry>,
}

impl BalanceClient {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        Self {
            http: Client::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    fn network(&self, network: &str) -> Result<&NetworkInfo, BalanceError> {
        self.registry
            .get(network)
            .ok_or_else(|| BalanceError::UnsupportedNetwork(network.to_string()))
    }

    /// Native balance of `address` on `network`.
    pub async fn get_balance(&self, network: &str, address: &str) -> Result<Balance, BalanceError> {
        let info = self.network(network)?;
        info!(network = %info.network, %address, "Fetching native balance");

        let mut last_error = BalanceError::UnsupportedNetwork(network.to_string());
        for (attempt, rpc_url) in info.rpc_urls.iter().enumerate() {
            match balance::get_balance(&self.http, rpc_url, address).await {
                Ok(wei) => {
                    info!(network = %info.network, %rpc_url, %wei, "Balance fetched");
                    return Ok(Balance {
                        network: info.network.clone(),
                        symbol: info.symbol.clone(),
                        wei,
                    });
                }
                Err(e) => {
                    warn!(
                        network = %info.network,
                        %rpc_url,
                        attempt = attempt + 1,
                        candidates = info.rpc_urls.len(),
                        "RPC candidate failed: {}",
                        e
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}
