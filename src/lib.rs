// src/lib.rs

use std::sync::Arc;

use anyhow::Result;

pub mod api;
pub mod blockchain;
pub mod config;
pub mod console;
pub mod utils;
pub mod vottun;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::Config>,
    /// Endpoint catalog, loaded once at start-up
    pub catalog: Arc<vottun::Catalog>,
    /// Authenticated client for the Vottun REST API
    pub api_client: vottun::ApiClient,
    /// Native balance lookups over the network registry
    pub balance_client: blockchain::BalanceClient,
}

impl AppState {
    /// Builds the state from configuration: loads the catalog, validates the
    /// API base URL and merges configured RPC endpoints into the registry.
    pub fn new(config: config::Config) -> Result<Self> {
        let catalog = vottun::Catalog::load()?;
        let api_client = vottun::ApiClient::new(&config.api_base_url)?;
        let registry =
            blockchain::NetworkRegistry::builtin().with_overrides(&config.chain_rpc_urls);

        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            api_client,
            balance_client: blockchain::BalanceClient::new(Arc::new(registry)),
        })
    }
}
