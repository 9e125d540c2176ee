// src/config.rs

use std::collections::HashMap;
use std::env;
use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "https://api.vottun.tech";
pub const DEFAULT_NETWORK: &str = "sepolia";

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub host: [u8; 4],
    pub port: u16,

    /// Base URL of the Vottun REST API
    pub api_base_url: String,

    /// Extra RPC endpoints, network id -> URL. Each one is tried before the
    /// built-in endpoints of that network.
    pub chain_rpc_urls: HashMap<String, String>,
    pub default_network: String,

    // Optional console session seed. Kept in memory only.
    pub api_key: Option<String>,
    pub app_id: Option<String>,
    pub wallet_address: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: 3000,
            api_base_url: DEFAULT_API_URL.to_string(),
            chain_rpc_urls: HashMap::new(),
            default_network: DEFAULT_NETWORK.to_string(),
            api_key: None,
            app_id: None,
            wallet_address: None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_host(value: &str) -> Result<[u8; 4]> {
    let addr: std::net::Ipv4Addr = value
        .parse()
        .with_context(|| format!("HOST must be an IPv4 address, got '{}'", value))?;
    Ok(addr.octets())
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        // CHAIN_RPC_URLS is optional here: the registry already knows every network
        let chain_rpc_urls: HashMap<String, String> = match non_empty_var("CHAIN_RPC_URLS") {
            Some(raw) => serde_json::from_str(&raw)
                .context("CHAIN_RPC_URLS must be a JSON map of network -> RPC URL")?,
            None => HashMap::new(),
        };

        Ok(Config {
            // Server settings
            host: parse_host(&env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            api_base_url: non_empty_var("VOTTUN_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),

            chain_rpc_urls,
            default_network: non_empty_var("DEFAULT_NETWORK")
                .unwrap_or_else(|| DEFAULT_NETWORK.to_string()),

            api_key: non_empty_var("VOTTUN_API_KEY"),
            app_id: non_empty_var("VOTTUN_APP_ID"),
            wallet_address: non_empty_var("WALLET_ADDRESS"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.default_network, "sepolia");
        assert!(config.chain_rpc_urls.is_empty());
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(parse_host("0.0.0.0").unwrap(), [0, 0, 0, 0]);
        assert!(parse_host("localhost").is_err());
    }
}
