// src/blockchain/networks.rs

use serde::Serialize;
use std::collections::HashMap;

/// Symbol used for networks added through configuration only.
pub const DEFAULT_SYMBOL: &str = "ETH";

/// Built-in networks: id, native currency symbol, candidate RPC endpoints in
/// the order they are tried.
const BUILTIN_NETWORKS: &[(&str, &str, &[&str])] = &[
    ("sepolia", "ETH", &[
        "https://ethereum-sepolia.publicnode.com",
        "https://eth-sepolia.public.blastapi.io",
    ]),
    ("goerli", "ETH", &[
        "https://ethereum-goerli.publicnode.com",
        "https://eth-goerli.public.blastapi.io",
    ]),
    ("amoy", "MATIC", &[
        "https://rpc.ankr.com/polygon_amoy",
        "https://polygon-amoy-rpc.publicnode.com",
        "https://ethereum-amoy.publicnode.com",
    ]),
    ("base-sepolia", "ETH", &[
        "https://base-sepolia.publicnode.com",
        "https://sepolia.base.org",
    ]),
    ("base-mainnet", "ETH", &[
        "https://base.publicnode.com",
        "https://mainnet.base.org",
    ]),
    ("optimism-sepolia", "ETH", &[
        "https://optimism-sepolia.publicnode.com",
        "https://sepolia.optimism.io",
    ]),
    ("optimism-mainnet", "ETH", &[
        "https://optimism.publicnode.com",
        "https://mainnet.optimism.io",
    ]),
    ("arbitrum-sepolia", "ETH", &[
        "https://arbitrum-sepolia.publicnode.com",
        "https://sepolia-rollup.arbitrum.io/rpc",
    ]),
    ("arbitrum-mainnet", "ETH", &[
        "https://arbitrum-one.publicnode.com",
        "https://arb1.arbitrum.io/rpc",
    ]),
    ("polygon-mumbai", "MATIC", &[
        "https://polygon-mumbai.publicnode.com",
        "https://polygon-mumbai.blockpi.network/v1/rpc/public",
    ]),
    ("polygon-mainnet", "MATIC", &[
        "https://polygon.publicnode.com",
        "https://polygon-rpc.com",
    ]),
    ("avalanche-fuji", "AVAX", &[
        "https://avalanche-fuji-c-chain.publicnode.com",
        "https://api.avax-test.network/ext/bc/C/rpc",
    ]),
    ("avalanche-mainnet", "AVAX", &[
        "https://avalanche-c-chain.publicnode.com",
        "https://api.avax.network/ext/bc/C/rpc",
    ]),
    ("fantom-testnet", "FTM", &[
        "https://fantom-testnet.publicnode.com",
        "https://rpc.testnet.fantom.network",
    ]),
    ("fantom-mainnet", "FTM", &[
        "https://fantom.publicnode.com",
        "https://rpc.ftm.tools",
    ]),
    ("bsc-testnet", "BNB", &[
        "https://bsc-testnet.publicnode.com",
        "https://data-seed-prebsc-1-s1.binance.org:8545",
    ]),
    ("bsc-mainnet", "BNB", &[
        "https://bsc.publicnode.com",
        "https://bsc-dataseed.binance.org",
    ]),
    ("gnosis-chiado", "xDAI", &[
        "https://gnosis-chiado.publicnode.com",
        "https://rpc.chiadochain.net",
    ]),
    ("gnosis-mainnet", "xDAI", &[
        "https://gnosis.publicnode.com",
        "https://rpc.gnosischain.com",
    ]),
    ("celo-alfajores", "CELO", &[
        "https://celo-alfajores.publicnode.com",
        "https://alfajores-forno.celo-testnet.org",
    ]),
    ("celo-mainnet", "CELO", &[
        "https://celo.publicnode.com",
        "https://forno.celo.org",
    ]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub network: String,
    pub symbol: String,
    pub rpc_urls: Vec<String>,
}

/// Read-only mapping from network id to its RPC candidates.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<NetworkInfo>,
}

impl NetworkRegistry {
    pub fn builtin() -> Self {
        let networks = BUILTIN_NETWORKS
            .iter()
            .map(|(network, symbol, urls)| NetworkInfo {
                network: network.to_string(),
                symbol: symbol.to_string(),
                rpc_urls: urls.iter().map(|u| u.to_string()).collect(),
            })
            .collect();
        Self { networks }
    }

    pub fn from_networks(networks: Vec<NetworkInfo>) -> Self {
        Self { networks }
    }

    /// Puts configured endpoints ahead of the built-in ones. Unknown network
    /// ids become new entries.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        let mut keys: Vec<&String> = overrides.keys().collect();
        keys.sort();
        for key in keys {
            let url = overrides[key].clone();
            let id = normalize_network(key);
            match self.networks.iter_mut().find(|n| n.network == id) {
                Some(info) => {
                    info.rpc_urls.retain(|u| u != &url);
                    info.rpc_urls.insert(0, url);
                }
                None => self.networks.push(NetworkInfo {
                    network: id,
                    symbol: DEFAULT_SYMBOL.to_string(),
                    rpc_urls: vec![url],
                }),
            }
        }
        self
    }

    pub fn get(&self, network: &str) -> Option<&NetworkInfo> {
        let id = normalize_network(network);
        self.networks.iter().find(|n| n.network == id)
    }

    pub fn list(&self) -> &[NetworkInfo] {
        &self.networks
    }
}

/// Lower-cases and turns spaces/underscores into dashes.
pub fn normalize_network(input: &str) -> String {
    let mut s = input.trim().to_lowercase();
    s = s.replace([' ', '_'], "-");
    while s.contains("--") {
        s = s.replace("--", "-");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(registry.list().len(), 21);
        assert_eq!(registry.get("amoy").unwrap().rpc_urls.len(), 3);
        assert_eq!(registry.get("avalanche-fuji").unwrap().symbol, "AVAX");
        assert!(registry.get("Base_Sepolia").is_some());
        assert!(registry.get("dogechain").is_none());
    }

    #[test]
    fn test_every_network_has_a_candidate() {
        for info in NetworkRegistry::builtin().list() {
            assert!(!info.rpc_urls.is_empty(), "{} has no RPC URL", info.network);
        }
    }

    #[test]
    fn test_overrides_go_first() {
        let mut overrides = HashMap::new();
        overrides.insert("sepolia".to_string(), "http://localhost:8545".to_string());
        overrides.insert("local".to_string(), "http://localhost:9545".to_string());
        let registry = NetworkRegistry::builtin().with_overrides(&overrides);

        let sepolia = registry.get("sepolia").unwrap();
        assert_eq!(sepolia.rpc_urls[0], "http://localhost:8545");
        assert_eq!(sepolia.rpc_urls.len(), 3);

        let local = registry.get("local").unwrap();
        assert_eq!(local.symbol, DEFAULT_SYMBOL);
        assert_eq!(local.rpc_urls, vec!["http://localhost:9545".to_string()]);
    }
}
