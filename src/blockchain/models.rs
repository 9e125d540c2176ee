// src/blockchain/models.rs
use ethers_core::types::U256;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Native currencies on every supported network use 18 decimals.
pub const NATIVE_DECIMALS: usize = 18;

/// Characters of a bad RPC body kept for diagnostics.
pub const SNIPPET_LEN: usize = 100;

// --- Error types for balance queries ---

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BalanceError {
    #[error("no RPC URL found for network: {0}")]
    UnsupportedNetwork(String),
    #[error("RPC request failed with status: {0}")]
    RpcTransport(u16),
    #[error("invalid JSON response from RPC endpoint: {0}")]
    RpcMalformedResponse(String),
    #[error("RPC error: {0}")]
    RpcProtocol(String),
    #[error("no result in RPC response")]
    RpcEmptyResult,
    #[error("failed to reach RPC endpoint: {0}")]
    RpcUnreachable(String),
}

impl BalanceError {
    pub fn kind(&self) -> &'static str {
        match self {
            BalanceError::UnsupportedNetwork(_) => "UnsupportedNetwork",
            BalanceError::RpcTransport(_) => "RpcTransportError",
            BalanceError::RpcMalformedResponse(_) => "RpcMalformedResponse",
            BalanceError::RpcProtocol(_) => "RpcProtocolError",
            BalanceError::RpcEmptyResult => "RpcEmptyResult",
            BalanceError::RpcUnreachable(_) => "UnknownError",
        }
    }

    /// Whether the caller asked for something invalid, as opposed to an
    /// upstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, BalanceError::UnsupportedNetwork(_))
    }
}

// --- Balance Models ---

/// Native balance in exact minor (wei) and major (ether) units.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub network: String,
    pub symbol: String,
    pub wei: U256,
}

impl Balance {
    /// Decimal string of the major-unit amount, trailing zeros trimmed.
    pub fn major_units(&self) -> String {
        format_units(self.wei, NATIVE_DECIMALS)
    }

    pub fn minor_units(&self) -> String {
        self.wei.to_string()
    }

    /// `1.00 ETH`, `0.123456 AVAX`: 2 to 6 fractional digits.
    pub fn display(&self) -> String {
        format!("{} {}", format_display(&self.major_units()), self.symbol)
    }
}

/// Body of a successful balance proxy response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOutput {
    pub balance: String,
    pub balance_wei: String,
    pub network: String,
    pub symbol: String,
}

impl From<&Balance> for BalanceOutput {
    fn from(balance: &Balance) -> Self {
        Self {
            balance: balance.major_units(),
            balance_wei: balance.minor_units(),
            network: balance.network.clone(),
            symbol: balance.symbol.clone(),
        }
    }
}

// --- Conversions ---

/// Parses an `0x`-prefixed hex quantity. `0x` alone is zero.
pub fn parse_hex_quantity(hex: &str) -> Option<U256> {
    let digits = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X"))?;
    if digits.is_empty() {
        return Some(U256::zero());
    }
    if digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Exact decimal rendering of `amount / 10^decimals`.
pub fn format_units(amount: U256, decimals: usize) -> String {
    let digits = amount.to_string();
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac)
    }
}

/// Pads to at least 2 and cuts to at most 6 fractional digits, no rounding.
pub fn format_display(decimal: &str) -> String {
    let (int_part, frac) = decimal.split_once('.').unwrap_or((decimal, ""));
    let mut frac: String = frac.chars().take(6).collect();
    while frac.len() < 2 {
        frac.push('0');
    }
    format!("{}.{}", int_part, frac)
}

/// First [`SNIPPET_LEN`] characters of a body, with an ellipsis.
pub fn snippet(body: &str) -> String {
    let mut out: String = body.chars().take(SNIPPET_LEN).collect();
    out.push_str("...");
    out
}

/// JSON-RPC `error` member rendered for a message.
pub fn rpc_error_text(error: &Value) -> String {
    error.to_string()
}
