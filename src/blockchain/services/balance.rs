use crate::blockchain::models::{parse_hex_quantity, rpc_error_text, snippet, BalanceError};
use ethers_core::types::U256;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

/// Builds the `eth_getBalance` JSON-RPC payload for the latest block.
pub fn balance_request(address: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "eth_getBalance",
        "params": [address, "latest"],
        "id": 1
    })
}

/// Queries one RPC endpoint for a native balance in wei.
pub async fn get_balance(client: &Client, rpc_url: &str, address: &str) -> Result<U256, BalanceError> {
    let res = client
        .post(rpc_url)
        .json(&balance_request(address))
        .send()
        .await
        .map_err(|e| BalanceError::RpcUnreachable(e.to_string()))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .map_err(|e| BalanceError::RpcUnreachable(e.to_string()))?;
    debug!(%rpc_url, status = %status, "RPC response: {}", text);

    if !status.is_success() {
        error!("RPC request failed with status {}: {}", status, text);
        return Err(BalanceError::RpcTransport(status.as_u16()));
    }

    parse_balance_response(&text)
}

/// Classifies a raw JSON-RPC response body.
pub fn parse_balance_response(text: &str) -> Result<U256, BalanceError> {
    let body: Value = serde_json::from_str(text)
        .map_err(|_| BalanceError::RpcMalformedResponse(snippet(text)))?;

    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        return Err(BalanceError::RpcProtocol(rpc_error_text(err)));
    }

    let result = match body.get("result") {
        None | Some(Value::Null) => return Err(BalanceError::RpcEmptyResult),
        Some(Value::String(s)) if s.is_empty() => return Err(BalanceError::RpcEmptyResult),
        Some(result) => result,
    };

    result
        .as_str()
        .and_then(parse_hex_quantity)
        .ok_or_else(|| BalanceError::RpcMalformedResponse(snippet(text)))
}
