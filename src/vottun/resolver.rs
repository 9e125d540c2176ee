// src/vottun/resolver.rs

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::vottun::{
    catalog::{EndpointDescriptor, ACCOUNT_TOKEN},
    fields::scalar_text,
    models::{HttpMethod, ResolveError, ResolvedRequest},
};

/// Lists the `{token}` names of a path template in order of appearance.
pub fn placeholder_tokens(path: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                tokens.push(after[..end].to_string());
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    tokens
}

/// Null and the empty string count as "not provided".
fn provided(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(scalar_text(other)),
    }
}

/// Fills every `{token}` of the template in one pass. Values are never
/// scanned again, so braces inside them stay literal.
fn fill_template(template: &str, values: &Map<String, Value>) -> Result<String, ResolveError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let token = &after[..end];
        let value = values
            .get(token)
            .and_then(provided)
            .ok_or_else(|| ResolveError::MissingUrlParameter(token.to_string()))?;
        out.push_str(&rest[..start]);
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Query-string form of a body value.
fn query_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(","),
        other => scalar_text(other),
    }
}

/// Parses raw body text into a JSON object.
pub fn parse_body_text(raw: &str) -> Result<Map<String, Value>, ResolveError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ResolveError::InvalidJsonBody(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(ResolveError::InvalidJsonBody(e.to_string())),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turns a descriptor plus user input into a dispatch-ready request.
///
/// URL overrides fill `{token}` placeholders; `{account}` may also come from
/// the body's `account` field (which is then removed from the body) or from
/// `fallback_address`. Body overrides are laid over the descriptor defaults.
/// GET requests carry their body as query parameters instead.
pub fn resolve(
    descriptor: &EndpointDescriptor,
    url_overrides: &Map<String, Value>,
    body_overrides: &Map<String, Value>,
    fallback_address: Option<&str>,
) -> Result<ResolvedRequest, ResolveError> {
    let mut body = descriptor.default_body();
    for (key, value) in body_overrides {
        body.insert(key.clone(), value.clone());
    }

    let mut filled = Map::new();
    let mut account_from_body = false;
    for token in placeholder_tokens(&descriptor.path) {
        if let Some(value) = url_overrides.get(&token).filter(|v| provided(v).is_some()) {
            filled.insert(token, value.clone());
        } else if token == ACCOUNT_TOKEN {
            if let Some(account) = body.get(ACCOUNT_TOKEN).filter(|v| provided(v).is_some()) {
                filled.insert(token, account.clone());
                account_from_body = true;
            } else if let Some(wallet) = fallback_address.filter(|w| !w.is_empty()) {
                filled.insert(token, Value::String(wallet.to_string()));
            }
        }
    }
    let mut path = fill_template(&descriptor.path, &filled)?;

    if account_from_body {
        body.shift_remove(ACCOUNT_TOKEN);
    }

    if descriptor.method == HttpMethod::Get {
        if !body.is_empty() {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (key, value) in &body {
                query.append_pair(key, &query_value(value));
            }
            path = format!("{}?{}", path, query.finish());
        }
        return Ok(ResolvedRequest {
            method: descriptor.method,
            path,
            body: None,
        });
    }

    // A body emptied by moving `account` into the path is not sent at all.
    let body = if account_from_body && body.is_empty() {
        None
    } else {
        Some(body)
    };
    Ok(ResolvedRequest {
        method: descriptor.method,
        path,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vottun::catalog::Catalog;
    use crate::vottun::fields::FieldSpec;
    use serde_json::json;

    fn descriptor(path: &str, method: HttpMethod, body: Value, url: Value) -> EndpointDescriptor {
        let fields = |v: Value| -> Vec<FieldSpec> {
            v.as_object()
                .map(|m| m.iter().map(|(k, d)| FieldSpec::new(k.clone(), d.clone())).collect())
                .unwrap_or_default()
        };
        EndpointDescriptor {
            category: "Test".into(),
            name: "Test".into(),
            path: path.into(),
            method,
            description: String::new(),
            url_fields: fields(url),
            body_fields: fields(body),
        }
    }

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_placeholder_tokens() {
        assert_eq!(
            placeholder_tokens("/a/{txHash}/b/{id}"),
            vec!["txHash".to_string(), "id".to_string()]
        );
        assert!(placeholder_tokens("/a/b").is_empty());
        assert!(placeholder_tokens("/a/{unterminated").is_empty());
    }

    #[test]
    fn test_substitutes_only_the_token() {
        let d = descriptor(
            "/core/v1/evm/info/transaction/{txHash}/status",
            HttpMethod::Post,
            json!({}),
            json!({"txHash": ""}),
        );
        let resolved = resolve(&d, &map(json!({"txHash": "v"})), &Map::new(), None).unwrap();
        assert_eq!(resolved.path, "/core/v1/evm/info/transaction/v/status");
    }

    #[test]
    fn test_account_falls_back_to_wallet() {
        let d = descriptor("/chain/{account}/balance", HttpMethod::Post, json!({}), json!({"account": ""}));
        let resolved = resolve(&d, &Map::new(), &Map::new(), Some("0xABC")).unwrap();
        assert_eq!(resolved.path, "/chain/0xABC/balance");
    }

    #[test]
    fn test_override_beats_fallback() {
        let d = descriptor("/chain/{account}/balance", HttpMethod::Post, json!({}), json!({"account": ""}));
        let resolved =
            resolve(&d, &map(json!({"account": "0xDEF"})), &Map::new(), Some("0xABC")).unwrap();
        assert_eq!(resolved.path, "/chain/0xDEF/balance");
    }

    #[test]
    fn test_body_account_fills_path_and_is_removed() {
        let d = descriptor("/chain/{account}/balance", HttpMethod::Post, json!({"network": 1}), json!({}));
        let resolved =
            resolve(&d, &Map::new(), &map(json!({"account": "0x123"})), Some("0xABC")).unwrap();
        assert_eq!(resolved.path, "/chain/0x123/balance");
        assert_eq!(resolved.body, Some(map(json!({"network": 1}))));
    }

    #[test]
    fn test_unresolved_token_is_named() {
        let d = descriptor("/wallet/{walletAddress}", HttpMethod::Get, json!({}), json!({"walletAddress": ""}));
        let err = resolve(&d, &Map::new(), &Map::new(), Some("0xABC")).unwrap_err();
        assert_eq!(err, ResolveError::MissingUrlParameter("walletAddress".into()));
        assert!(err.to_string().contains("walletAddress"));
    }

    #[test]
    fn test_braces_in_values_stay_literal() {
        let d = descriptor("/tx/{txHash}/{id}", HttpMethod::Post, json!({}), json!({"txHash": "", "id": ""}));
        let resolved = resolve(&d, &map(json!({"txHash": "{id}", "id": "7"})), &Map::new(), None).unwrap();
        assert_eq!(resolved.path, "/tx/{id}/7");

        let resolved = resolve(&d, &map(json!({"txHash": {"a": 1}, "id": "{abc}"})), &Map::new(), None).unwrap();
        assert_eq!(resolved.path, r#"/tx/{"a":1}/{abc}"#);

        let err = resolve(&d, &map(json!({"txHash": "{abc}"})), &Map::new(), None).unwrap_err();
        assert_eq!(err, ResolveError::MissingUrlParameter("id".into()));
    }

    #[test]
    fn test_body_emptied_by_account_is_not_sent() {
        let d = descriptor("/chain/{account}/nonce", HttpMethod::Post, json!({}), json!({}));
        let resolved = resolve(&d, &Map::new(), &map(json!({"account": "0x123"})), None).unwrap();
        assert_eq!(resolved.path, "/chain/0x123/nonce");
        assert_eq!(resolved.body, None);

        // a wallet fallback leaves an empty body as it was
        let resolved = resolve(&d, &Map::new(), &Map::new(), Some("0xABC")).unwrap();
        assert_eq!(resolved.body, Some(Map::new()));
    }

    #[test]
    fn test_empty_override_is_not_provided() {
        let d = descriptor("/tx/{txHash}", HttpMethod::Get, json!({}), json!({"txHash": ""}));
        let err = resolve(&d, &map(json!({"txHash": ""})), &Map::new(), None).unwrap_err();
        assert_eq!(err, ResolveError::MissingUrlParameter("txHash".into()));
    }

    #[test]
    fn test_get_body_becomes_query() {
        let d = descriptor("/gasprice", HttpMethod::Get, json!({"network": 43113}), json!({}));
        let resolved = resolve(&d, &Map::new(), &map(json!({"extra": "a b"})), None).unwrap();
        assert_eq!(resolved.path, "/gasprice?network=43113&extra=a+b");
        assert_eq!(resolved.body, None);
    }

    #[test]
    fn test_get_without_body_has_no_query() {
        let d = descriptor("/info/chains", HttpMethod::Get, json!({}), json!({}));
        let resolved = resolve(&d, &Map::new(), &Map::new(), None).unwrap();
        assert_eq!(resolved.path, "/info/chains");
        assert_eq!(resolved.body, None);
    }

    #[test]
    fn test_post_overlays_defaults_in_order() {
        let d = descriptor(
            "/erc20/transfer",
            HttpMethod::Post,
            json!({"contractAddress": "", "network": 43113, "amount": 100}),
            json!({}),
        );
        let resolved = resolve(
            &d,
            &Map::new(),
            &map(json!({"amount": 5, "memo": "x"})),
            None,
        )
        .unwrap();
        let body = resolved.body.unwrap();
        let keys: Vec<&str> = body.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["contractAddress", "network", "amount", "memo"]);
        assert_eq!(body["amount"], json!(5));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let catalog = Catalog::load().unwrap();
        let (_, d) = catalog.find_by_name("Get Balance").unwrap();
        let overrides = map(json!({"network": 11155111}));
        let first = resolve(d, &Map::new(), &overrides, Some("0xABC")).unwrap();
        let second = resolve(d, &Map::new(), &overrides, Some("0xABC")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.path, "/core/v1/evm/chain/0xABC/balance?network=11155111");
    }

    #[test]
    fn test_parse_body_text() {
        assert_eq!(parse_body_text("").unwrap(), Map::new());
        assert!(matches!(
            parse_body_text("{\"a\":"),
            Err(ResolveError::InvalidJsonBody(_))
        ));
        assert!(matches!(
            parse_body_text("[1]"),
            Err(ResolveError::InvalidJsonBody(_))
        ));
    }
}
