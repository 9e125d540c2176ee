//! Argument helpers for console commands

use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};
use crate::console::protocol::{error_codes, Response};

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Like [`get_required_arg`], but an absent or `null` argument is `None`.
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<Option<T>, Response> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_required_arg(args, key, req_id).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_arg() {
        let args = json!({ "index": 3, "name": "Get Balance" });
        let index: usize = get_required_arg(&args, "index", &json!(1)).unwrap();
        assert_eq!(index, 3);

        let err = get_required_arg::<String>(&args, "field", &json!(1)).unwrap_err();
        let err = err.error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert!(err.message.contains("'field'"));
    }

    #[test]
    fn test_optional_arg() {
        let args = json!({ "category": null, "index": "three" });
        assert_eq!(get_optional_arg::<String>(&args, "category", &json!(1)).unwrap(), None);
        assert_eq!(get_optional_arg::<String>(&args, "missing", &json!(1)).unwrap(), None);
        assert!(get_optional_arg::<usize>(&args, "index", &json!(1)).is_err());
    }
}
