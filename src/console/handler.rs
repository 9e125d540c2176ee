//! # Console Handler Module
//!
//! Dispatches console commands against the session and the shared state.
//!
//! ## Supported Methods
//!
//! ### Session
//! - `credentials/set` - Store API key, App ID and optional wallet (memory only)
//! - `credentials/show` - Show what is configured, never the API key itself
//!
//! ### Catalog and forms
//! - `catalog/categories` - Distinct endpoint categories
//! - `catalog/list` - Endpoints, optionally filtered by `category`
//! - `endpoint/select` - Select by `index` or `name`; resets the forms
//! - `form/show` - Current form values of the selected endpoint
//! - `form/set` - Edit one field (`field`, `value`, optional `target`)
//! - `form/reset` - Back to the endpoint defaults
//! - `request/send` - Resolve and dispatch the selected endpoint
//!
//! ### Balances
//! - `networks/list` - Supported networks
//! - `network/select` - Default network for balance checks
//! - `balance/check` - Native balance (`network`/`address` default to the session)

use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    console::{
        protocol::{error_codes, Request, Response},
        session::{FormTarget, Session, SessionError},
    },
    utils::{get_optional_arg, get_required_arg},
    vottun::{
        fields::FieldSpec, models::CredentialsInput, Credentials, DispatchError,
        EndpointDescriptor, HttpMethod,
    },
    AppState,
};

/// Handles one command. Returns the next session and, unless the request was
/// a notification, a response.
pub async fn handle_console_request(
    req: Request,
    state: &AppState,
    session: Session,
) -> (Session, Option<Response>) {
    let id = req.id.clone();
    let notification = req.is_notification();
    let (next, response) = match dispatch(&req, state, &session).await {
        Ok((next, result)) => (next, Response::success(id, result)),
        Err(response) => (session, response),
    };
    if notification {
        (next, None)
    } else {
        (next, Some(response))
    }
}

type Outcome = Result<(Session, Value), Response>;

async fn dispatch(req: &Request, state: &AppState, session: &Session) -> Outcome {
    let args = req.args();
    let id = &req.id;
    match req.method.as_str() {
        "credentials/set" => {
            let input: CredentialsInput = serde_json::from_value(args).map_err(|e| {
                Response::error(id.clone(), error_codes::INVALID_PARAMS, e.to_string())
            })?;
            let next = session.with_credentials(Credentials::from(input));
            let result = credentials_summary(&next.credentials);
            info!("Session credentials updated");
            Ok((next, result))
        }
        "credentials/show" => Ok((session.clone(), credentials_summary(&session.credentials))),
        "catalog/categories" => Ok((session.clone(), json!(state.catalog.categories()))),
        "catalog/list" => {
            let category: Option<String> = get_optional_arg(&args, "category", id)?;
            let entries: Vec<Value> = match category.as_deref() {
                Some(c) => state.catalog.in_category(c).map(summary).collect(),
                None => state.catalog.iter().map(summary).collect(),
            };
            Ok((session.clone(), json!(entries)))
        }
        "endpoint/select" => {
            let index = match get_optional_arg::<usize>(&args, "index", id)? {
                Some(i) => i,
                None => {
                    let name: String = get_required_arg(&args, "name", id)?;
                    state
                        .catalog
                        .find_by_name(&name)
                        .map(|(i, _)| i)
                        .ok_or_else(|| {
                            session_error(id, SessionError::UnknownEndpoint(name.clone()))
                        })?
                }
            };
            let next = session
                .select_endpoint(&state.catalog, index)
                .map_err(|e| session_error(id, e))?;
            let result = form_view(state, &next).map_err(|e| session_error(id, e))?;
            Ok((next, result))
        }
        "form/show" => {
            let result = form_view(state, session).map_err(|e| session_error(id, e))?;
            Ok((session.clone(), result))
        }
        "form/set" => {
            let field: String = get_required_arg(&args, "field", id)?;
            let target = parse_target(&args, id)?;
            let value = args.get("value").cloned().unwrap_or(Value::Null);
            let next = match value {
                Value::String(raw) => session.edit_field(&state.catalog, target, &field, &raw),
                other => session.set_field_value(&state.catalog, target, &field, other),
            }
            .map_err(|e| session_error(id, e))?;
            let result = form_view(state, &next).map_err(|e| session_error(id, e))?;
            Ok((next, result))
        }
        "form/reset" => {
            let next = session
                .reset_form(&state.catalog)
                .map_err(|e| session_error(id, e))?;
            let result = form_view(state, &next).map_err(|e| session_error(id, e))?;
            Ok((next, result))
        }
        "request/send" => {
            let raw_body: Option<String> = get_optional_arg(&args, "rawBody", id)?;
            let resolved = session
                .resolve(&state.catalog, raw_body.as_deref())
                .map_err(|e| session_error(id, e))?;
            let url = state.api_client.url_for(&resolved);
            match state.api_client.dispatch(&resolved, &session.credentials).await {
                Ok(response) => Ok((
                    session.clone(),
                    json!({
                        "request": { "method": resolved.method, "url": url, "body": resolved.body },
                        "response": response,
                    }),
                )),
                Err(e) => {
                    error!("Request to {} failed: {}", url, e);
                    Err(dispatch_error(id, &e))
                }
            }
        }
        "networks/list" => Ok((
            session.clone(),
            json!(state.balance_client.registry().list()),
        )),
        "network/select" => {
            let network: String = get_required_arg(&args, "network", id)?;
            let next = session
                .with_network(state.balance_client.registry(), &network)
                .map_err(|e| session_error(id, e))?;
            let network = next.network.clone();
            Ok((next, json!({ "network": network })))
        }
        "balance/check" => {
            let network: String =
                get_optional_arg(&args, "network", id)?.unwrap_or_else(|| session.network.clone());
            let address = match get_optional_arg::<String>(&args, "address", id)? {
                Some(a) if !a.trim().is_empty() => a.trim().to_string(),
                _ => session
                    .credentials
                    .fallback_address()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        Response::error(
                            id.clone(),
                            error_codes::INVALID_PARAMS,
                            "Enter a wallet address first".to_string(),
                        )
                    })?,
            };
            match state.balance_client.get_balance(&network, &address).await {
                Ok(balance) => Ok((
                    session.clone(),
                    json!({
                        "network": balance.network,
                        "address": address,
                        "balance": balance.major_units(),
                        "balanceWei": balance.minor_units(),
                        "display": balance.display(),
                    }),
                )),
                Err(e) => {
                    error!("Balance check failed: {}", e);
                    Err(session_error(id, SessionError::Network(e)))
                }
            }
        }
        _ => Err(Response::error(
            id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        )),
    }
}

fn parse_target(args: &Value, id: &Value) -> Result<Option<FormTarget>, Response> {
    match get_optional_arg::<String>(args, "target", id)?.as_deref() {
        None => Ok(None),
        Some("url") => Ok(Some(FormTarget::Url)),
        Some("body") | Some("query") => Ok(Some(FormTarget::Body)),
        Some(other) => Err(Response::error(
            id.clone(),
            error_codes::INVALID_PARAMS,
            format!("target must be 'url' or 'body', got '{}'", other),
        )),
    }
}

fn session_error(id: &Value, e: SessionError) -> Response {
    let code = match &e {
        SessionError::Network(n) if !n.is_client_error() => error_codes::UPSTREAM_ERROR,
        _ => error_codes::INVALID_PARAMS,
    };
    Response::error_with_kind(id.clone(), code, e.kind(), e.to_string())
}

fn dispatch_error(id: &Value, e: &DispatchError) -> Response {
    let code = match e {
        DispatchError::IncompleteCredentials => error_codes::INVALID_PARAMS,
        _ => error_codes::UPSTREAM_ERROR,
    };
    Response::error_with_kind(id.clone(), code, e.kind(), e.to_string())
}

fn credentials_summary(credentials: &Credentials) -> Value {
    json!({
        "complete": credentials.is_complete(),
        "appId": credentials.app_id,
        "wallet": credentials.wallet,
    })
}

fn summary((index, endpoint): (usize, &EndpointDescriptor)) -> Value {
    json!({
        "index": index,
        "category": endpoint.category,
        "name": endpoint.name,
        "method": endpoint.method,
        "path": endpoint.path,
    })
}

fn field_view(field: &FieldSpec, value: Option<&Value>) -> Value {
    let value = value.unwrap_or(&field.default);
    json!({
        "name": field.name,
        "label": field.label(),
        "kind": field.kind,
        "value": value,
        "text": field.kind.render(value),
    })
}

fn form_view(state: &AppState, session: &Session) -> Result<Value, SessionError> {
    let endpoint = session
        .selected_endpoint(&state.catalog)
        .ok_or(SessionError::NoEndpointSelected)?;
    let sends_as = if endpoint.method == HttpMethod::Get {
        "query"
    } else {
        "body"
    };
    Ok(json!({
        "endpoint": endpoint.name,
        "description": endpoint.description,
        "method": endpoint.method,
        "path": endpoint.path,
        "url": endpoint
            .url_fields
            .iter()
            .map(|f| field_view(f, session.url_values.get(&f.name)))
            .collect::<Vec<_>>(),
        "body": endpoint
            .body_fields
            .iter()
            .map(|f| field_view(f, session.body_values.get(&f.name)))
            .collect::<Vec<_>>(),
        "sendsAs": sends_as,
        "hasUrlParams": endpoint.has_url_params(),
    }))
}
