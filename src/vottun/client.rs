//! Authenticated client for the Vottun REST API.

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::vottun::models::{Credentials, DispatchError, ResolvedRequest};

/// Header carrying the Vottun application id.
pub const APP_ID_HEADER: &str = "x-application-vkn";

const NO_DETAIL: &str = "<no error detail>";

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // Validate early so a bad VOTTUN_API_URL fails at start-up.
        url::Url::parse(base_url).with_context(|| format!("Invalid API base URL: {}", base_url))?;
        Ok(Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL a resolved request will be sent to.
    pub fn url_for(&self, request: &ResolvedRequest) -> String {
        format!("{}{}", self.base_url, request.path)
    }

    /// Sends one request with the Vottun auth headers. No retries.
    pub async fn dispatch(
        &self,
        request: &ResolvedRequest,
        credentials: &Credentials,
    ) -> Result<Value, DispatchError> {
        if !credentials.is_complete() {
            return Err(DispatchError::IncompleteCredentials);
        }

        let url = self.url_for(request);
        info!(method = %request.method, %url, "Dispatching Vottun API request");

        let mut builder = self
            .http
            .request(request.method.into(), &url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(credentials.api_key.expose_secret())
            .header(APP_ID_HEADER, credentials.app_id.trim());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DispatchError::Unknown(e.to_string()))?;
        let status = response.status();
        debug!(status = %status, "Vottun API response status");

        if !status.is_success() {
            let detail = error_detail(response.text().await.ok());
            warn!(status = status.as_u16(), path = %request.path, "Vottun API returned an error");
            return Err(classify(status, &request.path, detail));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DispatchError::Unknown(e.to_string()))?;
        Ok(serde_json::from_str::<Value>(&text).unwrap_or_else(|_| {
            warn!("Response is not valid JSON, returning it as text");
            json!({ "text": text })
        }))
    }
}

fn classify(status: StatusCode, path: &str, detail: String) -> DispatchError {
    match status {
        StatusCode::UNAUTHORIZED => DispatchError::Authentication { detail },
        StatusCode::FORBIDDEN => DispatchError::Permission { detail },
        StatusCode::NOT_FOUND => DispatchError::NotFound {
            path: path.to_string(),
            detail,
        },
        other => DispatchError::Http {
            status: other.as_u16(),
            detail,
        },
    }
}

/// Compact JSON if the body parses, else the raw text, else a placeholder.
fn error_detail(body: Option<String>) -> String {
    match body {
        Some(text) if !text.trim().is_empty() => match serde_json::from_str::<Value>(&text) {
            Ok(value) => value.to_string(),
            Err(_) => text,
        },
        _ => NO_DETAIL.to_string(),
    }
}
