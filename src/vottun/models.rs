// src/vottun/models.rs
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

// --- Error types ---

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("missing URL parameter: {0}. Fill in every required field")]
    MissingUrlParameter(String),
    #[error("request body is not valid JSON: {0}")]
    InvalidJsonBody(String),
}

impl ResolveError {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::MissingUrlParameter(_) => "MissingUrlParameter",
            ResolveError::InvalidJsonBody(_) => "InvalidJsonBody",
        }
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("incomplete credentials: API Key and App ID are required to call the Vottun API")]
    IncompleteCredentials,
    #[error("authentication error (401): check that your API Key and App ID are correct. Details: {detail}")]
    Authentication { detail: String },
    #[error("permission error (403): you do not have permission to access this resource. Details: {detail}")]
    Permission { detail: String },
    #[error("resource not found (404): the endpoint {path} does not exist. Details: {detail}")]
    NotFound { path: String, detail: String },
    #[error("HTTP error: {status}. Details: {detail}")]
    Http { status: u16, detail: String },
    #[error("request failed: {0}")]
    Unknown(String),
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::IncompleteCredentials => "IncompleteCredentials",
            DispatchError::Authentication { .. } => "AuthenticationError",
            DispatchError::Permission { .. } => "PermissionError",
            DispatchError::NotFound { .. } => "NotFoundError",
            DispatchError::Http { .. } => "HttpError",
            DispatchError::Unknown(_) => "UnknownError",
        }
    }

    /// Upstream status code, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Authentication { .. } => Some(401),
            DispatchError::Permission { .. } => Some(403),
            DispatchError::NotFound { .. } => Some(404),
            DispatchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldEditError {
    #[error("invalid value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },
    #[error("unknown field '{0}' for the selected endpoint")]
    UnknownField(String),
}

impl FieldEditError {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldEditError::InvalidFieldValue { .. } => "InvalidFieldValue",
            FieldEditError::UnknownField(_) => "UnknownField",
        }
    }
}

// --- Request models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully substituted request, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    /// Path plus query string, relative to the API base URL.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
}

/// Vottun credentials. Held in memory only.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: SecretString,
    pub app_id: String,
    pub wallet: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>, wallet: Option<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            app_id: app_id.into(),
            wallet: wallet.filter(|w| !w.trim().is_empty()),
        }
    }

    pub fn empty() -> Self {
        Self::new("", "", None)
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty() && !self.app_id.trim().is_empty()
    }

    /// Wallet address used for `{account}` when nothing else fills it.
    pub fn fallback_address(&self) -> Option<&str> {
        self.wallet.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("wallet", &self.wallet)
            .finish()
    }
}

/// Credentials as they arrive over the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsInput {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default, alias = "walletAddress")]
    pub wallet: Option<String>,
}

impl From<CredentialsInput> for Credentials {
    fn from(input: CredentialsInput) -> Self {
        Credentials::new(input.api_key, input.app_id, input.wallet)
    }
}
