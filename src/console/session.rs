//! Console session state.
//!
//! A [`Session`] is never mutated in place: every transition takes `&self`
//! and returns a new session, or an error while the caller keeps the old one.
//! A rejected field edit therefore leaves the previous value untouched.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    blockchain::{models::BalanceError, NetworkRegistry},
    config::Config,
    vottun::{
        fields::{FieldKind, FieldSpec},
        models::FieldEditError,
        resolver::{parse_body_text, resolve},
        Catalog, Credentials, EndpointDescriptor, ResolveError, ResolvedRequest,
    },
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("select an endpoint first")]
    NoEndpointSelected,
    #[error("unknown catalog endpoint: {0}")]
    UnknownEndpoint(String),
    #[error(transparent)]
    Field(#[from] FieldEditError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Network(#[from] BalanceError),
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::NoEndpointSelected => "NoEndpointSelected",
            SessionError::UnknownEndpoint(_) => "UnknownEndpoint",
            SessionError::Field(e) => e.kind(),
            SessionError::Resolve(e) => e.kind(),
            SessionError::Network(e) => e.kind(),
        }
    }
}

/// Which form a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Url,
    Body,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub credentials: Credentials,
    pub selected: Option<usize>,
    pub url_values: Map<String, Value>,
    pub body_values: Map<String, Value>,
    pub network: String,
}

impl Session {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::empty(),
            selected: None,
            url_values: Map::new(),
            body_values: Map::new(),
            network: network.into(),
        }
    }

    /// Session seeded from optional environment credentials.
    pub fn from_config(config: &Config) -> Self {
        let session = Self::new(config.default_network.clone());
        session.with_credentials(Credentials::new(
            config.api_key.clone().unwrap_or_default(),
            config.app_id.clone().unwrap_or_default(),
            config.wallet_address.clone(),
        ))
    }

    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            credentials,
            ..self.clone()
        }
    }

    pub fn selected_endpoint<'a>(&self, catalog: &'a Catalog) -> Option<&'a EndpointDescriptor> {
        self.selected.and_then(|i| catalog.get(i))
    }

    fn require_endpoint<'a>(&self, catalog: &'a Catalog) -> Result<&'a EndpointDescriptor, SessionError> {
        self.selected_endpoint(catalog)
            .ok_or(SessionError::NoEndpointSelected)
    }

    /// Selects an endpoint and resets both forms to its defaults.
    pub fn select_endpoint(&self, catalog: &Catalog, index: usize) -> Result<Self, SessionError> {
        let endpoint = catalog
            .get(index)
            .ok_or_else(|| SessionError::UnknownEndpoint(index.to_string()))?;
        Ok(Self {
            selected: Some(index),
            url_values: endpoint.default_url_params(),
            body_values: endpoint.default_body(),
            ..self.clone()
        })
    }

    pub fn reset_form(&self, catalog: &Catalog) -> Result<Self, SessionError> {
        let index = self.selected.ok_or(SessionError::NoEndpointSelected)?;
        self.select_endpoint(catalog, index)
    }

    /// Finds a field by name. Without an explicit target the body form is
    /// searched first, then the URL form.
    pub fn locate_field<'a>(
        &self,
        catalog: &'a Catalog,
        target: Option<FormTarget>,
        name: &str,
    ) -> Result<(FormTarget, &'a FieldSpec), SessionError> {
        let endpoint = self.require_endpoint(catalog)?;
        let in_body = || endpoint.body_field(name).map(|f| (FormTarget::Body, f));
        let in_url = || endpoint.url_field(name).map(|f| (FormTarget::Url, f));
        let found = match target {
            Some(FormTarget::Body) => in_body(),
            Some(FormTarget::Url) => in_url(),
            None => in_body().or_else(in_url),
        };
        found.ok_or_else(|| FieldEditError::UnknownField(name.to_string()).into())
    }

    /// Applies typed text to a field, parsed according to the field's kind.
    pub fn edit_field(
        &self,
        catalog: &Catalog,
        target: Option<FormTarget>,
        name: &str,
        raw: &str,
    ) -> Result<Self, SessionError> {
        let (target, field) = self.locate_field(catalog, target, name)?;
        let value = field.kind.parse(&field.name, raw)?;
        Ok(self.with_value(target, &field.name, value))
    }

    /// Sets an already-typed JSON value. The value must match the field's
    /// kind; object fields accept any JSON.
    pub fn set_field_value(
        &self,
        catalog: &Catalog,
        target: Option<FormTarget>,
        name: &str,
        value: Value,
    ) -> Result<Self, SessionError> {
        let (target, field) = self.locate_field(catalog, target, name)?;
        if field.kind != FieldKind::Object && FieldKind::of(&value) != field.kind {
            return Err(FieldEditError::InvalidFieldValue {
                field: field.name.clone(),
                reason: format!("expected a {:?} value", field.kind).to_lowercase(),
            }
            .into());
        }
        Ok(self.with_value(target, &field.name, value))
    }

    fn with_value(&self, target: FormTarget, name: &str, value: Value) -> Self {
        let mut next = self.clone();
        let form = match target {
            FormTarget::Url => &mut next.url_values,
            FormTarget::Body => &mut next.body_values,
        };
        form.insert(name.to_string(), value);
        next
    }

    pub fn with_network(&self, registry: &NetworkRegistry, network: &str) -> Result<Self, SessionError> {
        let info = registry
            .get(network)
            .ok_or_else(|| BalanceError::UnsupportedNetwork(network.to_string()))?;
        Ok(Self {
            network: info.network.clone(),
            ..self.clone()
        })
    }

    /// Builds the request for the selected endpoint from the current forms.
    /// `raw_body`, when given, is laid over the body form.
    pub fn resolve(&self, catalog: &Catalog, raw_body: Option<&str>) -> Result<ResolvedRequest, SessionError> {
        let endpoint = self.require_endpoint(catalog)?;
        let mut body = self.body_values.clone();
        if let Some(raw) = raw_body {
            body.extend(parse_body_text(raw)?);
        }
        Ok(resolve(
            endpoint,
            &self.url_values,
            &body,
            self.credentials.fallback_address(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::load().unwrap()
    }

    fn select(catalog: &Catalog, name: &str) -> Session {
        let (index, _) = catalog.find_by_name(name).unwrap();
        Session::new("sepolia").select_endpoint(catalog, index).unwrap()
    }

    #[test]
    fn test_select_loads_defaults() {
        let catalog = catalog();
        let session = select(&catalog, "Native Crypto Transfer");
        assert_eq!(session.body_values["gasLimit"], json!(21000));
        assert!(session.url_values.is_empty());
    }

    #[test]
    fn test_edit_does_not_touch_original() {
        let catalog = catalog();
        let before = select(&catalog, "Native Crypto Transfer");
        let after = before.edit_field(&catalog, None, "value", "42").unwrap();
        assert_eq!(before.body_values["value"], json!(0));
        assert_eq!(after.body_values["value"], json!(42));
    }

    #[test]
    fn test_invalid_object_edit_keeps_previous_value() {
        let catalog = catalog();
        let session = select(&catalog, "Upload Metadata (JSON)");
        let session = session
            .edit_field(&catalog, None, "data", r#"{"creator": "alice"}"#)
            .unwrap();

        let err = session
            .edit_field(&catalog, None, "data", r#"{"creator": "#)
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidFieldValue");
        assert_eq!(session.body_values["data"], json!({"creator": "alice"}));
    }

    #[test]
    fn test_sequence_edit() {
        let catalog = catalog();
        let session = select(&catalog, "Mint Batch ERC-1155")
            .edit_field(&catalog, None, "ids", "4, 5,6")
            .unwrap();
        assert_eq!(session.body_values["ids"], json!(["4", "5", "6"]));
    }

    #[test]
    fn test_url_field_and_resolve() {
        let catalog = catalog();
        let session = select(&catalog, "Get Transaction Info")
            .edit_field(&catalog, Some(FormTarget::Url), "txHash", "0xfeed")
            .unwrap();
        let resolved = session.resolve(&catalog, None).unwrap();
        assert_eq!(resolved.path, "/core/v1/evm/info/transaction/0xfeed?network=43113");
    }

    #[test]
    fn test_resolve_uses_wallet_for_account() {
        let catalog = catalog();
        let session = select(&catalog, "Get Balance")
            .with_credentials(Credentials::new("k", "a", Some("0xABC".into())));
        let resolved = session.resolve(&catalog, None).unwrap();
        assert_eq!(resolved.path, "/core/v1/evm/chain/0xABC/balance?network=43113");
    }

    #[test]
    fn test_resolve_requires_selection() {
        let err = Session::new("sepolia").resolve(&catalog(), None).unwrap_err();
        assert_eq!(err, SessionError::NoEndpointSelected);
    }

    #[test]
    fn test_raw_body_must_be_json() {
        let catalog = catalog();
        let session = select(&catalog, "Get ERC-20 Name");
        let err = session.resolve(&catalog, Some("{not json")).unwrap_err();
        assert_eq!(err.kind(), "InvalidJsonBody");

        let resolved = session
            .resolve(&catalog, Some(r#"{"contractAddress": "0x1"}"#))
            .unwrap();
        assert_eq!(resolved.body.unwrap()["contractAddress"], json!("0x1"));
    }

    #[test]
    fn test_set_field_value_checks_kind() {
        let catalog = catalog();
        let session = select(&catalog, "Set Approval For All ERC-721");
        assert!(session
            .set_field_value(&catalog, None, "approved", json!(false))
            .is_ok());
        assert!(session
            .set_field_value(&catalog, None, "approved", json!("nope"))
            .is_err());
    }

    #[test]
    fn test_unknown_field_and_network() {
        let catalog = catalog();
        let session = select(&catalog, "Get Gas Price");
        let err = session.edit_field(&catalog, None, "nope", "1").unwrap_err();
        assert_eq!(err.kind(), "UnknownField");

        let registry = NetworkRegistry::builtin();
        let err = session.with_network(&registry, "dogechain").unwrap_err();
        assert_eq!(err.kind(), "UnsupportedNetwork");
        assert_eq!(session.with_network(&registry, "BSC_Testnet").unwrap().network, "bsc-testnet");
    }
}
