//! Endpoint catalog.
//!
//! The catalog is a declarative table (`data/endpoints.json`) embedded at
//! compile time and parsed once at start-up. Field kinds are derived while
//! loading and cached on each [`FieldSpec`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::vottun::{
    fields::{fields_from_template, FieldSpec},
    models::HttpMethod,
    resolver::placeholder_tokens,
};

const ENDPOINTS_JSON: &str = include_str!("../../data/endpoints.json");

/// Token filled from the wallet address when left empty.
pub const ACCOUNT_TOKEN: &str = "account";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEndpoint {
    category: String,
    name: String,
    path: String,
    method: HttpMethod,
    #[serde(default)]
    description: String,
    #[serde(default)]
    default_body: Map<String, Value>,
    #[serde(default)]
    url_params: Option<Map<String, Value>>,
}

/// Static description of one Vottun endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub category: String,
    pub name: String,
    pub path: String,
    pub method: HttpMethod,
    pub description: String,
    pub url_fields: Vec<FieldSpec>,
    pub body_fields: Vec<FieldSpec>,
}

impl EndpointDescriptor {
    pub fn default_body(&self) -> Map<String, Value> {
        self.body_fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect()
    }

    pub fn default_url_params(&self) -> Map<String, Value> {
        self.url_fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect()
    }

    pub fn body_field(&self, name: &str) -> Option<&FieldSpec> {
        self.body_fields.iter().find(|f| f.name == name)
    }

    pub fn url_field(&self, name: &str) -> Option<&FieldSpec> {
        self.url_fields.iter().find(|f| f.name == name)
    }

    pub fn has_url_params(&self) -> bool {
        !self.url_fields.is_empty()
    }
}

impl TryFrom<RawEndpoint> for EndpointDescriptor {
    type Error = anyhow::Error;

    fn try_from(raw: RawEndpoint) -> Result<Self> {
        let url_params = raw.url_params.unwrap_or_default();
        for token in placeholder_tokens(&raw.path) {
            if token != ACCOUNT_TOKEN && !url_params.contains_key(&token) {
                bail!(
                    "endpoint '{}' uses {{{}}} in its path but declares no URL parameter for it",
                    raw.name,
                    token
                );
            }
        }
        Ok(Self {
            category: raw.category,
            name: raw.name,
            path: raw.path,
            method: raw.method,
            description: raw.description,
            url_fields: fields_from_template(&url_params),
            body_fields: fields_from_template(&raw.default_body),
        })
    }
}

/// Ordered, read-only collection of endpoint descriptors.
#[derive(Debug, Clone)]
pub struct Catalog {
    endpoints: Vec<EndpointDescriptor>,
}

impl Catalog {
    /// Loads the built-in Vottun catalog.
    pub fn load() -> Result<Self> {
        Self::from_json(ENDPOINTS_JSON).context("Invalid built-in endpoint catalog")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawEndpoint> =
            serde_json::from_str(json).context("Endpoint catalog must be a JSON array")?;
        let endpoints = raw
            .into_iter()
            .map(EndpointDescriptor::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { endpoints })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EndpointDescriptor> {
        self.endpoints.get(index)
    }

    /// Case-insensitive lookup by display name. Returns the first match.
    pub fn find_by_name(&self, name: &str) -> Option<(usize, &EndpointDescriptor)> {
        self.endpoints
            .iter()
            .enumerate()
            .find(|(_, e)| e.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &EndpointDescriptor)> {
        self.endpoints.iter().enumerate()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for endpoint in &self.endpoints {
            if !seen.contains(&endpoint.category.as_str()) {
                seen.push(&endpoint.category);
            }
        }
        seen
    }

    pub fn in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = (usize, &'a EndpointDescriptor)> + 'a {
        self.iter()
            .filter(move |(_, e)| e.category.eq_ignore_ascii_case(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vottun::fields::FieldKind;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::load().unwrap();
        assert!(catalog.len() >= 50);
        assert_eq!(
            catalog.categories(),
            vec![
                "Core API",
                "IPFS API",
                "ERC-20 API",
                "NFT API",
                "NFT 1155 API",
                "POAP API",
                "Custodied Wallets API"
            ]
        );
    }

    #[test]
    fn test_field_order_and_kinds_preserved() {
        let catalog = Catalog::load().unwrap();
        let (_, deploy) = catalog.find_by_name("Deploy Smart Contract").unwrap();
        let names: Vec<&str> = deploy.body_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["contractSpecsId", "sender", "blockchainNetwork", "gasLimit", "alias", "params"]
        );
        assert_eq!(deploy.body_field("gasLimit").unwrap().kind, FieldKind::Number);
        assert_eq!(deploy.body_field("params").unwrap().kind, FieldKind::Sequence);

        let (_, metadata) = catalog.find_by_name("upload metadata (json)").unwrap();
        assert_eq!(metadata.body_field("data").unwrap().kind, FieldKind::Object);
    }

    #[test]
    fn test_every_path_token_has_an_input() {
        let catalog = Catalog::load().unwrap();
        for (_, endpoint) in catalog.iter() {
            for token in placeholder_tokens(&endpoint.path) {
                assert!(
                    endpoint.url_field(&token).is_some() || token == ACCOUNT_TOKEN,
                    "{} has no input for {}",
                    endpoint.name,
                    token
                );
            }
        }
    }

    #[test]
    fn test_rejects_undeclared_token() {
        let json = r#"[{"category":"X","name":"Bad","path":"/a/{id}","method":"GET"}]"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("{id}"));
    }

    #[test]
    fn test_in_category() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.in_category("POAP API").count(), 4);
    }
}
