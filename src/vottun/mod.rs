// src/vottun/mod.rs

//! Request-building pipeline for the Vottun REST API:
//! catalog -> field kinds -> resolver -> authenticated client.

pub mod catalog;
pub mod client;
pub mod fields;
pub mod models;
pub mod resolver;

pub use catalog::{Catalog, EndpointDescriptor};
pub use client::ApiClient;
pub use models::{Credentials, DispatchError, HttpMethod, ResolveError, ResolvedRequest};
pub use resolver::resolve;
