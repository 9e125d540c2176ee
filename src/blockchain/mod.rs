// src/blockchain/mod.rs

// Balance client over the network registry
pub mod client;
pub use client::BalanceClient;

pub mod models;
pub mod networks;
pub mod services;

pub use networks::NetworkRegistry;
