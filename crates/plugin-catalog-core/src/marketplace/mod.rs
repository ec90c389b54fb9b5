//! Marketplace Module
//!
//! Access to the plugin marketplace REST API.
//!
//! - `types`: response records
//! - `client`: `MarketplaceApi` trait and its HTTP implementation

pub mod client;
pub mod types;

// Re-exports
pub use client::{MarketplaceApi, MarketplaceClient, DEFAULT_MARKETPLACE_URL};
pub use types::{PluginDetails, PluginUpdate};
