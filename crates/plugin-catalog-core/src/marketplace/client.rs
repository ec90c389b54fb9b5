//! Marketplace HTTP client

use async_trait::async_trait;

use crate::error::Result;
use crate::http;
use crate::marketplace::types::{PluginDetails, PluginUpdate};

/// Default marketplace endpoint
pub const DEFAULT_MARKETPLACE_URL: &str = "https://plugins.jetbrains.com";

/// Read access to the plugin marketplace
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Plugin details by numeric id
    async fn plugin_info(&self, id: u64) -> Result<PluginDetails>;

    /// All releases of a plugin on a release channel ("" is the stable channel)
    async fn plugin_updates(&self, id: u64, channel: &str) -> Result<Vec<PluginUpdate>>;

    /// Product codes the plugin declares support for
    async fn compatible_products(&self, id: u64) -> Result<Vec<String>>;

    /// Absolute download URL for a release file path
    fn download_url(&self, file: &str) -> String;
}

/// `reqwest`-backed marketplace client
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    http: reqwest::Client,
    base_url: String,
}

impl MarketplaceClient {
    /// Create a client for `base_url` (trailing slashes are ignored)
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_client(http::build_client()?, base_url))
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MarketplaceApi for MarketplaceClient {
    async fn plugin_info(&self, id: u64) -> Result<PluginDetails> {
        let url = format!("{}/api/plugins/{}", self.base_url, id);
        http::get_json(&self.http, &url).await
    }

    async fn plugin_updates(&self, id: u64, channel: &str) -> Result<Vec<PluginUpdate>> {
        let url = format!(
            "{}/api/plugins/{}/updates?channel={}",
            self.base_url, id, channel
        );
        http::get_json(&self.http, &url).await
    }

    async fn compatible_products(&self, id: u64) -> Result<Vec<String>> {
        let url = format!("{}/api/plugins/{}/compatible-products", self.base_url, id);
        http::get_json(&self.http, &url).await
    }

    fn download_url(&self, file: &str) -> String {
        format!("{}/files/{}", self.base_url, file)
    }
}
