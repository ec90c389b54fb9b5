//! Shared HTTP helpers
//!
//! Thin wrappers over `reqwest` that turn non-200 responses into
//! `CatalogError::Api`. No retries.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{CatalogError, Result};
use crate::marketplace::types::ApiMessage;

const USER_AGENT: &str = concat!("plugin-catalog/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the HTTP client shared by all fetchers
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| CatalogError::http("<client>", e))
}

/// GET `url` and return the body, failing on any status other than 200
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    tracing::trace!(url, "GET");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CatalogError::http(url, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CatalogError::http(url, e))?;

    if status != StatusCode::OK {
        return Err(CatalogError::Api {
            url: url.to_string(),
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(body)
}

/// GET `url` and decode the JSON body
pub async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> Result<T> {
    let body = get_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| CatalogError::json(url, e))
}

/// Prefer the API's `message` field, fall back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| body.trim().to_string())
}
