//! Marketplace API records
//!
//! Only the fields the catalog consumes are modelled; everything else in the
//! API responses is ignored.

use serde::{Deserialize, Serialize};

/// Plugin details (`/api/plugins/{id}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDetails {
    /// Numeric marketplace id
    pub id: u64,
    /// Plugin XML id (e.g. "org.rust.lang")
    #[serde(rename = "xmlId")]
    pub xml_id: String,
    /// Display name
    pub name: String,
    /// Download count
    #[serde(default)]
    pub downloads: Option<u64>,
}

/// One published plugin release (`/api/plugins/{id}/updates`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginUpdate {
    /// Release version string
    pub version: String,
    /// Lowest build the release supports (exclusive)
    #[serde(default)]
    pub since: Option<String>,
    /// Highest build the release supports (exclusive)
    #[serde(default)]
    pub until: Option<String>,
    /// Download path relative to `{base}/files/`
    pub file: String,
}

/// Error body returned on non-200 responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}
