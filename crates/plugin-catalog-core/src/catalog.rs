//! Plugin catalog
//!
//! The hand-maintained list of tracked plugins (`data/plugins.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::jsonfile;
use crate::marketplace::PluginDetails;

/// A tracked plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Numeric marketplace id
    pub id: u64,
    /// Plugin XML id
    pub key: String,
    /// Display name
    pub name: String,
    /// Package-friendly name
    pub slug: String,
    /// Download count at the time the plugin was added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
    /// Release channel to track (stable when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl PluginEntry {
    /// Build an entry from marketplace details
    pub fn from_details(details: &PluginDetails, channel: Option<String>) -> Self {
        Self {
            id: details.id,
            key: details.xml_id.clone(),
            name: details.name.clone(),
            slug: slugify(&details.name),
            downloads: details.downloads,
            channel: channel.filter(|c| !c.is_empty()),
        }
    }

    /// Release channel, "" for stable
    pub fn channel(&self) -> &str {
        self.channel.as_deref().unwrap_or("")
    }
}

/// Derive a slug from a display name
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// The `plugins.json` document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginCatalog {
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

impl PluginCatalog {
    /// Load the catalog, sorted by id. A missing file is an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        let mut catalog: Self = jsonfile::read(path)?.unwrap_or_default();
        catalog.sort();
        Ok(catalog)
    }

    /// Save the catalog sorted by id
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.sort();
        jsonfile::write(path, self)
    }

    fn sort(&mut self) {
        self.plugins.sort_by_key(|p| p.id);
    }

    pub fn contains(&self, id: u64) -> bool {
        self.plugins.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: u64) -> Option<&PluginEntry> {
        self.plugins.iter().find(|p| p.id == id)
    }

    /// Add a plugin, rejecting duplicate ids
    pub fn add(&mut self, entry: PluginEntry) -> Result<()> {
        if self.contains(entry.id) {
            return Err(CatalogError::DuplicatePlugin { id: entry.id });
        }
        self.plugins.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
