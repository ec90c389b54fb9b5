//! Generated plugin data (`data/cache/plugins-latest.json`)
//!
//! Holds, per plugin, the download URL chosen for each IDE build, and the
//! hash of every referenced file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::jsonfile;

/// Resolved builds of one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginBuilds {
    /// nixpkgs names of the IDEs the plugin supports
    pub compatible: Vec<String>,
    /// IDE build -> download URL, `null` when no release fits
    pub builds: BTreeMap<String, Option<String>>,
    pub key: String,
    pub name: String,
    pub slug: String,
}

impl PluginBuilds {
    /// Whether at least one build resolved to a download
    pub fn has_downloads(&self) -> bool {
        self.builds.values().any(Option::is_some)
    }
}

/// The `plugins-latest.json` document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginsLatest {
    /// Plugin id -> resolved builds, ascending by id
    #[serde(default)]
    pub plugins: BTreeMap<u64, PluginBuilds>,
    /// Download URL -> hash
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl PluginsLatest {
    /// Load previous results. A missing file yields empty results.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(jsonfile::read(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        jsonfile::write(path, self)
    }

    /// Replace plugins present in `fresh`; others keep their previous data
    pub fn merge_plugins(&mut self, fresh: BTreeMap<u64, PluginBuilds>) {
        self.plugins.extend(fresh);
    }

    /// Point every build that uses one of `urls` at no download
    pub fn unlink_files(&mut self, urls: &BTreeSet<String>) -> usize {
        let mut unlinked = 0;
        for url in self
            .plugins
            .values_mut()
            .flat_map(|p| p.builds.values_mut())
        {
            if url.as_ref().is_some_and(|u| urls.contains(u)) {
                *url = None;
                unlinked += 1;
            }
        }
        unlinked
    }

    /// Distinct download URLs referenced by any plugin
    pub fn file_urls(&self) -> BTreeSet<String> {
        self.plugins
            .values()
            .flat_map(|p| p.builds.values())
            .flatten()
            .cloned()
            .collect()
    }
}

/// Download URLs that appeared or disappeared between two runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl FileDiff {
    pub fn between<'a, O, N>(old: O, new: N) -> Self
    where
        O: IntoIterator<Item = &'a String>,
        N: IntoIterator<Item = &'a String>,
    {
        let old: BTreeSet<&String> = old.into_iter().collect();
        let new: BTreeSet<&String> = new.into_iter().collect();

        Self {
            added: new.difference(&old).map(|s| s.to_string()).collect(),
            removed: old.difference(&new).map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
