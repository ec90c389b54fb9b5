//! Newest-compatible release selection
//!
//! For every IDE build a plugin can run on, pick the newest release whose
//! compatibility window admits that build.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::cache::PluginBuilds;
use crate::catalog::PluginEntry;
use crate::error::Result;
use crate::ide_versions::IdeVersions;
use crate::marketplace::PluginUpdate;
use crate::version::{pick_newest, CompatibilityWindow};

/// Newest release compatible with `build`.
///
/// Releases are visited in order; a release replaces the current pick only
/// when its version is strictly newer, so the first of equal versions wins.
pub fn newest_compatible<'a>(
    build: &str,
    updates: &'a [PluginUpdate],
) -> Result<Option<&'a PluginUpdate>> {
    let mut newest: Option<&PluginUpdate> = None;

    for update in updates {
        let current = newest.map(|u| u.version.as_str());
        if pick_newest(current, Some(&update.version)) == current {
            continue;
        }

        let window = CompatibilityWindow::new(update.since.as_deref(), update.until.as_deref());
        if window.admits(build)? {
            newest = Some(update);
        }
    }

    Ok(newest)
}

/// Everything needed to resolve one plugin
pub struct ResolveRequest<'a> {
    pub plugin: &'a PluginEntry,
    pub updates: &'a [PluginUpdate],
    /// nixpkgs names of the IDEs the plugin supports
    pub compatible: Vec<String>,
    pub ide_versions: &'a IdeVersions,
    /// Builds to resolve regardless of product support
    pub extra_builds: &'a [String],
}

/// Resolve every relevant build of a plugin to a download URL.
///
/// A build that fails to compare is logged and recorded as `null`. Returns
/// `None` when no build resolves to a download.
pub fn resolve_plugin<F>(request: ResolveRequest<'_>, download_url: F) -> Option<PluginBuilds>
where
    F: Fn(&str) -> String,
{
    let ResolveRequest {
        plugin,
        updates,
        compatible,
        ide_versions,
        extra_builds,
    } = request;

    let mut relevant = ide_versions.builds_for(&compatible);
    relevant.extend(extra_builds.iter().cloned());

    let mut builds = BTreeMap::new();
    for build in relevant {
        let url = match newest_compatible(&build, updates) {
            Ok(Some(update)) => Some(download_url(&update.file)),
            Ok(None) => {
                debug!(plugin = plugin.id, build = %build, "no compatible release");
                None
            }
            Err(e) => {
                warn!(
                    plugin = plugin.id,
                    key = %plugin.key,
                    build = %build,
                    "skipping build: {}",
                    e
                );
                None
            }
        };
        builds.insert(build, url);
    }

    let resolved = PluginBuilds {
        compatible,
        builds,
        key: plugin.key.clone(),
        name: plugin.name.clone(),
        slug: plugin.slug.clone(),
    };

    if !resolved.has_downloads() {
        warn!(
            "Could not find any compatible builds for plugin {} [{}]",
            plugin.id, plugin.key
        );
        return None;
    }

    Some(resolved)
}
