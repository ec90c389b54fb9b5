//! Catalog update pipeline
//!
//! Ties the marketplace, the IDE build list, the resolver and the hasher
//! together. Plugins are processed in chunks and progress is written after
//! every chunk, so an interrupted run loses at most one chunk of work.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{FileDiff, PluginBuilds, PluginsLatest};
use crate::catalog::{PluginCatalog, PluginEntry};
use crate::config::{CatalogPaths, Config};
use crate::error::{CatalogError, Result};
use crate::hasher::FileHasher;
use crate::ide_versions::{fetch_upstream, FlakeLock, IdeVersions};
use crate::marketplace::{MarketplaceApi, PluginUpdate};
use crate::pool::run_bounded;
use crate::products::friendly_names;
use crate::resolver::{resolve_plugin, ResolveRequest};

/// Options for a plugin update run
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Ignore previously collected hashes and hash every file again
    pub refetch_all: bool,
    /// Additional builds to resolve for every plugin
    pub extra_builds: Vec<String>,
}

/// Outcome of a plugin update run
#[derive(Debug, Clone, Default)]
pub struct UpdateSummary {
    /// Plugins in the catalog
    pub plugins: usize,
    /// Chunks processed
    pub chunks: usize,
    /// Plugins resolved to at least one download
    pub resolved: usize,
    /// Plugins skipped (fetch failures or no compatible release)
    pub unresolved: usize,
    /// Files hashed in this run
    pub hashed: usize,
    /// Files whose hashing failed
    pub hash_failures: usize,
    /// Files added/removed compared to the previous run
    pub diff: FileDiff,
}

/// Outcome of adding plugins to the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddSummary {
    pub added: Vec<u64>,
    pub already_present: Vec<u64>,
    pub failed: Vec<u64>,
}

/// Runs catalog maintenance against a marketplace and a hasher
pub struct Updater {
    api: Arc<dyn MarketplaceApi>,
    hasher: Arc<dyn FileHasher>,
    paths: CatalogPaths,
    concurrency: usize,
    chunk_size: usize,
}

impl Updater {
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        hasher: Arc<dyn FileHasher>,
        paths: CatalogPaths,
        config: &Config,
    ) -> Self {
        Self {
            api,
            hasher,
            paths,
            concurrency: config.update.concurrency.max(1),
            chunk_size: config.update.chunk_size.max(1),
        }
    }

    pub fn paths(&self) -> &CatalogPaths {
        &self.paths
    }

    /// Refresh `plugins-latest.json` for every plugin in the catalog
    pub async fn update_plugins(&self, options: &UpdateOptions) -> Result<UpdateSummary> {
        info!("Loading plugins from config");
        let catalog = PluginCatalog::load(&self.paths.plugins_list)?;
        let ide_versions = Arc::new(IdeVersions::load(&self.paths.ide_versions)?);
        let mut latest = PluginsLatest::load(&self.paths.plugins_latest)?;
        let initial_files: Vec<String> = latest.files.keys().cloned().collect();
        let extra_builds = Arc::new(options.extra_builds.clone());

        let mut summary = UpdateSummary {
            plugins: catalog.len(),
            ..Default::default()
        };

        info!(
            "Processing {} plugins in {} chunks",
            catalog.len(),
            catalog.len().div_ceil(self.chunk_size)
        );

        for (index, chunk) in catalog.plugins.chunks(self.chunk_size).enumerate() {
            let start = index * self.chunk_size;
            info!("Processing plugins {} to {}", start, start + chunk.len());

            let updates = self.fetch_updates(chunk).await;
            let fresh = self
                .resolve_chunk(chunk, updates, &ide_versions, &extra_builds)
                .await;

            summary.resolved += fresh.len();
            summary.unresolved += chunk.len() - fresh.len();
            latest.merge_plugins(fresh);

            // Previous hashes only need discarding once; later chunks reuse
            // the ones computed here.
            let refetch = options.refetch_all && index == 0;
            info!("Calculating missing file hashes");
            let (hashed, failed) = self.refresh_hashes(&mut latest, refetch).await;
            summary.hashed += hashed;
            summary.hash_failures += failed;

            info!("Writing progress to file");
            latest.save(&self.paths.plugins_latest)?;
            summary.chunks += 1;
        }

        summary.diff = FileDiff::between(&initial_files, latest.files.keys());
        Ok(summary)
    }

    /// Fetch releases for every plugin in the chunk. Failures are logged and
    /// the plugin is left out.
    async fn fetch_updates(&self, chunk: &[PluginEntry]) -> HashMap<u64, Vec<PluginUpdate>> {
        let api = Arc::clone(&self.api);
        let jobs: Vec<(u64, String)> = chunk
            .iter()
            .map(|p| (p.id, p.channel().to_string()))
            .collect();

        run_bounded(jobs, self.concurrency, move |(id, channel)| {
            let api = Arc::clone(&api);
            async move {
                match api.plugin_updates(id, &channel).await {
                    Ok(updates) => Some((id, updates)),
                    Err(e) => {
                        error!("Failed to get plugin info for plugin {}: {}", id, e);
                        None
                    }
                }
            }
        })
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Resolve the plugins of a chunk that have release data
    async fn resolve_chunk(
        &self,
        chunk: &[PluginEntry],
        mut updates: HashMap<u64, Vec<PluginUpdate>>,
        ide_versions: &Arc<IdeVersions>,
        extra_builds: &Arc<Vec<String>>,
    ) -> BTreeMap<u64, PluginBuilds> {
        let jobs: Vec<(PluginEntry, Vec<PluginUpdate>)> = chunk
            .iter()
            .filter_map(|p| updates.remove(&p.id).map(|u| (p.clone(), u)))
            .collect();

        let api = Arc::clone(&self.api);
        let ide_versions = Arc::clone(ide_versions);
        let extra_builds = Arc::clone(extra_builds);

        run_bounded(jobs, self.concurrency, move |(plugin, updates)| {
            let api = Arc::clone(&api);
            let ide_versions = Arc::clone(&ide_versions);
            let extra_builds = Arc::clone(&extra_builds);
            async move {
                let codes = match api.compatible_products(plugin.id).await {
                    Ok(codes) => codes,
                    Err(e) => {
                        error!(
                            "Failed to process plugin {} [{}]: {}",
                            plugin.id, plugin.key, e
                        );
                        return None;
                    }
                };

                let request = ResolveRequest {
                    plugin: &plugin,
                    updates: &updates,
                    compatible: friendly_names(&codes),
                    ide_versions: &ide_versions,
                    extra_builds: &extra_builds,
                };
                resolve_plugin(request, |file| api.download_url(file))
                    .map(|b| (plugin.id, b))
            }
        })
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Keep a hash for exactly the referenced files, hashing the ones not
    /// seen before. Builds whose file cannot be hashed are unlinked, so every
    /// referenced file has a hash. Returns `(hashed, failed)`.
    async fn refresh_hashes(
        &self,
        latest: &mut PluginsLatest,
        refetch_all: bool,
    ) -> (usize, usize) {
        let urls = latest.file_urls();
        let previous = std::mem::take(&mut latest.files);
        let none = BTreeMap::new();
        let known = if refetch_all { &none } else { &previous };

        let diff = FileDiff::between(known.keys(), &urls);
        for url in &diff.removed {
            debug!("removed file {}", url);
        }
        for url in &diff.added {
            debug!("added file {}", url);
        }
        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            "file list changed"
        );

        let mut hashed = 0;
        let mut failed = 0;
        let mut unhashable = BTreeSet::new();
        for url in urls {
            if let Some(hash) = known.get(&url) {
                latest.files.insert(url, hash.clone());
                continue;
            }

            match self.hasher.hash(&url).await {
                Ok(hash) => {
                    latest.files.insert(url, hash);
                    hashed += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    failed += 1;
                    if let Some(hash) = previous.get(&url) {
                        warn!("keeping previous hash for {}", url);
                        latest.files.insert(url, hash.clone());
                    } else {
                        unhashable.insert(url);
                    }
                }
            }
        }

        if !unhashable.is_empty() {
            let unlinked = latest.unlink_files(&unhashable);
            warn!("{} builds left without a download after hash failures", unlinked);
        }

        (hashed, failed)
    }

    /// Add plugins to the catalog by marketplace id
    pub async fn add_plugins(&self, ids: &[u64], channel: Option<&str>) -> Result<AddSummary> {
        let mut catalog = PluginCatalog::load(&self.paths.plugins_list)?;
        let mut summary = AddSummary::default();

        for &id in ids {
            if catalog.contains(id) {
                info!("plugin {} already in catalog", id);
                summary.already_present.push(id);
                continue;
            }

            info!("adding new plugin {}", id);
            match self.api.plugin_info(id).await {
                Ok(details) => {
                    let entry = PluginEntry::from_details(&details, channel.map(str::to_string));
                    if entry.id != id {
                        warn!("plugin {} reported id {}", id, entry.id);
                    }
                    match catalog.add(entry) {
                        Ok(()) => summary.added.push(id),
                        Err(CatalogError::DuplicatePlugin { .. }) => {
                            summary.already_present.push(id)
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => {
                    error!("failed to add plugin {}: {}", id, e);
                    summary.failed.push(id);
                }
            }
        }

        catalog.save(&self.paths.plugins_list)?;
        Ok(summary)
    }
}

/// Merge the IDE builds of every configured nixpkgs revision into
/// `ide-version.json`. Returns the number of builds added.
pub async fn update_ides(
    client: &reqwest::Client,
    config: &Config,
    paths: &CatalogPaths,
) -> Result<usize> {
    let lock = FlakeLock::load(&paths.flake_lock)?;

    info!(
        "fetching ide versions from nixpkgs, inputs: {:?}",
        config.nixpkgs.inputs
    );
    let upstream = fetch_upstream(
        client,
        &config.nixpkgs.base_url,
        &lock,
        &config.nixpkgs.inputs,
    )
    .await?;

    let mut versions = IdeVersions::load(&paths.ide_versions)?;
    let added = versions.merge(upstream);
    versions.save(&paths.ide_versions)?;
    info!("successfully updated ide versions ({} new builds)", added);

    Ok(added)
}
