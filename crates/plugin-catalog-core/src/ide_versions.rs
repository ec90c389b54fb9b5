//! IDE build numbers
//!
//! nixpkgs publishes the packaged IDE releases in `versions.json`. The build
//! numbers from every pinned nixpkgs revision are collected into
//! `data/ide-version.json`, which only ever grows.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::http;
use crate::jsonfile;
use crate::products::GATEWAY_PRODUCT;

/// Default location of raw nixpkgs sources
pub const DEFAULT_NIXPKGS_URL: &str = "https://raw.githubusercontent.com/NixOS/nixpkgs";

const VERSIONS_PATH: &str = "pkgs/applications/editors/jetbrains/bin/versions.json";

/// Flake inputs whose nixpkgs revision is consulted by default
pub const DEFAULT_FLAKE_INPUTS: &[&str] = &["nixpkgs", "nixos-unstable", "nixos-master"];

/// The parts of `flake.lock` needed to find pinned revisions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlakeLock {
    #[serde(default)]
    nodes: BTreeMap<String, FlakeNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FlakeNode {
    #[serde(default)]
    locked: Option<LockedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LockedRef {
    #[serde(default)]
    rev: Option<String>,
}

impl FlakeLock {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| CatalogError::json(path, e))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Pinned revision of a flake input
    pub fn revision(&self, input: &str) -> Result<&str> {
        self.nodes
            .get(input)
            .and_then(|n| n.locked.as_ref())
            .and_then(|l| l.rev.as_deref())
            .ok_or_else(|| CatalogError::MissingFlakeInput {
                input: input.to_string(),
            })
    }
}

/// One packaged IDE release in `versions.json`
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamRelease {
    pub build_number: String,
}

/// `versions.json`: platform -> product -> release
pub type UpstreamVersions = BTreeMap<String, BTreeMap<String, UpstreamRelease>>;

/// URL of `versions.json` at a nixpkgs revision
pub fn versions_url(base_url: &str, rev: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), rev, VERSIONS_PATH)
}

/// Collect build numbers per product across several `versions.json` files.
///
/// Builds keep first-seen order without duplicates; `gateway` is skipped.
pub fn aggregate<'a, I>(sources: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a UpstreamVersions>,
{
    let mut result: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for source in sources {
        for products in source.values() {
            for (product, release) in products {
                if product == GATEWAY_PRODUCT {
                    continue;
                }

                let builds = result.entry(product.clone()).or_default();
                if !builds.contains(&release.build_number) {
                    builds.push(release.build_number.clone());
                }
            }
        }
    }

    result
}

/// Fetch and aggregate `versions.json` for every flake input.
///
/// All inputs must be pinned in the lock; nothing is fetched otherwise.
pub async fn fetch_upstream(
    client: &reqwest::Client,
    base_url: &str,
    lock: &FlakeLock,
    inputs: &[String],
) -> Result<BTreeMap<String, Vec<String>>> {
    let revisions = inputs
        .iter()
        .map(|input| lock.revision(input).map(|rev| (input, rev)))
        .collect::<Result<Vec<_>>>()?;

    let mut sources = Vec::with_capacity(revisions.len());
    for (input, rev) in revisions {
        let url = versions_url(base_url, rev);
        tracing::info!(input = %input, rev = %rev, "fetching IDE versions");
        let versions: UpstreamVersions = http::get_json(client, &url).await?;
        sources.push(versions);
    }

    Ok(aggregate(&sources))
}

/// The `ide-version.json` document: product -> known builds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeVersions(BTreeMap<String, Vec<String>>);

impl IdeVersions {
    /// Load known builds. A missing file yields an empty map.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(jsonfile::read(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        jsonfile::write(path, self)
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn builds(&self, product: &str) -> &[String] {
        self.0.get(product).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add unseen products and builds, then sort every list.
    ///
    /// Returns the number of builds added.
    pub fn merge(&mut self, incoming: BTreeMap<String, Vec<String>>) -> usize {
        let mut added = 0;

        for (product, builds) in incoming {
            let current = self.0.entry(product).or_default();
            for build in builds {
                if !current.contains(&build) {
                    current.push(build);
                    added += 1;
                }
            }
        }

        for builds in self.0.values_mut() {
            builds.sort();
        }

        added
    }

    /// Distinct builds of the given products, sorted
    pub fn builds_for<S: AsRef<str>>(&self, products: &[S]) -> BTreeSet<String> {
        products
            .iter()
            .flat_map(|p| self.builds(p.as_ref()))
            .cloned()
            .collect()
    }
}

impl From<BTreeMap<String, Vec<String>>> for IdeVersions {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_lock() -> &'static str {
        r#"{
            "nodes": {
                "nixpkgs": {"locked": {"owner": "NixOS", "rev": "abc123", "type": "github"}},
                "nixos-master": {"locked": {"rev": "def456"}},
                "root": {"inputs": {"nixpkgs": "nixpkgs"}}
            },
            "root": "root",
            "version": 7
        }"#
    }

    fn upstream(json: &str) -> UpstreamVersions {
        serde_json::from_str(json).unwrap()
    }

    fn product_builds(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(product, builds)| {
                let builds = builds.iter().map(|b| b.to_string()).collect();
                (product.to_string(), builds)
            })
            .collect()
    }

    #[test]
    fn test_flake_revision() {
        let lock = FlakeLock::parse(sample_lock()).unwrap();
        assert_eq!(lock.revision("nixpkgs").unwrap(), "abc123");
        assert_eq!(lock.revision("nixos-master").unwrap(), "def456");
    }

    #[test]
    fn test_flake_missing_input() {
        let lock = FlakeLock::parse(sample_lock()).unwrap();
        assert!(matches!(
            lock.revision("root"),
            Err(CatalogError::MissingFlakeInput { .. })
        ));
        assert!(lock.revision("nixos-unstable").is_err());
    }

    #[test]
    fn test_versions_url() {
        assert_eq!(
            versions_url(DEFAULT_NIXPKGS_URL, "abc123"),
            format!("{}/abc123/{}", DEFAULT_NIXPKGS_URL, VERSIONS_PATH)
        );
        assert_eq!(
            versions_url("http://mirror.test/", "r1"),
            "http://mirror.test/r1/pkgs/applications/editors/jetbrains/bin/versions.json"
        );
    }

    #[tokio::test]
    async fn test_fetch_upstream_checks_every_input_first() {
        let lock = FlakeLock::parse(sample_lock()).unwrap();
        let inputs = vec!["nixpkgs".to_string(), "nixos-unstable".to_string()];

        // The unreachable URL is never requested
        let client = reqwest::Client::new();
        let err = fetch_upstream(&client, "http://127.0.0.1:9", &lock, &inputs)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingFlakeInput { ref input } if input == "nixos-unstable"
        ));
    }

    #[test]
    fn test_aggregate_dedupes_and_skips_gateway() {
        let first = upstream(
            r#"{
                "x86_64-linux": {
                    "clion": {"build_number": "233.1", "version": "2023.3"},
                    "gateway": {"build_number": "233.1"}
                },
                "aarch64-linux": {
                    "clion": {"build_number": "233.1"}
                }
            }"#,
        );
        let second = upstream(
            r#"{
                "x86_64-linux": {
                    "clion": {"build_number": "241.5"},
                    "rider": {"build_number": "241.7"}
                }
            }"#,
        );

        let result = aggregate([&first, &second]);
        assert_eq!(result.get("clion").unwrap(), &vec!["233.1", "241.5"]);
        assert_eq!(result.get("rider").unwrap(), &vec!["241.7"]);
        assert!(!result.contains_key("gateway"));
    }

    #[test]
    fn test_merge_adds_and_sorts() {
        let mut current = IdeVersions::from(product_builds(&[("clion", &["241.5", "233.1"])]));

        let incoming = product_builds(&[("clion", &["233.1", "241.9"]), ("goland", &["241.2"])]);

        let added = current.merge(incoming);
        assert_eq!(added, 2);
        assert_eq!(current.builds("clion"), &["233.1", "241.5", "241.9"]);
        assert_eq!(current.builds("goland"), &["241.2"]);
        assert!(current.builds("rider").is_empty());
    }

    #[test]
    fn test_builds_for_union() {
        let versions = IdeVersions::from(product_builds(&[
            ("clion", &["233.1", "241.5"]),
            ("goland", &["241.5", "241.6"]),
            ("rider", &["999.1"]),
        ]));

        let builds = versions.builds_for(&["clion", "goland"]);
        let builds: Vec<String> = builds.into_iter().collect();
        assert_eq!(builds, vec!["233.1", "241.5", "241.6"]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ide-version.json");

        assert_eq!(IdeVersions::load(&path).unwrap(), IdeVersions::default());

        let mut versions = IdeVersions::default();
        versions.merge(product_builds(&[("mps", &["233.2"])]));
        versions.save(&path).unwrap();

        let loaded = IdeVersions::load(&path).unwrap();
        assert_eq!(loaded, versions);
        assert_eq!(loaded.products().collect::<Vec<_>>(), vec!["mps"]);
    }
}
