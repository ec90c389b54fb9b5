use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::ide_versions::{DEFAULT_FLAKE_INPUTS, DEFAULT_NIXPKGS_URL};
use crate::marketplace::DEFAULT_MARKETPLACE_URL;
use crate::pool::DEFAULT_CONCURRENCY;

const CONFIG_FILE: &str = "plugin-catalog.toml";

/// Default number of plugins processed (and saved) per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 250;

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# plugin-catalog configuration file
# Location: <root>/plugin-catalog.toml

[marketplace]
# Plugin marketplace endpoint
base_url = "https://plugins.jetbrains.com"

[nixpkgs]
# Where raw nixpkgs sources are downloaded from
base_url = "https://raw.githubusercontent.com/NixOS/nixpkgs"

# flake.lock inputs whose nixpkgs revision provides IDE versions
inputs = ["nixpkgs", "nixos-unstable", "nixos-master"]

[update]
# Concurrent marketplace requests
concurrency = 25

# Plugins processed between progress saves
chunk_size = 250
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub nixpkgs: NixpkgsConfig,
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Marketplace-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    #[serde(default = "default_marketplace_url")]
    pub base_url: String,
}

/// nixpkgs-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NixpkgsConfig {
    #[serde(default = "default_nixpkgs_url")]
    pub base_url: String,

    #[serde(default = "default_inputs")]
    pub inputs: Vec<String>,
}

/// Update pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_marketplace_url() -> String {
    DEFAULT_MARKETPLACE_URL.to_string()
}

fn default_nixpkgs_url() -> String {
    DEFAULT_NIXPKGS_URL.to_string()
}

fn default_inputs() -> Vec<String> {
    DEFAULT_FLAKE_INPUTS.iter().map(|s| s.to_string()).collect()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: default_marketplace_url(),
        }
    }
}

impl Default for NixpkgsConfig {
    fn default() -> Self {
        Self {
            base_url: default_nixpkgs_url(),
            inputs: default_inputs(),
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Config {
    /// Load config from the repository root
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| CatalogError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to the repository root
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        fs::create_dir_all(root)?;

        let content = toml::to_string_pretty(self).map_err(|e| CatalogError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(root: &Path) -> Result<PathBuf> {
        let path = root.join(CONFIG_FILE);
        fs::create_dir_all(root)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "marketplace.base_url" => self.marketplace.base_url = value.trim().to_string(),
            "nixpkgs.base_url" => self.nixpkgs.base_url = value.trim().to_string(),
            "nixpkgs.inputs" => self.nixpkgs.inputs = parse_string_list(value),
            "update.concurrency" => self.update.concurrency = parse_count(key, value)?,
            "update.chunk_size" => self.update.chunk_size = parse_count(key, value)?,
            _ => {
                return Err(CatalogError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "marketplace.base_url".to_string(),
                self.marketplace.base_url.clone(),
            ),
            (
                "nixpkgs.base_url".to_string(),
                self.nixpkgs.base_url.clone(),
            ),
            (
                "nixpkgs.inputs".to_string(),
                format!("{:?}", self.nixpkgs.inputs),
            ),
            (
                "update.concurrency".to_string(),
                self.update.concurrency.to_string(),
            ),
            (
                "update.chunk_size".to_string(),
                self.update.chunk_size.to_string(),
            ),
        ]
    }
}

/// Data file locations under a repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub plugins_list: PathBuf,
    pub ide_versions: PathBuf,
    pub plugins_latest: PathBuf,
    pub flake_lock: PathBuf,
}

impl CatalogPaths {
    pub fn new(root: &Path) -> Self {
        let data = root.join("data");
        Self {
            plugins_list: data.join("plugins.json"),
            ide_versions: data.join("ide-version.json"),
            plugins_latest: data.join("cache").join("plugins-latest.json"),
            flake_lock: root.join("flake.lock"),
        }
    }
}

/// Parse a positive count
fn parse_count(key: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CatalogError::ConfigValue {
            key: key.to_string(),
            message: format!("expected a positive integer, got '{}'", value),
        }),
    }
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();

    // Try JSON array format first: ["a", "b"]
    let inner = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_string_list_comma() {
        let result = parse_string_list("nixpkgs,nixos-master");
        assert_eq!(result, vec!["nixpkgs", "nixos-master"]);
    }

    #[test]
    fn test_parse_string_list_json() {
        let result = parse_string_list(r#"["nixpkgs", "nixos-unstable"]"#);
        assert_eq!(result, vec!["nixpkgs", "nixos-unstable"]);
    }

    #[test]
    fn test_parse_string_list_empty() {
        assert!(parse_string_list("[]").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.marketplace.base_url, "https://plugins.jetbrains.com");
        assert_eq!(config.nixpkgs.inputs.len(), 3);
        assert_eq!(config.update.concurrency, 25);
        assert_eq!(config.update.chunk_size, 250);
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("nixpkgs.inputs", "nixpkgs,nixos-master").unwrap();
        assert_eq!(config.nixpkgs.inputs, vec!["nixpkgs", "nixos-master"]);

        config.set("update.concurrency", "4").unwrap();
        assert_eq!(config.get("update.concurrency").unwrap(), "4");

        assert!(config.get("update.nope").is_none());
        assert!(matches!(
            config.set("update.nope", "1"),
            Err(CatalogError::ConfigKeyNotFound { .. })
        ));
    }

    #[test]
    fn test_config_set_rejects_bad_count() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("update.chunk_size", "0"),
            Err(CatalogError::ConfigValue { .. })
        ));
        assert!(config.set("update.chunk_size", "many").is_err());
        assert_eq!(config.update.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_init_template_parses_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = Config::init(temp.path()).unwrap();
        assert!(path.exists());

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.list(), Config::default().list());
    }

    #[test]
    fn test_save_load_partial() {
        let temp = TempDir::new().unwrap();
        let path = Config::path(temp.path());
        fs::write(&path, "[update]\nconcurrency = 3\n").unwrap();

        let mut config = Config::load(temp.path()).unwrap();
        assert_eq!(config.update.concurrency, 3);
        assert_eq!(config.update.chunk_size, DEFAULT_CHUNK_SIZE);

        config.set("marketplace.base_url", "http://localhost:1234").unwrap();
        config.save(temp.path()).unwrap();
        let reloaded = Config::load(temp.path()).unwrap();
        assert_eq!(reloaded.marketplace.base_url, "http://localhost:1234");
    }

    #[test]
    fn test_catalog_paths() {
        let paths = CatalogPaths::new(Path::new("/repo"));
        assert_eq!(paths.plugins_list, Path::new("/repo/data/plugins.json"));
        assert_eq!(paths.ide_versions, Path::new("/repo/data/ide-version.json"));
        assert_eq!(
            paths.plugins_latest,
            Path::new("/repo/data/cache/plugins-latest.json")
        );
        assert_eq!(paths.flake_lock, Path::new("/repo/flake.lock"));
    }
}
