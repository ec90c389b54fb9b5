pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod hasher;
pub mod http;
pub mod ide_versions;
pub mod jsonfile;
pub mod marketplace;
pub mod pool;
pub mod products;
pub mod resolver;
pub mod updater;
pub mod version;

pub use cache::{FileDiff, PluginBuilds, PluginsLatest};
pub use catalog::{slugify, PluginCatalog, PluginEntry};
pub use config::{CatalogPaths, Config};
pub use error::{CatalogError, Result};
pub use hasher::{FileHasher, NixHasher};
pub use ide_versions::{FlakeLock, IdeVersions};
pub use marketplace::{
    MarketplaceApi, MarketplaceClient, PluginDetails, PluginUpdate, DEFAULT_MARKETPLACE_URL,
};
pub use resolver::{newest_compatible, resolve_plugin, ResolveRequest};
pub use updater::{update_ides, AddSummary, UpdateOptions, UpdateSummary, Updater};

// Version comparison
pub use version::{
    is_build_older, is_compatible, pick_newest, tokenize, BuildNumber, CompatibilityWindow,
    Ordinal, TokenSequence, VersionToken,
};
