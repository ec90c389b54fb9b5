use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid build number '{build}': segment '{segment}' is not an integer")]
    BuildParse { build: String, segment: String },

    #[error("Plugin already in catalog: {id}")]
    DuplicatePlugin { id: u64 },

    #[error("Flake input not found in flake.lock: {input}")]
    MissingFlakeInput { input: String },

    #[error("Failed to parse {path}: {message}")]
    Json { path: PathBuf, message: String },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Config key not found: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: {message}")]
    ConfigValue { key: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("Server gave non-200 code {status} for {url} with message: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Failed to hash {url}: {message}")]
    Hash { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BuildParse { .. } => 2,
            Self::ConfigParse { .. }
            | Self::ConfigKeyNotFound { .. }
            | Self::ConfigValue { .. } => 3,
            Self::Http { .. } | Self::Api { .. } => 4,
            Self::Hash { .. } => 5,
            Self::MissingFlakeInput { .. } => 6,
            _ => 1,
        }
    }

    /// Wrap a transport-level failure for `url`
    pub(crate) fn http(url: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not connect to server".to_string()
        } else {
            err.to_string()
        };
        Self::Http {
            url: url.to_string(),
            message,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
