//! Download hashing
//!
//! Hashes are produced by the nix tooling; this module only drives it.

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{CatalogError, Result};

/// Computes the content hash of a download
#[async_trait]
pub trait FileHasher: Send + Sync {
    async fn hash(&self, url: &str) -> Result<String>;
}

/// Hashes downloads with `nix-prefetch-url` and `nix hash path`
#[derive(Debug, Clone, Default)]
pub struct NixHasher;

impl NixHasher {
    pub fn new() -> Self {
        Self
    }

    /// Arguments for `nix-prefetch-url`. Zip archives are unpacked, anything
    /// else is fetched as an executable.
    fn prefetch_args(url: &str) -> Vec<&str> {
        let mode = if url.ends_with(".zip") {
            "--unpack"
        } else {
            "--executable"
        };
        vec![url, "--print-path", mode]
    }

    async fn run(url: &str, program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| CatalogError::Hash {
                url: url.to_string(),
                message: format!("failed to run {}: {}", program, e),
            })?;

        if !output.status.success() {
            return Err(CatalogError::Hash {
                url: url.to_string(),
                message: format!(
                    "{} exited with {}: {}",
                    program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Store path from `nix-prefetch-url --print-path` output (hash line, then path)
fn store_path(url: &str, stdout: &str) -> Result<String> {
    let path = stdout
        .lines()
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| CatalogError::Hash {
            url: url.to_string(),
            message: "unexpected output format from nix-prefetch-url".to_string(),
        })?;

    if path.is_empty() {
        return Err(CatalogError::Hash {
            url: url.to_string(),
            message: "no path found in the output of nix-prefetch-url".to_string(),
        });
    }

    Ok(path.to_string())
}

#[async_trait]
impl FileHasher for NixHasher {
    async fn hash(&self, url: &str) -> Result<String> {
        tracing::info!("Downloading {}", url);
        let args = Self::prefetch_args(url);
        let prefetch = Self::run(url, "nix-prefetch-url", &args).await?;
        let path = store_path(url, &prefetch)?;

        let hash = Self::run(
            url,
            "nix",
            &[
                "--extra-experimental-features",
                "nix-command",
                "hash",
                "path",
                path.as_str(),
            ],
        )
        .await?;

        let hash = hash.trim();
        if hash.is_empty() {
            return Err(CatalogError::Hash {
                url: url.to_string(),
                message: "nix hash path produced no output".to_string(),
            });
        }

        Ok(hash.to_string())
    }
}
