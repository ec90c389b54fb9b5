//! Pretty-printed JSON files
//!
//! All data files are written with two-space indentation and a trailing
//! newline so they diff cleanly in version control.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CatalogError, Result};

/// Read and decode `path`. A missing file yields `None`.
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)
        .map_err(|e| CatalogError::json(path, e))?;
    Ok(Some(value))
}

/// Encode `value` and write it to `path`, creating parent directories
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut content = serde_json::to_string_pretty(value)
        .map_err(|e| CatalogError::json(path, e))?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}
