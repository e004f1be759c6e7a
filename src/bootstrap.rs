//! Bootstrap a settings document
//!
//! Writes an empty settings document for one environment layer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::settings::{layer_path, AppSettingsDocument, EnvironmentLayer};

/// Bootstrap errors
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("File {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to write {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Create `appsettings[.<layer>].json` in the project root.
///
/// An existing file is never overwritten.
pub fn bootstrap(project_root: &Path, layer: EnvironmentLayer) -> Result<PathBuf, BootstrapError> {
    let path = layer_path(project_root, layer);
    if path.exists() {
        return Err(BootstrapError::AlreadyExists(path));
    }

    let json = AppSettingsDocument::default().to_json()?;
    fs::write(&path, format!("{}\n", json)).map_err(|source| BootstrapError::Io {
        path: path.clone(),
        source,
    })?;

    info!(layer = %layer, path = %path.display(), "created settings document");
    Ok(path)
}
