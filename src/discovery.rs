//! Flutter project discovery
//!
//! A Flutter project root is the directory holding `pubspec.yaml`.

use std::path::{Path, PathBuf};
use tracing::debug;

/// File whose presence marks a Flutter project root
pub const PROJECT_SENTINEL: &str = "pubspec.yaml";

/// Project discovery errors
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Invalid Flutter project {}: no {} found", .0.display(), PROJECT_SENTINEL)]
    NotAProject(PathBuf),

    #[error("Unable to find a Flutter project from {}", .0.display())]
    NotFound(PathBuf),
}

pub fn is_project_root(dir: &Path) -> bool {
    dir.join(PROJECT_SENTINEL).is_file()
}

/// Resolve the project root.
///
/// An explicit path must itself be a project root. Without one, walk up
/// from `start` to the nearest directory holding the sentinel.
pub fn find_project_root(explicit: Option<&Path>, start: &Path) -> Result<PathBuf, ProjectError> {
    if let Some(path) = explicit {
        if is_project_root(path) {
            return Ok(path.to_path_buf());
        }
        return Err(ProjectError::NotAProject(path.to_path_buf()));
    }

    let mut dir = Some(start);
    while let Some(current) = dir {
        if is_project_root(current) {
            debug!(root = %current.display(), "found project root");
            return Ok(current.to_path_buf());
        }
        dir = current.parent();
    }

    Err(ProjectError::NotFound(start.to_path_buf()))
}
