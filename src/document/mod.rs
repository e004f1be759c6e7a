//! Structured documents
//!
//! An owned XML tree, its parser and writer, and the idempotent upsert
//! used to reflect settings into IDE configuration files.

mod parse;
mod patch;
mod tree;
mod write;

pub use patch::{upsert, PatchOutcome, Selector, Step};
pub use tree::{Document, Element, Node};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors reading or writing a document file
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: roxmltree::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl Document {
    /// Load and parse a document file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let source = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the document, creating parent directories as needed
    pub fn write_to_file(&self, path: &Path) -> Result<(), DocumentError> {
        let write_err = |source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_xml()).map_err(write_err)
    }
}
