//! Filesystem access for bibliographies, manuscripts and the pruned output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::usage::Manuscript;

/// Errors that can occur when reading sources or writing results.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads a whole source file into memory.
pub fn read_source(path: &Path) -> Result<String, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("read {} byte(s) from '{}'", text.len(), path.display());
    Ok(text)
}

/// Reads every bibliography in order. Stops at the first unreadable file.
pub fn read_bibliographies(paths: &[PathBuf]) -> Result<Vec<String>, SourceError> {
    paths.iter().map(|path| read_source(path)).collect()
}

/// Reads every manuscript in order, inferring each one's citation syntax
/// from its file name.
pub fn read_manuscripts(paths: &[PathBuf]) -> Result<Vec<Manuscript>, SourceError> {
    paths
        .iter()
        .map(|path| read_source(path).map(|text| Manuscript::from_path(path, text)))
        .collect()
}

/// Writes `text` to `path` in a single call, replacing any existing file.
pub fn write_output(path: &Path, text: &str) -> Result<(), SourceError> {
    fs::write(path, text).map_err(|source| SourceError::Write {
        path: path.to_path_buf(),
        source,
    })
}
