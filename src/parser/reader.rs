//! Results file reader
//!
//! Loads a whole results file into memory. No parsing happens here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Reader errors
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Results file not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read results file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raw text of a results file
#[derive(Clone, Debug)]
pub struct RawOutput {
    path: PathBuf,
    text: String,
}

impl RawOutput {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Label derived from the file stem, falling back to the full path
    pub fn default_label(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Read the full content of a results file
pub fn read_output(path: impl AsRef<Path>) -> Result<RawOutput, ReadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ReadError::NotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => ReadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    debug!(path = %path.display(), bytes = text.len(), "Read results file");
    Ok(RawOutput::new(path, text))
}
