use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

/// Every failure is fatal to the current build invocation.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Invalid or missing build parameter. Raised before any filesystem mutation.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("filter rules from {url} do not contain a checksum")]
    MissingChecksum { url: String },

    #[error("wrong checksum for {url}: declared {declared}, expected {expected}")]
    ChecksumMismatch {
        url: String,
        declared: String,
        expected: String,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("download of {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("malformed descriptor {}: {reason}", path.display())]
    MalformedDescriptor { path: PathBuf, reason: String },

    #[error("{tool} exited with {status}: {stderr}")]
    ExternalTool {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("background task failed: {0}")]
    Task(String),
}

impl BuildError {
    /// True for checksum failures on downloaded filter documents.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            BuildError::MissingChecksum { .. } | BuildError::ChecksumMismatch { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Attaches the offending path to a bare `io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| BuildError::io(path, source))
    }
}
