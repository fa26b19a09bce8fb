//! Error types for table and catalog loading.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::validation::ValidationReport;

/// Failure to load a chart, matchup book or card catalog.
#[derive(Debug, Error)]
pub enum TableError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the expected schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The data parsed but failed validation. Nothing from it is usable.
    #[error("rejected by validation:\n{0}")]
    Invalid(ValidationReport),
}

impl TableError {
    /// Returns the validation report if this is a validation failure.
    #[must_use]
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Invalid(report) => Some(report),
            _ => None,
        }
    }
}

/// A chart cell that does not match the result grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse chart cell `{text}`: {reason}")]
pub struct ChartParseError {
    /// The offending cell text.
    pub text: String,
    /// Why it was rejected.
    pub reason: String,
}

impl ChartParseError {
    pub(crate) fn new(text: &str, reason: impl Into<String>) -> Self {
        Self {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Reads a file into a string, mapping failures to [`TableError::Io`].
pub(crate) fn read_file(path: &Path) -> Result<String, TableError> {
    std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}
