use std::path::PathBuf;

use thiserror::Error;

/// Failures reading the menu or layout settings documents.
///
/// None of these are fatal to a carousel: the loader falls back to built-in
/// content or layouts and logs the error.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document has no `{0}` section")]
    MissingSection(&'static str),

    #[error("document contains no displayable items")]
    NoItems,
}
