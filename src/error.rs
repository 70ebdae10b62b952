use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run. Per-track problems never take this
/// path; they are captured in the [`crate::report::ImportReport`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to initialize YouTube Music client: {0:#}")]
    Auth(#[source] anyhow::Error),

    #[error("no CSV file selected")]
    NoFileSelected,

    #[error("failed to read CSV file {}: {source:#}", path.display())]
    CsvUnreadable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to create playlist '{title}': {source:#}")]
    PlaylistCreation {
        title: String,
        #[source]
        source: anyhow::Error,
    },
}
