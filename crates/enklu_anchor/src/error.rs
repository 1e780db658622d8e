//! Error types for enklu_anchor

use enklu_core::CoreError;
use thiserror::Error;

/// Failures in the anchor load/save pipeline
#[derive(Error, Debug)]
pub enum AnchorError {
    /// A saved anchor has no URL to download it from
    #[error("anchor {0} has no download url")]
    MissingSource(String),

    /// Fetching the exported bytes failed
    #[error("download failed: {0}")]
    Download(#[source] CoreError),

    /// The platform could not import the bytes
    #[error("import failed: {0}")]
    Import(#[source] CoreError),

    /// The platform could not export the anchor
    #[error("export failed: {0}")]
    Export(#[source] CoreError),

    /// The upload request failed in transport or with a bad status
    #[error("upload failed: {0}")]
    Upload(#[source] CoreError),

    /// The backend answered but refused the upload
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// Reading or writing the local anchor cache failed
    #[error("anchor cache I/O failed: {0}")]
    Cache(#[from] std::io::Error),
}

/// Result type for anchor operations
pub type Result<T> = std::result::Result<T, AnchorError>;
