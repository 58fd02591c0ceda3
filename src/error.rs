//! Error taxonomy for deck conversion.
//!
//! Archive- and database-level errors abort a conversion outright.
//! Media errors are scoped to one asset: the pipeline records them as
//! skipped outcomes and keeps going.

use thiserror::Error;

/// Everything that can go wrong while converting a deck package.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The caller supplied no usable package (empty bytes, or a
    /// filename without the expected `.apkg` extension).
    #[error("invalid input: {0}")]
    Input(String),

    /// The package bytes are not a readable deck archive, or an entry
    /// would escape the extraction root.
    #[error("package is not a valid deck archive: {0}")]
    PackageFormat(String),

    /// The embedded collection database is missing, unreadable, or
    /// lacks the expected notes table.
    #[error("collection database unavailable: {0}")]
    DatabaseOpen(String),

    /// One media asset could not be transcoded. Never aborts the batch;
    /// surfaces only inside a skipped asset outcome.
    #[error("media asset {index}: {reason}")]
    MediaProcessing { index: String, reason: String },

    /// Final assembly of the tabular output failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A scratch or persistent output directory could not be set up.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// The conversion ran past its configured deadline. Cleanup has
    /// already run by the time this surfaces.
    #[error("conversion deadline of {limit_secs}s exceeded")]
    DeadlineExceeded { limit_secs: u64 },
}
