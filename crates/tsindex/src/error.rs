use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::Timestamp;

/// Errors from building, persisting, loading and querying a timestamp index.
///
/// None of these are fatal. [`requires_rebuild`](IndexError::requires_rebuild)
/// tells a caller that failed to load an index whether falling back to a
/// fresh build is the right move.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Two files claim the same timestamp.
    #[error("timestamp {timestamp} is claimed by file {first_file} and file {second_file}")]
    Overlap {
        timestamp: Timestamp,
        first_file: u32,
        second_file: u32,
    },

    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Bad magic, checksum mismatch, truncation or inconsistent contents.
    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// The file was written by an unsupported format version.
    #[error("unsupported index version {found} (supported: {supported})")]
    VersionMismatch { found: u16, supported: u16 },

    /// There is no index file at the given path.
    #[error("index file {} does not exist", .0.display())]
    Missing(PathBuf),

    /// Exact lookup miss.
    #[error("timestamp {0} not found")]
    NotFound(Timestamp),

    /// Range query with `start > end`.
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: Timestamp, end: Timestamp },

    /// The in-memory index cannot be represented in the file format: a path
    /// over [`MAX_PATH_BYTES`](crate::MAX_PATH_BYTES), a path with no byte
    /// form on this platform, or a count that overflows its field.
    #[error("index cannot be encoded: {0}")]
    Unencodable(String),

    /// Persist was called before anything was built or loaded.
    #[error("index has not been built or loaded")]
    NotBuilt,
}

impl IndexError {
    /// `true` for load failures that a rebuild from the data files fixes.
    #[must_use]
    pub fn requires_rebuild(&self) -> bool {
        matches!(
            self,
            IndexError::Io(_)
                | IndexError::Corrupt(_)
                | IndexError::VersionMismatch { .. }
                | IndexError::Missing(_)
        )
    }
}
