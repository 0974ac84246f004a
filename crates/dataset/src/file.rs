use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

#[cfg(unix)]
use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::ffi::{OsStrExt, OsStringExt};

use crate::{DescError, Timestamp, VariableDesc};

/// Describes one physical data file: which timestamps it holds, which
/// variables, and where it lives.
///
/// The timestamp sequence is strictly increasing; its length is the number of
/// samples stored per variable. `marker` is an opaque modification marker
/// (see [`modification_marker`]) that feeds the dataset fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFileDesc {
    timestamps: Vec<Timestamp>,
    variables: Vec<VariableDesc>,
    path: PathBuf,
    marker: u64,
}

impl DataFileDesc {
    /// Creates a descriptor with a zero modification marker.
    ///
    /// # Errors
    ///
    /// Returns [`DescError::EmptyPath`] for an empty path and
    /// [`DescError::UnsortedTimestamps`] if any timestamp is not strictly
    /// greater than its predecessor (duplicates included).
    pub fn new(
        timestamps: Vec<Timestamp>,
        variables: Vec<VariableDesc>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, DescError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(DescError::EmptyPath);
        }
        if let Some(position) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DescError::UnsortedTimestamps {
                path,
                position: position + 1,
            });
        }
        Ok(Self {
            timestamps,
            variables,
            path,
            marker: 0,
        })
    }

    /// Returns a copy carrying the given modification marker.
    #[must_use]
    pub fn with_marker(mut self, marker: u64) -> Self {
        self.marker = marker;
        self
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn variables(&self) -> &[VariableDesc] {
        &self.variables
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn marker(&self) -> u64 {
        self.marker
    }

    /// Number of samples stored per variable.
    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    /// `true` when the file has timestamps, variables and a path.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.timestamps.is_empty() && !self.variables.is_empty()
    }

    /// Returns the variable with the given name, if present.
    pub fn variable(&self, name: &str) -> Option<&VariableDesc> {
        self.variables.iter().find(|v| v.name() == name)
    }
}

/// Returns the file's modification time in nanoseconds since the Unix epoch,
/// or `0` if the file cannot be stat'ed.
pub fn modification_marker(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Raw bytes of `path` as stored in an index file table.
///
/// On Unix these are the path's exact bytes, valid UTF-8 or not. Elsewhere
/// only UTF-8 paths have a byte form and `None` is returned for the rest.
#[cfg(unix)]
pub fn path_bytes(path: &Path) -> Option<&[u8]> {
    Some(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
pub fn path_bytes(path: &Path) -> Option<&[u8]> {
    path.to_str().map(str::as_bytes)
}

/// Inverse of [`path_bytes`].
#[cfg(unix)]
pub fn path_from_bytes(raw: Vec<u8>) -> Option<PathBuf> {
    Some(PathBuf::from(OsString::from_vec(raw)))
}

#[cfg(not(unix))]
pub fn path_from_bytes(raw: Vec<u8>) -> Option<PathBuf> {
    String::from_utf8(raw).ok().map(PathBuf::from)
}
