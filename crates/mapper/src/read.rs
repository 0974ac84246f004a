/// Read path: lookup() and range().
///
/// Both run against the sorted in-memory entries only; no file I/O.
use dataset::Timestamp;
use std::path::Path;
use tsindex::{IndexError, Location, RangeIter};

use crate::TimestampMapper;

impl TimestampMapper {
    /// Finds the file and sample position holding `timestamp`.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotFound`] if no file covers `timestamp`.
    pub fn lookup(&self, timestamp: Timestamp) -> Result<Location, IndexError> {
        self.entries
            .binary_search_by_key(&timestamp, |e| e.timestamp)
            .map(|i| self.entries[i].location())
            .map_err(|_| IndexError::NotFound(timestamp))
    }

    /// Returns the entries with `start <= timestamp <= end`, ascending.
    ///
    /// The iterator borrows the mapper and is evaluated lazily. No match is
    /// an empty iterator, not an error.
    ///
    /// # Errors
    ///
    /// [`IndexError::InvalidRange`] if `start > end`.
    pub fn range(&self, start: Timestamp, end: Timestamp) -> Result<RangeIter<'_>, IndexError> {
        RangeIter::new(&self.entries, start, end)
    }

    /// Path of the data file with the given id.
    pub fn file_path(&self, file_id: u32) -> Option<&Path> {
        self.files.get(file_id as usize).map(|f| f.path.as_path())
    }

    /// Number of samples recorded for the data file with the given id.
    pub fn file_samples(&self, file_id: u32) -> Option<u64> {
        self.files.get(file_id as usize).map(|f| f.samples)
    }
}
