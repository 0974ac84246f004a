/// Build path: turn a dataset's file descriptors into a sorted index.
///
/// File ids are assigned in dataset order; positions are 0-based sample
/// indices within each file. The heavy lifting is done by
/// [`tsindex::build_entries`], which concatenates files that are already in
/// time order and falls back to a k-way heap merge otherwise.
use dataset::{DataFileDesc, DatasetDesc, Fingerprint};
use tracing::{debug, info};
use tsindex::{build_entries, FileRecord, IndexError};

use crate::TimestampMapper;

impl TimestampMapper {
    /// Rebuilds the in-memory index from `desc`.
    ///
    /// On success the previous in-memory index is replaced and the dataset's
    /// fingerprint is recorded so [`persist`](TimestampMapper::persist) can
    /// write it and [`is_stale`](TimestampMapper::is_stale) can compare
    /// against it. On failure the previous in-memory index is kept.
    ///
    /// # Errors
    ///
    /// See [`build_files`](TimestampMapper::build_files).
    pub fn build(&mut self, desc: &DatasetDesc) -> Result<(), IndexError> {
        debug!(
            dataset = desc.name(),
            kind = desc.kind().as_str(),
            files = desc.file_count(),
            "building timestamp index"
        );
        self.build_files(desc.files())
    }

    /// Rebuilds the in-memory index from a list of files that has not been
    /// validated as a [`DatasetDesc`].
    ///
    /// # Errors
    ///
    /// [`IndexError::Overlap`] if two files claim the same timestamp.
    pub fn build_files(&mut self, files: &[DataFileDesc]) -> Result<(), IndexError> {
        let entries = build_entries(files)?;
        let records = files
            .iter()
            .map(|f| FileRecord {
                path: f.path().to_path_buf(),
                samples: f.sample_count() as u64,
            })
            .collect();

        self.entries = entries;
        self.files = records;
        self.fingerprint = Some(Fingerprint::of(files));

        info!(
            path = %self.index_path.display(),
            entries = self.entries.len(),
            files = self.files.len(),
            "timestamp index built"
        );
        Ok(())
    }
}
