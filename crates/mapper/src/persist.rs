/// Persistence: writing, reading, deleting and staleness-checking the index
/// file.
///
/// Writes go through [`IndexWriter`] (temp file + fsync + atomic rename), so
/// a crash mid-persist leaves either the old index or the new one, never a
/// mix. A leftover `.tsi.tmp` is harmless and is removed by
/// [`Database::open`](crate::Database::open).
use dataset::DatasetDesc;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};
use tsindex::{IndexError, IndexReader, IndexWriter};

use crate::TimestampMapper;

impl TimestampMapper {
    /// Writes the in-memory index to [`index_path`](TimestampMapper::index_path).
    ///
    /// # Errors
    ///
    /// [`IndexError::NotBuilt`] if nothing was built or loaded yet,
    /// [`IndexError::Unencodable`] if a file path cannot be stored, and
    /// [`IndexError::Io`] on write failure. A prior index file stays
    /// unmodified unless the new one was fully written.
    pub fn persist(&self) -> Result<(), IndexError> {
        let fingerprint = self.fingerprint.ok_or(IndexError::NotBuilt)?;
        IndexWriter::write(&self.index_path, fingerprint, &self.files, &self.entries)?;
        info!(
            path = %self.index_path.display(),
            entries = self.entries.len(),
            "timestamp index persisted"
        );
        Ok(())
    }

    /// Replaces the in-memory index with the one stored at `path`, without
    /// looking at any data file.
    ///
    /// # Errors
    ///
    /// [`IndexError::Missing`], [`IndexError::Corrupt`],
    /// [`IndexError::VersionMismatch`] or [`IndexError::Io`]. All of these
    /// report [`requires_rebuild`](IndexError::requires_rebuild); the
    /// in-memory index is left as it was.
    pub fn load(&mut self, path: &Path) -> Result<(), IndexError> {
        let contents = IndexReader::open(path)?;
        self.entries = contents.entries;
        self.files = contents.files;
        self.fingerprint = Some(contents.fingerprint);
        info!(
            path = %path.display(),
            entries = self.entries.len(),
            "timestamp index loaded"
        );
        Ok(())
    }

    /// [`load`](TimestampMapper::load) from this mapper's own index path.
    pub fn reload(&mut self) -> Result<(), IndexError> {
        let path = self.index_path.clone();
        self.load(&path)
    }

    /// Removes the index file. Succeeds if it is already gone.
    ///
    /// The in-memory index is kept; call [`clear`](TimestampMapper::clear)
    /// as well for a full reset.
    pub fn delete_index_file(&self) -> Result<(), IndexError> {
        match fs::remove_file(&self.index_path) {
            Ok(()) => {
                debug!(path = %self.index_path.display(), "index file deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IndexError::Io(e)),
        }
    }

    /// `true` if `desc` no longer matches what the current index was built
    /// from (different files, sample counts, spans or modification markers),
    /// or if nothing has been built or loaded yet.
    #[must_use]
    pub fn is_stale(&self, desc: &DatasetDesc) -> bool {
        match self.fingerprint {
            Some(fp) => fp != desc.fingerprint(),
            None => true,
        }
    }

    /// `true` if the index file exists on disk.
    #[must_use]
    pub fn index_file_exists(&self) -> bool {
        self.index_path.exists()
    }
}
