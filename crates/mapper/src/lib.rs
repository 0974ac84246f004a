//! # Mapper - Timestamp to File Location Mapping
//!
//! Ties the [`dataset`] descriptors and the [`tsindex`] file format together
//! into a queryable, persistent timestamp index.
//!
//! ## Lifecycle
//!
//! ```text
//!   DatasetDesc
//!       |
//!       |  is_stale()? ──no──> load(path) ──ok──> lookup / range
//!       |      |                   |
//!       |     yes            err (rebuild required)
//!       v      v                   v
//!   delete_index_file() ──> build(desc) ──> persist()
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                              |
//! |--------------|------------------------------------------------------|
//! | `lib.rs`     | `TimestampMapper` struct, constructors, accessors    |
//! | [`build`]    | `build()` / `build_files()`                          |
//! | [`persist`]  | `persist()`, `load()`, `delete_index_file()`, `is_stale()` |
//! | [`read`]     | `lookup()`, `range()`, `file_path()`                 |
//! | [`database`] | `Database` façade: one mapper per open dataset       |
//!
//! ## Concurrency
//!
//! A mapper is single-threaded. Queries take `&self`, mutators take
//! `&mut self`, so one instance can never be rebuilt while it is being read.
//! Two processes persisting the same index file race with last-writer-wins
//! semantics; each individual persist is atomic.
mod build;
mod database;
mod persist;
mod read;

use dataset::Timestamp;
use std::path::{Path, PathBuf};
use tsindex::{FileRecord, Fingerprint, IndexEntry, INDEX_EXTENSION};

pub use database::{Database, OpenOutcome, ResolvedLocation};
pub use tsindex::{IndexError, Location, RangeIter};

/// Builds, persists and answers queries against the timestamp index of one
/// dataset.
///
/// The in-memory index is a `Vec<IndexEntry>` sorted by timestamp, plus the
/// file table that gives each `file_id` its path. Point lookups are a binary
/// search; range lookups are two binary searches and a slice walk.
pub struct TimestampMapper {
    /// Where [`persist`](TimestampMapper::persist) writes the index.
    pub(crate) index_path: PathBuf,
    /// Sorted by timestamp, no duplicates.
    pub(crate) entries: Vec<IndexEntry>,
    /// Indexed by `file_id`.
    pub(crate) files: Vec<FileRecord>,
    /// Fingerprint of the dataset the current entries came from.
    /// `None` until the first successful build or load.
    pub(crate) fingerprint: Option<Fingerprint>,
}

impl std::fmt::Debug for TimestampMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampMapper")
            .field("index_path", &self.index_path)
            .field("entries", &self.entries.len())
            .field("files", &self.files.len())
            .field("first_timestamp", &self.first_timestamp())
            .field("last_timestamp", &self.last_timestamp())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Turns a dataset name into a safe file stem: lowercase ASCII letters,
/// digits, `-` and `_`; everything else becomes `_`.
pub fn sanitize_dataset_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl TimestampMapper {
    /// Creates an empty mapper that persists to `index_path`.
    pub fn new<P: AsRef<Path>>(index_path: P) -> Self {
        Self {
            index_path: index_path.as_ref().to_path_buf(),
            entries: Vec::new(),
            files: Vec::new(),
            fingerprint: None,
        }
    }

    /// Creates an empty mapper for `dataset_name` whose index file lives at
    /// `<index_dir>/<sanitized name>.tsi`.
    pub fn for_dataset<P: AsRef<Path>>(index_dir: P, dataset_name: &str) -> Self {
        let file = format!("{}.{}", sanitize_dataset_name(dataset_name), INDEX_EXTENSION);
        Self::new(index_dir.as_ref().join(file))
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Number of indexed timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` once a build or load has succeeded (even for an empty dataset).
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fingerprint.is_some()
    }

    /// Fingerprint of the dataset the in-memory index was built from.
    #[must_use]
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Number of files in the file table.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.entries.first().map(|e| e.timestamp)
    }

    #[must_use]
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.entries.last().map(|e| e.timestamp)
    }

    /// Discards the in-memory index. The index file on disk is not touched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.files.clear();
        self.fingerprint = None;
    }
}

#[cfg(test)]
mod tests;
