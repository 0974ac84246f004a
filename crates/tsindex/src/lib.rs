//! # TSIndex - Timestamp Index Files
//!
//! On-disk and in-memory building blocks for mapping timestamps to sample
//! positions inside a dataset's data files.
//!
//! An index is a sorted list of `(timestamp, file_id, position)` entries,
//! where `file_id` is the file's ordinal in dataset order and `position` is
//! the 0-based sample index within that file. It is built by merging the
//! per-file timestamp sequences ([`build_entries`]) and persisted to a single
//! `.tsi` file so it does not have to be rebuilt on every start.
//!
//! ## File layout (v1)
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ HEADER (36 bytes)                                             │
//! │                                                               │
//! │ magic (u32) "TSI1" | version (u16) | reserved (u16)           │
//! │ file_count (u32) | entry_count (u64)                          │
//! │ fp.file_count (u32) | fp.sample_count (u64) | fp.digest (u32) │
//! ├───────────────────────────────────────────────────────────────┤
//! │ FILE TABLE                                                    │
//! │                                                               │
//! │ path_len (u32) | path (raw bytes) | samples (u64)             │
//! │ ... repeated file_count times ...                             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ ENTRIES (ascending timestamp)                                 │
//! │                                                               │
//! │ timestamp (u64) | file_id (u32) | position (u64)              │
//! │ ... repeated entry_count times ...                            │
//! ├───────────────────────────────────────────────────────────────┤
//! │ FOOTER: crc32 (u32) over every preceding byte                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Paths are stored as their exact OS bytes
//! on Unix and as UTF-8 elsewhere. The fingerprint (`fp.*`) is the source
//! dataset's [`Fingerprint`] at build time and is what staleness checks
//! compare against.

mod error;
mod format;
mod merge;
mod range;
mod reader;
mod scoped;
mod writer;

use std::path::PathBuf;

pub use dataset::{Fingerprint, Timestamp};
pub use error::IndexError;
pub use format::{
    ENTRY_BYTES, FOOTER_BYTES, HEADER_BYTES, INDEX_EXTENSION, INDEX_MAGIC, INDEX_VERSION,
    MAX_PATH_BYTES,
};
pub use merge::{build_entries, EntryMerge};
pub use range::RangeIter;
pub use reader::IndexReader;
pub use scoped::Scoped;
pub use writer::IndexWriter;

/// Physical location of one sample: which file, and which sample in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub file_id: u32,
    pub position: u64,
}

/// One index entry: a timestamp and where its sample lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub timestamp: Timestamp,
    pub file_id: u32,
    pub position: u64,
}

impl IndexEntry {
    pub fn location(&self) -> Location {
        Location {
            file_id: self.file_id,
            position: self.position,
        }
    }
}

/// A data file as recorded in the index file table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub samples: u64,
}

/// Everything an index file holds, as read back by [`IndexReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexContents {
    pub fingerprint: Fingerprint,
    pub files: Vec<FileRecord>,
    pub entries: Vec<IndexEntry>,
}

#[cfg(test)]
mod tests;
