//! Ordered merge of per-file timestamp sequences into index entries.
//!
//! Every [`DataFileDesc`] carries a sorted timestamp sequence. Building the
//! index is a k-way merge of those sequences: a min-heap holds the next
//! pending timestamp of each file, and entries come out in ascending order.
//! Two files offering the same timestamp is an overlap error.
//!
//! When the files are already laid out in time order (each file starts after
//! the previous one ends), [`build_entries`] skips the heap and concatenates.

use dataset::DataFileDesc;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::{IndexEntry, IndexError, Timestamp};

/// The next pending timestamp from one file.
struct HeapEntry {
    timestamp: Timestamp,
    /// Index into `files`; doubles as the file id.
    source: usize,
    /// Position of `timestamp` within its file.
    position: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.source == other.source
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; we want the *smallest* timestamp first.
        // On tie, the lower file id comes out first.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Merges the timestamp sequences of several files into one ascending stream
/// of [`IndexEntry`].
pub struct EntryMerge<'a> {
    files: &'a [DataFileDesc],
    heap: BinaryHeap<HeapEntry>,
}

impl<'a> EntryMerge<'a> {
    /// Creates a merge over `files`; the file id of each entry is the file's
    /// index in the slice.
    pub fn new(files: &'a [DataFileDesc]) -> Self {
        let mut heap = BinaryHeap::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            if let Some(&timestamp) = file.timestamps().first() {
                heap.push(HeapEntry {
                    timestamp,
                    source: i,
                    position: 0,
                });
            }
        }
        Self { files, heap }
    }

    /// Returns the next entry in timestamp order, or `None` when every file
    /// is exhausted.
    ///
    /// # Errors
    ///
    /// [`IndexError::Overlap`] when two files offer the same timestamp.
    /// After an error the merge yields nothing further.
    pub fn next_entry(&mut self) -> Result<Option<IndexEntry>, IndexError> {
        let top = match self.heap.pop() {
            Some(e) => e,
            None => return Ok(None),
        };

        if let Some(peek) = self.heap.peek() {
            if peek.timestamp == top.timestamp {
                let second = peek.source;
                self.heap.clear();
                return Err(IndexError::Overlap {
                    timestamp: top.timestamp,
                    first_file: top.source as u32,
                    second_file: second as u32,
                });
            }
        }

        // Advance this file.
        let timestamps = self.files[top.source].timestamps();
        let next = top.position + 1;
        if let Some(&timestamp) = timestamps.get(next) {
            // DataFileDesc guarantees strictly increasing timestamps
            debug_assert!(timestamp > top.timestamp);
            self.heap.push(HeapEntry {
                timestamp,
                source: top.source,
                position: next,
            });
        }

        Ok(Some(IndexEntry {
            timestamp: top.timestamp,
            file_id: top.source as u32,
            position: top.position as u64,
        }))
    }

    /// Collects all remaining entries into a `Vec`.
    pub fn collect_all(&mut self) -> Result<Vec<IndexEntry>, IndexError> {
        let mut result = Vec::new();
        while let Some(entry) = self.next_entry()? {
            result.push(entry);
        }
        Ok(result)
    }
}

impl Iterator for EntryMerge<'_> {
    type Item = Result<IndexEntry, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

/// `true` if every non-empty file starts after the previous non-empty file
/// ends, so concatenation in dataset order is already sorted.
fn in_time_order(files: &[DataFileDesc]) -> bool {
    let mut prev_last: Option<Timestamp> = None;
    for file in files {
        let (first, last) = match (file.first_timestamp(), file.last_timestamp()) {
            (Some(f), Some(l)) => (f, l),
            _ => continue,
        };
        if matches!(prev_last, Some(p) if first <= p) {
            return false;
        }
        prev_last = Some(last);
    }
    true
}

/// Builds the sorted entry list for a dataset's files.
///
/// Runs in O(n) when the files are in time order and O(n log k) otherwise
/// (n samples, k files).
///
/// # Errors
///
/// [`IndexError::Overlap`]; see [`EntryMerge`].
pub fn build_entries(files: &[DataFileDesc]) -> Result<Vec<IndexEntry>, IndexError> {
    if !in_time_order(files) {
        return EntryMerge::new(files).collect_all();
    }

    let total: usize = files.iter().map(|f| f.sample_count()).sum();
    let mut entries = Vec::with_capacity(total);
    for (file_id, file) in files.iter().enumerate() {
        for (position, &timestamp) in file.timestamps().iter().enumerate() {
            entries.push(IndexEntry {
                timestamp,
                file_id: file_id as u32,
                position: position as u64,
            });
        }
    }
    Ok(entries)
}
