use std::iter::FusedIterator;
use std::slice;

use crate::{IndexEntry, IndexError, Timestamp};

/// Lazy iterator over the entries of a sorted index whose timestamps fall in
/// `[start, end]` (both inclusive), in ascending order.
///
/// The bounds are located with two binary searches; iteration then walks the
/// matching slice without copying it.
#[derive(Debug, Clone)]
pub struct RangeIter<'a> {
    inner: slice::Iter<'a, IndexEntry>,
}

impl<'a> RangeIter<'a> {
    /// `entries` must be sorted by timestamp.
    ///
    /// # Errors
    ///
    /// [`IndexError::InvalidRange`] if `start > end`. A valid range with no
    /// matching entries yields an empty iterator.
    pub fn new(
        entries: &'a [IndexEntry],
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Self, IndexError> {
        if start > end {
            return Err(IndexError::InvalidRange { start, end });
        }
        let lo = entries.partition_point(|e| e.timestamp < start);
        let hi = entries.partition_point(|e| e.timestamp <= end);
        Ok(Self {
            inner: entries[lo..hi].iter(),
        })
    }

    /// The matching entries not yet yielded.
    pub fn as_slice(&self) -> &'a [IndexEntry] {
        self.inner.as_slice()
    }
}

impl Iterator for RangeIter<'_> {
    type Item = IndexEntry;

    fn next(&mut self) -> Option<IndexEntry> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for RangeIter<'_> {
    fn next_back(&mut self) -> Option<IndexEntry> {
        self.inner.next_back().copied()
    }
}

impl ExactSizeIterator for RangeIter<'_> {}

impl FusedIterator for RangeIter<'_> {}
