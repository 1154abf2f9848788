//! Half-open index ranges over global matrix rows and columns.

use serde::{Deserialize, Serialize};

/// A half-open range `[start, end)` of global row or column indices.
///
/// Invariant: `start <= end`. Constructors check this with a debug assertion;
/// the compressors additionally validate every descriptor eagerly and report
/// violations as [`CompressError::InvalidConfiguration`](crate::CompressError)
/// before touching the accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    start: usize,
    end: usize,
}

impl IndexRange {
    /// Create a new range `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "index range start {start} > end {end}");
        Self { start, end }
    }

    /// Range covering a single index, `[index, index + 1)`.
    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index + 1,
        }
    }

    /// First index of the range.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last index of the range.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of indices covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the range covers no indices.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the range is well-formed (`start <= end`).
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// True when `index` falls inside the range.
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// True when `other` is fully contained in this range.
    pub fn contains_range(&self, other: &IndexRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Translate a global index into an offset relative to this range.
    ///
    /// Used to convert global row/column indices into block-local buffer
    /// offsets, with the enclosing cluster range as `self`.
    pub fn local(&self, global: usize) -> usize {
        debug_assert!(self.contains(global), "index {global} outside {self:?}");
        global - self.start
    }

    /// Iterate the global indices covered by the range.
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<std::ops::Range<usize>> for IndexRange {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}
