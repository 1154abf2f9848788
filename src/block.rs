//! Block descriptors: the unit of work handed to the compressors.

use serde::{Deserialize, Serialize};

use crate::error::{CompressError, Result};
use crate::index::IndexRange;

/// Describes one leaf block of a matrix partition.
///
/// Built by the (external) partition builder and borrowed read-only by the
/// compression engine; immutable once constructed. Carries the block's row
/// and column extents, its admissibility flag, and the index ranges of the
/// enclosing row/column cluster nodes. The cluster ranges are what translate
/// global indices into block-local buffer offsets; for leaf blocks they
/// coincide with the block ranges, and the engine sizes its buffers from
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    row_range: IndexRange,
    col_range: IndexRange,
    admissible: bool,
    row_cluster_range: IndexRange,
    col_cluster_range: IndexRange,
}

impl BlockDescriptor {
    /// Descriptor for a leaf block whose extent is exactly the pairing of its
    /// row and column clusters, the shape every partition builder produces.
    pub fn leaf(row_cluster: IndexRange, col_cluster: IndexRange, admissible: bool) -> Self {
        Self {
            row_range: row_cluster,
            col_range: col_cluster,
            admissible,
            row_cluster_range: row_cluster,
            col_cluster_range: col_cluster,
        }
    }

    /// General constructor with distinct block and cluster ranges.
    pub fn new(
        row_range: IndexRange,
        col_range: IndexRange,
        admissible: bool,
        row_cluster_range: IndexRange,
        col_cluster_range: IndexRange,
    ) -> Self {
        Self {
            row_range,
            col_range,
            admissible,
            row_cluster_range,
            col_cluster_range,
        }
    }

    /// Global row extent of the block.
    pub fn row_range(&self) -> IndexRange {
        self.row_range
    }

    /// Global column extent of the block.
    pub fn col_range(&self) -> IndexRange {
        self.col_range
    }

    /// Whether the block's clusters are geometrically well separated, making
    /// the block numerically low-rank.
    pub fn admissible(&self) -> bool {
        self.admissible
    }

    /// Index range of the enclosing row cluster node.
    pub fn row_cluster_range(&self) -> IndexRange {
        self.row_cluster_range
    }

    /// Index range of the enclosing column cluster node.
    pub fn col_cluster_range(&self) -> IndexRange {
        self.col_cluster_range
    }

    /// Number of rows the compressed representation covers (the row cluster
    /// extent).
    pub fn rows(&self) -> usize {
        self.row_cluster_range.len()
    }

    /// Number of columns the compressed representation covers (the column
    /// cluster extent).
    pub fn cols(&self) -> usize {
        self.col_cluster_range.len()
    }

    /// Eager structural validation, run by the compressors before any
    /// accessor call.
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("row range", &self.row_range),
            ("column range", &self.col_range),
            ("row cluster range", &self.row_cluster_range),
            ("column cluster range", &self.col_cluster_range),
        ] {
            if !range.is_valid() {
                return Err(CompressError::InvalidConfiguration(format!(
                    "{name} [{}, {}) has start > end",
                    range.start(),
                    range.end()
                )));
            }
        }
        if !self.row_cluster_range.contains_range(&self.row_range) {
            return Err(CompressError::InvalidConfiguration(format!(
                "row range [{}, {}) not contained in row cluster [{}, {})",
                self.row_range.start(),
                self.row_range.end(),
                self.row_cluster_range.start(),
                self.row_cluster_range.end()
            )));
        }
        if !self.col_cluster_range.contains_range(&self.col_range) {
            return Err(CompressError::InvalidConfiguration(format!(
                "column range [{}, {}) not contained in column cluster [{}, {})",
                self.col_range.start(),
                self.col_range.end(),
                self.col_cluster_range.start(),
                self.col_cluster_range.end()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_block_ranges_match_clusters() {
        let block = BlockDescriptor::leaf(
            IndexRange::new(0, 10),
            IndexRange::new(20, 35),
            true,
        );
        assert_eq!(block.rows(), 10);
        assert_eq!(block.cols(), 15);
        assert_eq!(block.row_range(), block.row_cluster_range());
        assert!(block.admissible());
        assert!(block.validate().is_ok());
    }

    #[test]
    fn validate_rejects_escaping_block_range() {
        let block = BlockDescriptor::new(
            IndexRange::new(0, 12),
            IndexRange::new(0, 4),
            false,
            IndexRange::new(0, 10),
            IndexRange::new(0, 4),
        );
        assert!(matches!(
            block.validate(),
            Err(CompressError::InvalidConfiguration(_))
        ));
    }
}
