//! Exact dense compression for inadmissible (near-field) blocks.

use tracing::debug;

use crate::accessor::DataAccessor;
use crate::block::BlockDescriptor;
use crate::error::Result;
use crate::matrix::DenseMatrix;
use crate::storage::BlockData;

/// Trivial strategy: one accessor call over the full block extent, stored
/// verbatim.
///
/// Meant for blocks whose clusters are not well separated, where no low-rank
/// structure can be assumed; the adaptive compressor delegates those here.
/// Calling it directly on an admissible block is allowed and simply stores
/// the block exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseCompressor;

impl DenseCompressor {
    pub fn new() -> Self {
        Self
    }

    /// Fill a dense copy of the block. Output is bit-for-bit what the
    /// accessor returns; the only side effect is a single accessor call
    /// covering the full cluster extent.
    pub fn compress_block<A: DataAccessor>(
        &self,
        accessor: &A,
        descriptor: &BlockDescriptor,
    ) -> Result<BlockData> {
        descriptor.validate()?;
        let rows = descriptor.row_cluster_range();
        let cols = descriptor.col_cluster_range();
        let mut out = DenseMatrix::zeros(rows.len(), cols.len());
        accessor.compute_block(rows, cols, descriptor, &mut out)?;
        debug!(
            rows = rows.len(),
            cols = cols.len(),
            bytes = out.memory_bytes(),
            "stored block densely"
        );
        Ok(BlockData::Dense(out))
    }
}
