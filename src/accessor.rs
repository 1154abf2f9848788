//! The entry-evaluator seam: on-demand block evaluation.

use crate::block::BlockDescriptor;
use crate::error::{CompressError, Result};
use crate::index::IndexRange;
use crate::matrix::DenseMatrix;

/// On-demand evaluator for sub-blocks of the underlying operator matrix.
///
/// Given global row and column index ranges plus the block being assembled,
/// fill `out` with the true values of that sub-block. Implementations must
/// be side-effect-free, deterministic (same inputs, same outputs) and safe
/// to invoke concurrently; the `Sync` bound carries that requirement into
/// the type system, since callers compress independent blocks in parallel.
/// Cost is expected proportional to `rows.len() * cols.len()`; the adaptive
/// compressor exploits this by only ever requesting single rows and columns
/// of admissible blocks.
pub trait DataAccessor: Sync {
    /// Fill `out` with the true values of `rows × cols`.
    ///
    /// `out` is caller-allocated and must already have the requested shape;
    /// implementations should verify this with [`check_block_shape`] before
    /// computing anything.
    fn compute_block(
        &self,
        rows: IndexRange,
        cols: IndexRange,
        block: &BlockDescriptor,
        out: &mut DenseMatrix,
    ) -> Result<()>;
}

/// Adapter turning an entrywise function `f(global_row, global_col)` into a
/// [`DataAccessor`]. Handy for tests and for operators whose entries are
/// cheap closed-form expressions.
pub struct EntryAccessor<F: Fn(usize, usize) -> f64 + Sync>(pub F);

impl<F: Fn(usize, usize) -> f64 + Sync> DataAccessor for EntryAccessor<F> {
    fn compute_block(
        &self,
        rows: IndexRange,
        cols: IndexRange,
        _block: &BlockDescriptor,
        out: &mut DenseMatrix,
    ) -> Result<()> {
        check_block_shape(rows, cols, out)?;
        for (i, row) in rows.iter().enumerate() {
            let out_row = out.row_mut(i);
            for (j, col) in cols.iter().enumerate() {
                out_row[j] = (self.0)(row, col);
            }
        }
        Ok(())
    }
}

/// [`DataAccessor`] backed by an already materialized matrix sitting at a
/// fixed position in the global index space. Useful for re-compressing a
/// block that was assembled densely, and as ground truth in tests.
pub struct MatrixAccessor {
    matrix: DenseMatrix,
    rows: IndexRange,
    cols: IndexRange,
}

impl MatrixAccessor {
    /// Place `matrix` so that its entry `(0, 0)` lives at global position
    /// `(rows.start(), cols.start())`.
    pub fn new(matrix: DenseMatrix, rows: IndexRange, cols: IndexRange) -> Result<Self> {
        if matrix.rows() != rows.len() || matrix.cols() != cols.len() {
            return Err(CompressError::InvalidConfiguration(format!(
                "matrix is {}x{} but the covered ranges are {}x{}",
                matrix.rows(),
                matrix.cols(),
                rows.len(),
                cols.len()
            )));
        }
        Ok(Self { matrix, rows, cols })
    }
}

impl DataAccessor for MatrixAccessor {
    fn compute_block(
        &self,
        rows: IndexRange,
        cols: IndexRange,
        _block: &BlockDescriptor,
        out: &mut DenseMatrix,
    ) -> Result<()> {
        check_block_shape(rows, cols, out)?;
        if !self.rows.contains_range(&rows) || !self.cols.contains_range(&cols) {
            return Err(CompressError::Accessor(format!(
                "requested {rows:?} x {cols:?} escapes the covered {:?} x {:?}",
                self.rows, self.cols
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            let local_row = self.rows.local(row);
            let out_row = out.row_mut(i);
            for (j, col) in cols.iter().enumerate() {
                out_row[j] = self.matrix.value(local_row, self.cols.local(col));
            }
        }
        Ok(())
    }
}

/// Eager output-buffer contract check shared by accessor implementations:
/// the buffer's dimensions must match the requested index ranges exactly.
pub fn check_block_shape(rows: IndexRange, cols: IndexRange, out: &DenseMatrix) -> Result<()> {
    if out.rows() != rows.len() || out.cols() != cols.len() {
        return Err(CompressError::InvalidConfiguration(format!(
            "output buffer is {}x{} but the requested ranges are {}x{}",
            out.rows(),
            out.cols(),
            rows.len(),
            cols.len()
        )));
    }
    Ok(())
}
