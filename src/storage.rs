//! Compressed block storage: exact dense copies and low-rank factor pairs.
//!
//! A compressed block is a sum type over the two representations the engine
//! produces, not a trait object: downstream consumers (matrix-vector
//! application, norm estimates, memory accounting, inspection) match on the
//! tag and carry no virtual dispatch.

use crate::error::{CompressError, Result};
use crate::matrix::DenseMatrix;

/// Owned factor pair `U · V` approximating one block.
///
/// `U` is `rows × rank` stored column-major and `V` is `rank × cols` stored
/// row-major, so committing a new rank-1 term appends one contiguous column
/// to `U` and one contiguous row to `V`. Buffer capacity (in rank-1 slots) is
/// tracked separately from the logical rank: the adaptive compressor grows
/// capacity in fixed increments while ranks are still being discovered, then
/// trims the slack before the factors are handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LowRankFactors {
    /// Column-major `rows × capacity`; first `rank` columns are live.
    u: Vec<f64>,
    /// Row-major `capacity × cols`; first `rank` rows are live.
    v: Vec<f64>,
    rows: usize,
    cols: usize,
    rank: usize,
    capacity: usize,
}

impl LowRankFactors {
    /// Rank-0 factors with room for `capacity` rank-1 terms, zero-filled.
    pub fn with_capacity(rows: usize, cols: usize, capacity: usize) -> Self {
        Self {
            u: vec![0.0; rows * capacity],
            v: vec![0.0; capacity * cols],
            rows,
            cols,
            rank: 0,
            capacity,
        }
    }

    /// Empty rank-0 factors with no capacity. Used for blocks where one
    /// dimension (or the rank cap) is zero.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self::with_capacity(rows, cols, 0)
    }

    /// Number of rows the approximation covers.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns the approximation covers.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of committed rank-1 terms.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of rank-1 slots the buffers can hold before regrowing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Grow both factor buffers by `increment` rank-1 slots, preserving
    /// committed terms and zero-filling the new region. One reallocation per
    /// buffer; the new slots sit at the tails.
    pub fn grow(&mut self, increment: usize) {
        self.capacity += increment;
        self.u.resize(self.rows * self.capacity, 0.0);
        self.v.resize(self.capacity * self.cols, 0.0);
    }

    /// Commit one rank-1 term: `col` becomes column `rank` of `U`, `row`
    /// becomes row `rank` of `V`. Capacity must have been grown beforehand.
    pub fn push_term(&mut self, col: &[f64], row: &[f64]) {
        assert!(self.rank < self.capacity, "no free rank-1 slot");
        debug_assert_eq!(col.len(), self.rows);
        debug_assert_eq!(row.len(), self.cols);
        self.u[self.rank * self.rows..(self.rank + 1) * self.rows].copy_from_slice(col);
        self.v[self.rank * self.cols..(self.rank + 1) * self.cols].copy_from_slice(row);
        self.rank += 1;
    }

    /// Drop slack capacity so the buffers hold exactly `rank` terms.
    pub fn trim(&mut self) {
        self.u.truncate(self.rank * self.rows);
        self.v.truncate(self.rank * self.cols);
        self.u.shrink_to_fit();
        self.v.shrink_to_fit();
        self.capacity = self.rank;
    }

    /// Column `k` of `U` (one rank-1 term's column factor), contiguous.
    #[inline]
    pub fn u_col(&self, k: usize) -> &[f64] {
        debug_assert!(k < self.rank);
        &self.u[k * self.rows..(k + 1) * self.rows]
    }

    /// Row `k` of `V` (one rank-1 term's row factor), contiguous.
    #[inline]
    pub fn v_row(&self, k: usize) -> &[f64] {
        debug_assert!(k < self.rank);
        &self.v[k * self.cols..(k + 1) * self.cols]
    }

    /// Entry `U[row, k]` (strided access across term columns).
    #[inline]
    pub fn u_value(&self, row: usize, k: usize) -> f64 {
        debug_assert!(row < self.rows && k < self.rank);
        self.u[k * self.rows + row]
    }

    /// Entry `V[k, col]` (strided access down one column of `V`).
    #[inline]
    pub fn v_value(&self, k: usize, col: usize) -> f64 {
        debug_assert!(k < self.rank && col < self.cols);
        self.v[k * self.cols + col]
    }

    /// True when every entry of the live region of both factors is finite.
    pub fn is_finite(&self) -> bool {
        self.u[..self.rank * self.rows].iter().all(|v| v.is_finite())
            && self.v[..self.rank * self.cols].iter().all(|v| v.is_finite())
    }

    /// Frobenius norm of `U · V` without reconstructing the block, via the
    /// Gram cross-term identity `‖UV‖² = Σᵢⱼ (uᵢ·uⱼ)(vᵢ·vⱼ)`.
    pub fn frobenius_norm(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.rank {
            for j in 0..self.rank {
                sum += dot(self.u_col(i), self.u_col(j)) * dot(self.v_row(i), self.v_row(j));
            }
        }
        // Rounding can push the accumulated sum a hair below zero.
        sum.max(0.0).sqrt()
    }

    /// Accumulate `y += alpha * (U·V) * x` through the factors: one pass over
    /// `V`, one pass over `U`, never forming the block.
    pub fn apply(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.cols);
        debug_assert_eq!(y.len(), self.rows);
        for k in 0..self.rank {
            let coeff = alpha * dot(self.v_row(k), x);
            for (yi, &ui) in y.iter_mut().zip(self.u_col(k).iter()) {
                *yi += coeff * ui;
            }
        }
    }

    /// Accumulate `y += alpha * (U·V)ᵀ * x` through the factors.
    pub fn apply_transpose(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.rows);
        debug_assert_eq!(y.len(), self.cols);
        for k in 0..self.rank {
            let coeff = alpha * dot(self.u_col(k), x);
            for (yj, &vj) in y.iter_mut().zip(self.v_row(k).iter()) {
                *yj += coeff * vj;
            }
        }
    }

    /// Reconstruct the dense `rows × cols` product `U · V`.
    pub fn to_dense(&self) -> DenseMatrix {
        let mut out = DenseMatrix::zeros(self.rows, self.cols);
        for k in 0..self.rank {
            let col = self.u_col(k);
            for (i, &ui) in col.iter().enumerate() {
                let row = out.row_mut(i);
                for (j, &vj) in self.v_row(k).iter().enumerate() {
                    row[j] += ui * vj;
                }
            }
        }
        out
    }

    /// Heap footprint of both factor buffers in bytes.
    pub fn memory_bytes(&self) -> usize {
        (self.u.len() + self.v.len()) * std::mem::size_of::<f64>()
    }
}

/// One compressed block: an exact dense copy or an adaptive low-rank
/// factorization. Created by one `compress_block` call, handed to the caller
/// by value; the compressor retains nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    /// Verbatim values of the block.
    Dense(DenseMatrix),
    /// Factor pair whose product approximates the block.
    LowRank(LowRankFactors),
}

impl BlockData {
    /// Number of rows the block covers.
    pub fn rows(&self) -> usize {
        match self {
            BlockData::Dense(m) => m.rows(),
            BlockData::LowRank(f) => f.rows(),
        }
    }

    /// Number of columns the block covers.
    pub fn cols(&self) -> usize {
        match self {
            BlockData::Dense(m) => m.cols(),
            BlockData::LowRank(f) => f.cols(),
        }
    }

    /// Representation rank: the number of rank-1 terms for low-rank storage,
    /// `min(rows, cols)` for an exact dense copy.
    pub fn rank(&self) -> usize {
        match self {
            BlockData::Dense(m) => m.rows().min(m.cols()),
            BlockData::LowRank(f) => f.rank(),
        }
    }

    /// True for the low-rank representation.
    pub fn is_low_rank(&self) -> bool {
        matches!(self, BlockData::LowRank(_))
    }

    /// Accumulate `y += alpha * M * x` where `M` is the stored block.
    ///
    /// `x` must have `cols()` entries and `y` must have `rows()` entries;
    /// mismatches are rejected before any arithmetic.
    pub fn apply(&self, alpha: f64, x: &[f64], y: &mut [f64]) -> Result<()> {
        self.check_apply_shape(x.len(), y.len(), false)?;
        match self {
            BlockData::Dense(m) => m.apply(alpha, x, y),
            BlockData::LowRank(f) => f.apply(alpha, x, y),
        }
        Ok(())
    }

    /// Accumulate `y += alpha * Mᵀ * x` where `M` is the stored block.
    pub fn apply_transpose(&self, alpha: f64, x: &[f64], y: &mut [f64]) -> Result<()> {
        self.check_apply_shape(x.len(), y.len(), true)?;
        match self {
            BlockData::Dense(m) => m.apply_transpose(alpha, x, y),
            BlockData::LowRank(f) => f.apply_transpose(alpha, x, y),
        }
        Ok(())
    }

    fn check_apply_shape(&self, x_len: usize, y_len: usize, transpose: bool) -> Result<()> {
        let (want_x, want_y) = if transpose {
            (self.rows(), self.cols())
        } else {
            (self.cols(), self.rows())
        };
        if x_len != want_x || y_len != want_y {
            return Err(CompressError::InvalidConfiguration(format!(
                "apply on a {}x{} block expects x of {want_x} and y of {want_y}, got {x_len} and {y_len}",
                self.rows(),
                self.cols()
            )));
        }
        Ok(())
    }

    /// Frobenius-norm estimate of the stored block. Exact for dense storage;
    /// for low-rank storage computed through the factors' Gram cross terms.
    pub fn frobenius_norm(&self) -> f64 {
        match self {
            BlockData::Dense(m) => m.frobenius_norm(),
            BlockData::LowRank(f) => f.frobenius_norm(),
        }
    }

    /// Heap footprint of the stored representation in bytes.
    pub fn memory_bytes(&self) -> usize {
        match self {
            BlockData::Dense(m) => m.memory_bytes(),
            BlockData::LowRank(f) => f.memory_bytes(),
        }
    }

    /// Ratio of the uncompressed block size to the stored size. Values above
    /// 1 indicate compression; dense storage reports exactly 1.
    pub fn compression_ratio(&self) -> f64 {
        let stored = self.memory_bytes();
        if stored == 0 {
            return 0.0;
        }
        let raw = self.rows() * self.cols() * std::mem::size_of::<f64>();
        raw as f64 / stored as f64
    }

    /// Reconstruct the block as a dense matrix for inspection.
    pub fn to_dense(&self) -> DenseMatrix {
        match self {
            BlockData::Dense(m) => m.clone(),
            BlockData::LowRank(f) => f.to_dense(),
        }
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
