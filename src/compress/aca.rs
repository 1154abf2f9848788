//! Adaptive cross approximation with partial pivoting.
//!
//! Builds a low-rank representation of an admissible block one cross at a
//! time. Each iteration samples a random unused row, forms the residual row
//! against the current approximation, picks the column of largest residual
//! magnitude as pivot, and commits the resulting rank-one term. Only
//! `O(rank * (rows + cols))` matrix entries are ever requested from the
//! accessor, which is the entire point: the full block is never formed.
//!
//! Random row selection makes the algorithm robust against adversarial
//! orderings (a deterministic sweep can stall on structured kernels where
//! the leading rows are nearly dependent). Determinism is recovered by
//! pinning [`AcaConfig::seed`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::accessor::DataAccessor;
use crate::block::BlockDescriptor;
use crate::compress::DenseCompressor;
use crate::error::{CompressError, Result};
use crate::index::IndexRange;
use crate::matrix::DenseMatrix;
use crate::storage::{BlockData, LowRankFactors};

/// Residual rows whose largest magnitude falls below this are treated as
/// already represented and skipped without spending a rank slot.
const DEGENERATE_PIVOT_FLOOR: f64 = 1e-12;

/// Tuning knobs for [`AcaCompressor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcaConfig {
    /// Relative tolerance for the stopping test. A new cross with norm below
    /// `eps` times the running norm estimate of the approximation ends the
    /// iteration. Values `<= 0.0` disable early stopping so the iteration
    /// always runs to the rank cap.
    pub eps: f64,
    /// Hard upper bound on the rank of any produced block. The effective cap
    /// is additionally limited by the block dimensions.
    pub max_rank: usize,
    /// Number of rank slots added whenever the factor buffers fill up.
    /// Larger values trade memory slack for fewer reallocations.
    pub resize_threshold: usize,
    /// Seed for pivot row selection. `None` draws fresh entropy per block,
    /// `Some` makes compression fully reproducible.
    pub seed: Option<u64>,
}

impl Default for AcaConfig {
    fn default() -> Self {
        Self {
            eps: 1e-4,
            max_rank: 100,
            resize_threshold: 10,
            seed: None,
        }
    }
}

impl AcaConfig {
    /// Tight tolerance for verification runs where accuracy matters more
    /// than speed.
    pub fn high_accuracy() -> Self {
        Self {
            eps: 1e-10,
            max_rank: 500,
            ..Self::default()
        }
    }

    /// Loose tolerance for preconditioner-grade compression.
    pub fn fast() -> Self {
        Self {
            eps: 1e-2,
            max_rank: 30,
            ..Self::default()
        }
    }

    /// Pin the pivot sequence for reproducible output.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Low-rank block compressor driven by partial-pivot cross approximation.
///
/// Inadmissible blocks are delegated to [`DenseCompressor`] untouched, so a
/// single instance can compress every leaf of a block tree.
#[derive(Debug, Clone)]
pub struct AcaCompressor {
    config: AcaConfig,
}

impl AcaCompressor {
    /// Validates the configuration eagerly. A zero `resize_threshold` would
    /// stall the iteration with no capacity to grow into and is rejected
    /// here rather than mid-compression.
    pub fn new(config: AcaConfig) -> Result<Self> {
        if config.resize_threshold == 0 {
            return Err(CompressError::InvalidConfiguration(
                "resize_threshold must be at least 1".into(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &AcaConfig {
        &self.config
    }

    /// Compress one block of the operator.
    ///
    /// Admissible blocks get the cross approximation below; inadmissible
    /// ones are stored densely. The rank of a low-rank result is bounded by
    /// `min(max_rank, rows, cols)` and the factors are trimmed to exactly
    /// that rank before returning. Non-finite values in either factor,
    /// usually a symptom of an accessor emitting NaN or of catastrophic
    /// pivot growth, surface as [`CompressError::NumericalFailure`].
    pub fn compress_block<A: DataAccessor>(
        &self,
        accessor: &A,
        descriptor: &BlockDescriptor,
    ) -> Result<BlockData> {
        descriptor.validate()?;
        if !descriptor.admissible() {
            return DenseCompressor::new().compress_block(accessor, descriptor);
        }

        let row_cluster = descriptor.row_cluster_range();
        let col_cluster = descriptor.col_cluster_range();
        let rows = row_cluster.len();
        let cols = col_cluster.len();
        let rank_cap = self.config.max_rank.min(rows).min(cols);

        // Nothing to iterate on. Zero rank slots also means zero accessor
        // calls by contract.
        if rank_cap == 0 {
            return Ok(BlockData::LowRank(LowRankFactors::empty(rows, cols)));
        }

        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);

        // Unused pivot rows as local offsets, drawn uniformly without
        // replacement via swap_remove. Local offsets keep the pool compact;
        // blocks small enough to sit on the stack avoid an allocation.
        debug_assert!(rows <= u32::MAX as usize, "pivot pool stores u32 offsets");
        let mut pivot_pool: SmallVec<[u32; 64]> = (0..rows as u32).collect();

        let mut factors = LowRankFactors::with_capacity(rows, cols, self.config.resize_threshold);
        let mut row_buf = DenseMatrix::zeros(1, cols);
        let mut col_buf = DenseMatrix::zeros(rows, 1);

        // Squared Frobenius norm of the committed approximation, maintained
        // incrementally through the Gram cross terms.
        let mut approx_norm_sq = 0.0_f64;
        let mut iterations = 0usize;
        let mut skipped = 0usize;
        let mut stop_reason = "rank cap";

        for _ in 0..rank_cap {
            iterations += 1;
            let Some(local_row) = draw_pivot_row(&mut pivot_pool, &mut rng) else {
                // Every row has been tried; accept whatever rank we reached.
                stop_reason = "pivot pool exhausted";
                break;
            };
            let global_row = row_cluster.start() + local_row;

            // Residual row: true row minus the current approximation's row.
            accessor.compute_block(
                IndexRange::single(global_row),
                col_cluster,
                descriptor,
                &mut row_buf,
            )?;
            subtract_row_of_product(&factors, local_row, row_buf.data_mut());

            let (pivot_col, pivot_value) = largest_magnitude(row_buf.data());
            if pivot_value.abs() < DEGENERATE_PIVOT_FLOOR {
                // Row is already represented to machine precision. Skip it;
                // the iteration is consumed but no rank slot is.
                trace!(row = global_row, residual = pivot_value.abs(), "degenerate pivot row");
                skipped += 1;
                continue;
            }

            for value in row_buf.data_mut() {
                *value /= pivot_value;
            }

            // Residual column at the pivot.
            let global_col = col_cluster.start() + pivot_col;
            accessor.compute_block(
                row_cluster,
                IndexRange::single(global_col),
                descriptor,
                &mut col_buf,
            )?;
            subtract_column_of_product(&factors, pivot_col, col_buf.data_mut());

            // Stopping test against the norm of the approximation as it
            // stood before this term. The converged term is still committed.
            let term_norm = norm(col_buf.data()) * norm(row_buf.data());
            let converged = term_norm < self.config.eps * approx_norm_sq.sqrt();

            let mut gram_cross = 0.0;
            for k in 0..factors.rank() {
                gram_cross += dot(factors.u_col(k), col_buf.data())
                    * dot(factors.v_row(k), row_buf.data());
            }
            approx_norm_sq += term_norm * term_norm + 2.0 * gram_cross;
            approx_norm_sq = approx_norm_sq.max(0.0);

            if factors.rank() == factors.capacity() {
                factors.grow(self.config.resize_threshold);
            }
            factors.push_term(col_buf.data(), row_buf.data());

            if converged {
                stop_reason = "converged";
                break;
            }
        }

        factors.trim();
        if !factors.is_finite() {
            return Err(CompressError::NumericalFailure(format!(
                "non-finite entries in rank-{} factors of {}x{} block",
                factors.rank(),
                rows,
                cols
            )));
        }
        debug!(
            rows,
            cols,
            rank = factors.rank(),
            iterations,
            skipped,
            reason = stop_reason,
            "compressed admissible block"
        );
        Ok(BlockData::LowRank(factors))
    }
}

/// Uniform draw without replacement from the remaining pivot rows.
fn draw_pivot_row(pool: &mut SmallVec<[u32; 64]>, rng: &mut StdRng) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }
    let chosen = rng.random_range(0..pool.len());
    Some(pool.swap_remove(chosen) as usize)
}

/// `residual -= U[row, :] * V`, reading one strided coefficient per term and
/// streaming the contiguous rows of `V`.
fn subtract_row_of_product(factors: &LowRankFactors, row: usize, residual: &mut [f64]) {
    for k in 0..factors.rank() {
        let coeff = factors.u_value(row, k);
        if coeff == 0.0 {
            continue;
        }
        for (r, &v) in residual.iter_mut().zip(factors.v_row(k)) {
            *r -= coeff * v;
        }
    }
}

/// `residual -= U * V[:, col]`, the column-side twin.
fn subtract_column_of_product(factors: &LowRankFactors, col: usize, residual: &mut [f64]) {
    for k in 0..factors.rank() {
        let coeff = factors.v_value(k, col);
        if coeff == 0.0 {
            continue;
        }
        for (r, &u) in residual.iter_mut().zip(factors.u_col(k)) {
            *r -= coeff * u;
        }
    }
}

/// Index and signed value of the entry with largest magnitude. NaN entries
/// never win the comparison, so a poisoned row falls through to the final
/// finiteness check instead of being selected as pivot.
fn largest_magnitude(values: &[f64]) -> (usize, f64) {
    let mut best_index = 0;
    let mut best_abs = -1.0;
    for (index, &value) in values.iter().enumerate() {
        if value.abs() > best_abs {
            best_abs = value.abs();
            best_index = index;
        }
    }
    (best_index, values[best_index])
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(values: &[f64]) -> f64 {
    dot(values, values).sqrt()
}
