//! hcross: block compression primitives for hierarchical matrices.
//!
//! Dense operators from non-local problems (boundary integral equations,
//! covariance matrices, kernel methods) are quadratic to store but carry
//! blockwise low-rank structure: sub-blocks coupling well separated index
//! clusters are numerically degenerate. This crate compresses one such
//! block at a time:
//!
//! - `index` / `block`: half-open global index ranges and the per-block
//!   metadata (extent, cluster extents, admissibility) a compressor needs.
//! - `accessor`: the [`DataAccessor`] trait through which matrix entries
//!   are produced on demand; the full operator is never materialized.
//! - `compress`: the strategies. [`DenseCompressor`] stores a block
//!   verbatim, [`AcaCompressor`] builds a low-rank factorization by
//!   adaptive cross approximation with partial pivoting.
//! - `storage`: [`BlockData`], the dense-or-low-rank result, with
//!   matrix-vector products and memory accounting on both variants.
//! - `kernel`: kernel-backed accessors and point cloud generators for
//!   realistic workloads.
//!
//! # Why cross approximation
//!
//! A rank-`k` representation of an `m x n` block needs `k * (m + n)`
//! numbers instead of `m * n`, and ACA finds it from `O(k)` rows and
//! columns of the block without ever forming the rest. The cost of
//! assembly then scales with the compressed size, not the dense size,
//! which is what makes hierarchical matrices practical at all.
//!
//! The price is that ACA is a heuristic: it samples rows, so it can miss
//! structure a full SVD would see. Partial pivoting with random row
//! selection makes the failure modes rare in practice, and the stopping
//! test is relative, so the achieved accuracy tracks the block norm
//! rather than an absolute scale.
//!
//! # Determinism
//!
//! Pivot rows are drawn from a seedable generator. With
//! [`AcaConfig::seed`] pinned, compression of a given block is bit-for-bit
//! reproducible, independent of what other blocks are compressed around it
//! or from which thread.

pub mod accessor;
pub mod block;
pub mod compress;
pub mod error;
pub mod index;
pub mod kernel;
pub mod matrix;
pub mod storage;

// Re-exports
pub use accessor::{DataAccessor, EntryAccessor, MatrixAccessor};
pub use block::BlockDescriptor;
pub use compress::{AcaCompressor, AcaConfig, DenseCompressor};
pub use error::{CompressError, Result};
pub use index::IndexRange;
pub use matrix::DenseMatrix;
pub use storage::{BlockData, LowRankFactors};
