//! Error types for block compression.

use thiserror::Error;

/// Errors that can occur while compressing a single block.
///
/// Every variant is fatal for the block being compressed and for that block
/// only; sibling blocks of the same partition are unaffected. Running out of
/// unused pivot rows is *not* an error: the rank-growth loop terminates
/// gracefully and returns whatever rank was built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompressError {
    /// The entry evaluator could not produce the requested values.
    ///
    /// Propagated immediately; the engine never retries internally. Retry
    /// policy, if any, belongs to the caller or its scheduler.
    #[error("accessor failed: {0}")]
    Accessor(String),

    /// Malformed block or buffer size contract, e.g. an output buffer whose
    /// dimensions do not match the requested index ranges, or a descriptor
    /// whose block ranges fall outside its cluster ranges.
    ///
    /// Detected eagerly, before any accessor call is made.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Non-finite values detected in a completed low-rank approximation.
    ///
    /// Should not happen under correct accessor behavior; guards against
    /// ill-conditioned near-degenerate blocks feeding extreme cancellation.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),
}

/// Result type for compression operations.
pub type Result<T> = std::result::Result<T, CompressError>;
