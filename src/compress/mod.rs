//! Block compression strategies.
//!
//! Two interchangeable strategies produce [`BlockData`](crate::storage::BlockData)
//! from a [`DataAccessor`](crate::accessor::DataAccessor) and a
//! [`BlockDescriptor`](crate::block::BlockDescriptor):
//!
//! - [`DenseCompressor`] evaluates the whole block once and stores it
//!   verbatim. Exact, and the right call for near-field blocks.
//! - [`AcaCompressor`] builds a low-rank factorization by adaptive cross
//!   approximation, touching only a thin sample of rows and columns. It
//!   falls back to dense storage on inadmissible blocks by itself.
//!
//! Both strategies are cheap to construct and take `&self`, so one instance
//! can serve many blocks, including from worker threads.

mod aca;
mod dense;

pub use aca::{AcaCompressor, AcaConfig};
pub use dense::DenseCompressor;
