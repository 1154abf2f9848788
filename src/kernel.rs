//! Kernel-backed accessors and point cloud generators.
//!
//! Boundary element assembly is the motivating workload: matrix entries are
//! kernel evaluations between target and source points, and blocks pairing
//! well separated clouds are numerically low rank. [`KernelAccessor`] wires
//! any such kernel into the [`DataAccessor`] contract, and the generators
//! here produce reproducible clouds for tests and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::accessor::{check_block_shape, DataAccessor};
use crate::block::BlockDescriptor;
use crate::error::{CompressError, Result};
use crate::index::IndexRange;
use crate::matrix::DenseMatrix;

/// Entry generator over two point clouds. Rows index targets, columns index
/// sources, and entry `(i, j)` is `kernel(targets[i], sources[j])`.
pub struct KernelAccessor<K> {
    targets: Vec<[f64; 3]>,
    sources: Vec<[f64; 3]>,
    kernel: K,
}

impl<K> KernelAccessor<K>
where
    K: Fn(&[f64; 3], &[f64; 3]) -> f64 + Sync,
{
    pub fn new(targets: Vec<[f64; 3]>, sources: Vec<[f64; 3]>, kernel: K) -> Self {
        Self {
            targets,
            sources,
            kernel,
        }
    }

    /// Number of target points, i.e. global rows this accessor can serve.
    pub fn rows(&self) -> usize {
        self.targets.len()
    }

    /// Number of source points, i.e. global columns this accessor can serve.
    pub fn cols(&self) -> usize {
        self.sources.len()
    }
}

impl<K> DataAccessor for KernelAccessor<K>
where
    K: Fn(&[f64; 3], &[f64; 3]) -> f64 + Sync,
{
    fn compute_block(
        &self,
        rows: IndexRange,
        cols: IndexRange,
        _block: &BlockDescriptor,
        out: &mut DenseMatrix,
    ) -> Result<()> {
        check_block_shape(rows, cols, out)?;
        if rows.end() > self.targets.len() || cols.end() > self.sources.len() {
            return Err(CompressError::Accessor(format!(
                "point indices out of range: rows end at {} of {} targets, cols end at {} of {} sources",
                rows.end(),
                self.targets.len(),
                cols.end(),
                self.sources.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            let target = &self.targets[row];
            for (j, col) in cols.iter().enumerate() {
                out.set(i, j, (self.kernel)(target, &self.sources[col]));
            }
        }
        Ok(())
    }
}

/// Laplace single layer kernel `1 / (4 pi |x - y|)`.
///
/// Coincident points would be singular; those evaluate to `0.0`, matching
/// the usual convention of treating the self term separately.
pub fn laplace_single_layer(x: &[f64; 3], y: &[f64; 3]) -> f64 {
    let distance = squared_distance(x, y).sqrt();
    if distance == 0.0 {
        return 0.0;
    }
    1.0 / (4.0 * std::f64::consts::PI * distance)
}

fn squared_distance(x: &[f64; 3], y: &[f64; 3]) -> f64 {
    let dx = x[0] - y[0];
    let dy = x[1] - y[1];
    let dz = x[2] - y[2];
    dx * dx + dy * dy + dz * dz
}

/// Uniformly random points in the unit cube.
pub fn unit_cube_cloud(count: usize, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            [
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
            ]
        })
        .collect()
}

/// Two unit cube clouds whose faces are `gap` apart along the x axis, so
/// every target/source pair is at distance `>= gap`. Blocks over such a
/// pair are admissible in the usual sense and compress to low rank under
/// smooth kernels.
pub fn separated_clouds(
    targets: usize,
    sources: usize,
    gap: f64,
    seed: u64,
) -> (Vec<[f64; 3]>, Vec<[f64; 3]>) {
    let target_cloud = unit_cube_cloud(targets, seed);
    let mut source_cloud = unit_cube_cloud(sources, seed.wrapping_add(1));
    for point in &mut source_cloud {
        point[0] += 1.0 + gap;
    }
    (target_cloud, source_cloud)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separated_clouds_respect_the_gap() {
        let (targets, sources) = separated_clouds(40, 30, 1.5, 42);
        assert_eq!(targets.len(), 40);
        assert_eq!(sources.len(), 30);
        for t in &targets {
            for s in &sources {
                assert!(squared_distance(t, s).sqrt() >= 1.5);
            }
        }
    }

    #[test]
    fn laplace_kernel_is_symmetric_and_decaying() {
        let a = [0.0, 0.0, 0.0];
        let b = [2.0, 0.0, 0.0];
        let c = [4.0, 0.0, 0.0];
        assert_eq!(laplace_single_layer(&a, &b), laplace_single_layer(&b, &a));
        assert!(laplace_single_layer(&a, &b) > laplace_single_layer(&a, &c));
        assert_eq!(laplace_single_layer(&a, &a), 0.0);
    }

    #[test]
    fn accessor_evaluates_kernel_at_global_indices() {
        let (targets, sources) = separated_clouds(10, 10, 1.0, 7);
        let expected = laplace_single_layer(&targets[4], &sources[6]);
        let accessor = KernelAccessor::new(targets, sources, laplace_single_layer);
        let block = BlockDescriptor::leaf(IndexRange::new(2, 8), IndexRange::new(5, 9), true);
        let mut out = DenseMatrix::zeros(6, 4);
        accessor
            .compute_block(IndexRange::new(2, 8), IndexRange::new(5, 9), &block, &mut out)
            .expect("accessor failed");
        assert_eq!(out.value(2, 1), expected);
    }

    #[test]
    fn accessor_rejects_out_of_range_points() {
        let (targets, sources) = separated_clouds(5, 5, 1.0, 7);
        let accessor = KernelAccessor::new(targets, sources, laplace_single_layer);
        let block = BlockDescriptor::leaf(IndexRange::new(0, 9), IndexRange::new(0, 5), true);
        let mut out = DenseMatrix::zeros(9, 5);
        let result =
            accessor.compute_block(IndexRange::new(0, 9), IndexRange::new(0, 5), &block, &mut out);
        assert!(matches!(result, Err(CompressError::Accessor(_))));
    }
}
