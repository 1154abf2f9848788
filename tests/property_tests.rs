//! Property-based tests for block compression.
//!
//! These verify invariants that should hold for any input:
//! - Low-rank results never exceed the configured rank cap
//! - Factor buffers are trimmed to their logical rank
//! - Dense compression is an exact copy
//! - Matrix-vector products through compressed blocks match dense ones
//! - Finite input never produces non-finite factors

use proptest::prelude::*;

use hcross::{
    AcaCompressor, AcaConfig, BlockData, BlockDescriptor, DenseCompressor, EntryAccessor,
    IndexRange,
};

/// Random dense matrix as (rows, cols, row-major data).
fn arb_matrix() -> impl Strategy<Value = (usize, usize, Vec<f64>)> {
    (1usize..=12, 1usize..=12).prop_flat_map(|(rows, cols)| {
        (
            Just(rows),
            Just(cols),
            prop::collection::vec(-10.0f64..10.0, rows * cols),
        )
    })
}

fn leaf(rows: usize, cols: usize, admissible: bool) -> BlockDescriptor {
    BlockDescriptor::leaf(IndexRange::new(0, rows), IndexRange::new(0, cols), admissible)
}

fn compress(
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    config: AcaConfig,
) -> hcross::Result<BlockData> {
    let accessor = EntryAccessor(move |i, j| data[i * cols + j]);
    AcaCompressor::new(config)?.compress_block(&accessor, &leaf(rows, cols, true))
}

mod rank_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn rank_never_exceeds_cap(
            (rows, cols, data) in arb_matrix(),
            max_rank in 0usize..20,
            seed in any::<u64>(),
        ) {
            let config = AcaConfig { max_rank, seed: Some(seed), ..AcaConfig::default() };
            let block = compress(rows, cols, data, config).expect("compression failed");
            let cap = max_rank.min(rows).min(cols);
            prop_assert!(
                block.rank() <= cap,
                "rank {} exceeds cap {} for {}x{}",
                block.rank(), cap, rows, cols
            );
        }

        #[test]
        fn factors_are_trimmed_to_rank(
            (rows, cols, data) in arb_matrix(),
            seed in any::<u64>(),
            resize_threshold in 1usize..8,
        ) {
            let config = AcaConfig {
                resize_threshold,
                seed: Some(seed),
                ..AcaConfig::default()
            };
            match compress(rows, cols, data, config).expect("compression failed") {
                BlockData::LowRank(factors) => {
                    prop_assert_eq!(factors.capacity(), factors.rank());
                }
                BlockData::Dense(_) => prop_assert!(false, "admissible block stored densely"),
            }
        }

        #[test]
        fn finite_input_gives_finite_factors(
            (rows, cols, data) in arb_matrix(),
            seed in any::<u64>(),
        ) {
            let config = AcaConfig { seed: Some(seed), ..AcaConfig::default() };
            let block = compress(rows, cols, data, config).expect("compression failed");
            prop_assert!(block.frobenius_norm().is_finite());
        }

        #[test]
        fn exhaustive_run_reconstructs_the_block(
            (rows, cols, data) in arb_matrix(),
            seed in any::<u64>(),
        ) {
            // eps <= 0 disables early stopping, so the iteration visits
            // min(rows, cols) pivot rows and interpolates the block.
            let config = AcaConfig {
                eps: 0.0,
                max_rank: 16,
                seed: Some(seed),
                ..AcaConfig::default()
            };
            let reference = data.clone();
            let block = compress(rows, cols, data, config).expect("compression failed");
            let approx = block.to_dense();
            let mut err = 0.0f64;
            let mut scale = 1.0f64;
            for i in 0..rows {
                for j in 0..cols {
                    err = err.max((reference[i * cols + j] - approx.value(i, j)).abs());
                    scale = scale.max(reference[i * cols + j].abs());
                }
            }
            prop_assert!(
                err <= 1e-6 * scale,
                "max entry error {} too large for scale {}",
                err, scale
            );
        }
    }
}

mod dense_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn dense_strategy_is_exact(
            (rows, cols, data) in arb_matrix(),
        ) {
            let reference = data.clone();
            let accessor = EntryAccessor(move |i, j| data[i * cols + j]);
            let block = DenseCompressor::new()
                .compress_block(&accessor, &leaf(rows, cols, false))
                .expect("compression failed");
            let dense = block.to_dense();
            for i in 0..rows {
                for j in 0..cols {
                    prop_assert_eq!(dense.value(i, j), reference[i * cols + j]);
                }
            }
        }
    }
}

mod apply_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn compressed_apply_matches_dense_apply(
            (rows, cols, data) in arb_matrix(),
            seed in any::<u64>(),
            alpha in -2.0f64..2.0,
        ) {
            let config = AcaConfig { seed: Some(seed), ..AcaConfig::default() };
            let block = compress(rows, cols, data, config).expect("compression failed");
            let dense = block.to_dense();

            let x: Vec<f64> = (0..cols).map(|j| (j as f64 * 0.7).sin()).collect();
            let mut y_block = vec![0.5; rows];
            let mut y_dense = vec![0.5; rows];
            block.apply(alpha, &x, &mut y_block).expect("apply failed");
            dense.apply(alpha, &x, &mut y_dense);
            for (a, b) in y_block.iter().zip(&y_dense) {
                prop_assert!(
                    (a - b).abs() <= 1e-9 * (1.0 + b.abs()),
                    "apply mismatch: {} vs {}",
                    a, b
                );
            }
        }

        #[test]
        fn compressed_transpose_apply_matches_dense(
            (rows, cols, data) in arb_matrix(),
            seed in any::<u64>(),
        ) {
            let config = AcaConfig { seed: Some(seed), ..AcaConfig::default() };
            let block = compress(rows, cols, data, config).expect("compression failed");
            let dense = block.to_dense();

            let x: Vec<f64> = (0..rows).map(|i| 1.0 / (1.0 + i as f64)).collect();
            let mut y_block = vec![0.0; cols];
            let mut y_dense = vec![0.0; cols];
            block
                .apply_transpose(1.0, &x, &mut y_block)
                .expect("apply failed");
            dense.apply_transpose(1.0, &x, &mut y_dense);
            for (a, b) in y_block.iter().zip(&y_dense) {
                prop_assert!(
                    (a - b).abs() <= 1e-9 * (1.0 + b.abs()),
                    "transpose apply mismatch: {} vs {}",
                    a, b
                );
            }
        }
    }
}
