//! Shared-compressor concurrency: compressing many blocks in parallel must
//! give the same result as compressing them one by one, because each block
//! derives its pivot sequence from the config seed alone.

use rayon::prelude::*;

use hcross::kernel::{laplace_single_layer, separated_clouds, KernelAccessor};
use hcross::{AcaCompressor, AcaConfig, BlockData, BlockDescriptor, IndexRange};

/// Tile a target x source grid into leaf blocks. Diagonal tiles are treated
/// as near field and marked inadmissible.
fn tile_blocks(points: usize, tile: usize) -> Vec<BlockDescriptor> {
    let mut blocks = Vec::new();
    for row_tile in (0..points).step_by(tile) {
        for col_tile in (0..points).step_by(tile) {
            let rows = IndexRange::new(row_tile, (row_tile + tile).min(points));
            let cols = IndexRange::new(col_tile, (col_tile + tile).min(points));
            let admissible = row_tile != col_tile;
            blocks.push(BlockDescriptor::leaf(rows, cols, admissible));
        }
    }
    blocks
}

fn as_entries(data: &BlockData) -> Vec<f64> {
    data.to_dense().data().to_vec()
}

#[test]
fn parallel_compression_matches_serial() {
    let points = 96;
    let (targets, sources) = separated_clouds(points, points, 1.2, 4321);
    let accessor = KernelAccessor::new(targets, sources, laplace_single_layer);
    let blocks = tile_blocks(points, 32);
    assert_eq!(blocks.len(), 9);

    let config = AcaConfig {
        eps: 1e-6,
        max_rank: 24,
        ..AcaConfig::default()
    }
    .with_seed(365);
    let compressor = AcaCompressor::new(config).unwrap();

    let serial: Vec<BlockData> = blocks
        .iter()
        .map(|block| compressor.compress_block(&accessor, block).unwrap())
        .collect();

    let parallel: Vec<BlockData> = blocks
        .par_iter()
        .map(|block| compressor.compress_block(&accessor, block).unwrap())
        .collect();

    for (block, (s, p)) in blocks.iter().zip(serial.iter().zip(&parallel)) {
        assert_eq!(s.is_low_rank(), block.admissible());
        assert_eq!(s.rank(), p.rank());
        assert_eq!(as_entries(s), as_entries(p));
    }
}

#[test]
fn parallel_runs_are_stable_across_repeats() {
    let points = 64;
    let (targets, sources) = separated_clouds(points, points, 1.0, 777);
    let accessor = KernelAccessor::new(targets, sources, laplace_single_layer);
    let blocks = tile_blocks(points, 16);
    let compressor = AcaCompressor::new(AcaConfig::default().with_seed(52)).unwrap();

    let run = || -> Vec<Vec<f64>> {
        blocks
            .par_iter()
            .map(|block| as_entries(&compressor.compress_block(&accessor, block).unwrap()))
            .collect()
    };
    assert_eq!(run(), run());
}
