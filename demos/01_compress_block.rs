//! Basic block compression
//!
//! The minimal example: one far-field block, compressed adaptively.
//!
//! ```bash
//! cargo run --example 01_compress_block --release
//! ```

use hcross::kernel::{laplace_single_layer, separated_clouds, KernelAccessor};
use hcross::{AcaCompressor, AcaConfig, BlockDescriptor, DenseCompressor, IndexRange};

fn main() -> hcross::Result<()> {
    // Two clouds of 256 points each, one unit cube apart: every
    // target/source pair is well separated, so the interaction block is
    // numerically low rank.
    let n = 256;
    let (targets, sources) = separated_clouds(n, n, 1.0, 42);
    let accessor = KernelAccessor::new(targets, sources, laplace_single_layer);

    // One leaf block covering the full pairing, flagged admissible.
    let block = BlockDescriptor::leaf(IndexRange::new(0, n), IndexRange::new(0, n), true);

    // 1. Compress adaptively.
    //    - eps=1e-6: relative accuracy target
    //    - max_rank=64: hard cap, rarely reached in the far field
    let config = AcaConfig {
        eps: 1e-6,
        max_rank: 64,
        ..AcaConfig::default()
    }
    .with_seed(7);
    let compressed = AcaCompressor::new(config)?.compress_block(&accessor, &block)?;

    // 2. Assemble the same block densely for comparison.
    let dense = DenseCompressor::new().compress_block(&accessor, &block)?;

    // 3. Report what the compression bought.
    let diff = {
        let (a, b) = (compressed.to_dense(), dense.to_dense());
        let err_sq: f64 = a
            .data()
            .iter()
            .zip(b.data())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        err_sq.sqrt()
    };
    println!("block:        {}x{}", block.rows(), block.cols());
    println!("rank:         {}", compressed.rank());
    println!(
        "memory:       {} bytes compressed vs {} dense",
        compressed.memory_bytes(),
        dense.memory_bytes()
    );
    println!("ratio:        {:.1}x", compressed.compression_ratio());
    println!(
        "rel. error:   {:.2e}",
        diff / dense.frobenius_norm()
    );

    Ok(())
}
