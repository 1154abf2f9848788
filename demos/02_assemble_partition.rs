//! Partition assembly
//!
//! Compresses a whole leaf partition: the target/source pairing is tiled
//! into blocks, diagonal tiles are treated as near field and stored densely,
//! off-diagonal tiles go through adaptive cross approximation. Prints the
//! per-tile ranks and the aggregate memory win.
//!
//! ```bash
//! cargo run --example 02_assemble_partition --release
//! ```

use hcross::kernel::{laplace_single_layer, separated_clouds, KernelAccessor};
use hcross::{AcaCompressor, AcaConfig, BlockData, BlockDescriptor, IndexRange};

fn main() -> hcross::Result<()> {
    let points = 512;
    let tile = 128;
    let (targets, sources) = separated_clouds(points, points, 1.0, 2024);
    let accessor = KernelAccessor::new(targets, sources, laplace_single_layer);

    // A real assembly would take the partition from a cluster tree; a
    // regular tiling with inadmissible diagonal stands in for it here.
    let mut blocks = Vec::new();
    for row in (0..points).step_by(tile) {
        for col in (0..points).step_by(tile) {
            blocks.push(BlockDescriptor::leaf(
                IndexRange::new(row, row + tile),
                IndexRange::new(col, col + tile),
                row != col,
            ));
        }
    }

    let compressor = AcaCompressor::new(
        AcaConfig {
            eps: 1e-6,
            max_rank: 64,
            ..AcaConfig::default()
        }
        .with_seed(1),
    )?;

    let mut compressed_bytes = 0usize;
    let mut dense_bytes = 0usize;
    println!("tile     kind      rank   bytes");
    for block in &blocks {
        let data = compressor.compress_block(&accessor, block)?;
        let kind = match &data {
            BlockData::Dense(_) => "dense",
            BlockData::LowRank(_) => "low-rank",
        };
        println!(
            "{:>3},{:<3} {:<9} {:>4} {:>7}",
            block.row_range().start(),
            block.col_range().start(),
            kind,
            data.rank(),
            data.memory_bytes()
        );
        compressed_bytes += data.memory_bytes();
        dense_bytes += block.rows() * block.cols() * std::mem::size_of::<f64>();
    }

    println!(
        "\ntotal: {} bytes compressed vs {} dense ({:.1}x)",
        compressed_bytes,
        dense_bytes,
        dense_bytes as f64 / compressed_bytes as f64
    );

    Ok(())
}
