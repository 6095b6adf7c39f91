//! Common test utilities for zvd-shape integration tests
//!
//! Helpers for building chunked byte streams and for inspecting tap tables
//! by absolute input position.

#![allow(dead_code)]

use zvd_shape::resampler::TapTable;
use zvd_shape::util::Buffer;

// ============================================================================
// Byte streams
// ============================================================================

/// A byte ramp `0, 1, 2, ...` wrapping at 256
pub fn ramp(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

/// Split `data` into chunks of the given sizes, cycling through `sizes`
pub fn chunked(data: &[u8], sizes: &[usize]) -> Vec<Buffer> {
    assert!(sizes.iter().all(|&s| s > 0), "chunk sizes must be positive");
    let mut chunks = Vec::new();
    let mut pos = 0;
    for &size in sizes.iter().cycle() {
        if pos >= data.len() {
            break;
        }
        let end = (pos + size).min(data.len());
        chunks.push(Buffer::copy_from_slice(&data[pos..end]));
        pos = end;
    }
    chunks
}

// ============================================================================
// Tap tables
// ============================================================================

/// Weights of output `j` spread over all `in_size` input positions
pub fn dense_row(table: &TapTable, j: usize) -> Vec<f64> {
    let mut dense = vec![0.0; table.in_size()];
    let offset = table.offset(j);
    for (l, w) in table.taps(j).iter().enumerate() {
        dense[offset + l] += w;
    }
    dense
}

/// Sum of the weights of output `j`
pub fn row_sum(table: &TapTable, j: usize) -> f64 {
    table.taps(j).iter().sum()
}

/// Check the bounds and normalisation invariants for every row
pub fn check_table(table: &TapTable, tolerance: f64) -> Result<(), String> {
    for j in 0..table.out_size() {
        let n = table.n_taps(j);
        if n > table.max_taps() || table.max_taps() > table.in_size() {
            return Err(format!("row {}: {} taps, max {}", j, n, table.max_taps()));
        }
        if table.offset(j) + n > table.in_size() {
            return Err(format!(
                "row {}: offset {} + {} taps exceeds input {}",
                j,
                table.offset(j),
                n,
                table.in_size()
            ));
        }
        let sum = row_sum(table, j);
        if (sum - 1.0).abs() > tolerance {
            return Err(format!("row {}: weights sum to {}", j, sum));
        }
    }
    Ok(())
}
