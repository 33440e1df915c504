//! Test data generators for density grids.
//!
//! Grids are returned as nested rows (row 0 = southernmost band), the layout
//! used by the heatmap endpoint.

/// Creates a grid with predictable values.
///
/// Each cell value is `row * 100 + col + 1`, so no cell is zero and
/// `grid[row][col]` can be verified from its indices.
///
/// # Example
///
/// ```
/// use test_utils::create_indexed_rows;
///
/// let rows = create_indexed_rows(3);
/// assert_eq!(rows[0][0], 1.0);
/// assert_eq!(rows[2][1], 202.0);
/// ```
pub fn create_indexed_rows(resolution: usize) -> Vec<Vec<f64>> {
    (0..resolution)
        .map(|row| {
            (0..resolution)
                .map(|col| (row * 100 + col + 1) as f64)
                .collect()
        })
        .collect()
}

/// Creates a grid filled with a constant value.
pub fn create_constant_rows(resolution: usize, value: f64) -> Vec<Vec<f64>> {
    vec![vec![value; resolution]; resolution]
}

/// Creates a grid with a single circular hotspot.
///
/// The value falls off linearly from `peak` at `(center_row, center_col)` to 0
/// at `radius` cells; everything further away is 0 (no data).
pub fn create_hotspot_rows(
    resolution: usize,
    center_row: usize,
    center_col: usize,
    radius: f64,
    peak: f64,
) -> Vec<Vec<f64>> {
    (0..resolution)
        .map(|row| {
            (0..resolution)
                .map(|col| {
                    let dr = row as f64 - center_row as f64;
                    let dc = col as f64 - center_col as f64;
                    let dist = (dr * dr + dc * dc).sqrt();
                    if dist < radius {
                        peak * (1.0 - dist / radius)
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Creates a sparse grid with deterministic pseudo-random densities.
///
/// Roughly one cell in four holds a value in `(0, 50]`, the rest are 0.
pub fn create_sparse_rows(resolution: usize, seed: u32) -> Vec<Vec<f64>> {
    (0..resolution)
        .map(|row| {
            (0..resolution)
                .map(|col| {
                    let hash = simple_hash(col as u32, row as u32, seed);
                    if hash % 4 == 0 {
                        ((hash % 5000) + 1) as f64 / 100.0
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Flatten nested rows into a row-major buffer.
pub fn flatten(rows: &[Vec<f64>]) -> Vec<f64> {
    rows.iter().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotspot_peak_and_falloff() {
        let rows = create_hotspot_rows(9, 4, 4, 3.0, 10.0);
        assert_eq!(rows[4][4], 10.0);
        assert_eq!(rows[0][0], 0.0);
        assert!(rows[4][5] < 10.0 && rows[4][5] > 0.0);
    }

    #[test]
    fn test_sparse_is_deterministic_and_non_negative() {
        let a = create_sparse_rows(16, 7);
        let b = create_sparse_rows(16, 7);
        assert_eq!(a, b);
        assert!(flatten(&a).iter().all(|v| *v >= 0.0));
        assert!(flatten(&a).iter().any(|v| *v > 0.0));
    }
}
