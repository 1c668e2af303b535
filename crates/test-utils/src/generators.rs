//! Value generators with predictable patterns.

/// Values where each cell holds `layer * 1000 + row * 100 + col` (all 0-based),
/// layer-major then row-major, matching MODFLOW cell order.
///
/// # Example
///
/// ```
/// use test_utils::create_test_heads;
///
/// let heads = create_test_heads(3, 2, 2);
/// assert_eq!(heads.len(), 12);
/// assert_eq!(heads[4], 101.0);   // layer 0, row 1, col 1
/// assert_eq!(heads[6], 1000.0);  // layer 1, row 0, col 0
/// ```
pub fn create_test_heads(ncol: usize, nrow: usize, nlay: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(ncol * nrow * nlay);
    for layer in 0..nlay {
        for row in 0..nrow {
            for col in 0..ncol {
                data.push((layer * 1000 + row * 100 + col) as f64);
            }
        }
    }
    data
}

/// A planar surface `a + bx * x + by * y` sampled at the given cell centres.
///
/// Bilinear interpolation reproduces a plane exactly, which makes it a
/// convenient reference field for interpolation tests.
pub fn plane_at(centres: &[(f64, f64)], a: f64, bx: f64, by: f64) -> Vec<f64> {
    centres.iter().map(|&(x, y)| a + bx * x + by * y).collect()
}

/// Deterministic pseudo-random points inside `[x0, x1) x [y0, y1)`.
///
/// Uses a fixed linear congruential sequence so tests are reproducible
/// without pulling in a random number crate.
pub fn scattered_points(
    n: usize,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    seed: u64,
) -> Vec<(f64, f64)> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64) / ((1u64 << 53) as f64)
    };
    (0..n)
        .map(|_| {
            let x = x0 + (x1 - x0) * next();
            let y = y0 + (y1 - y0) * next();
            (x, y)
        })
        .collect()
}
