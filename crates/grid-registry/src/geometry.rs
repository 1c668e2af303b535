//! Planar polygon helpers shared by the grid types.

use nalgebra::{Matrix2, Vector2};

/// Tolerance used when deciding whether a point lies inside a triangle.
const BARYCENTRIC_EPS: f64 = 1.0e-10;

/// Even-odd point-in-polygon test. The polygon is implicitly closed.
pub fn point_in_polygon(x: f64, y: f64, polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];

        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Signed polygon area (positive for counter-clockwise order).
pub fn signed_area(polygon: &[(f64, f64)]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let (x0, y0) = polygon[i];
        let (x1, y1) = polygon[(i + 1) % n];
        twice += x0 * y1 - x1 * y0;
    }
    0.5 * twice
}

/// Area centroid of a simple polygon.
///
/// Degenerate polygons (zero area) fall back to the vertex mean.
pub fn polygon_centroid(polygon: &[(f64, f64)]) -> (f64, f64) {
    let n = polygon.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let area = signed_area(polygon);
    if area.abs() < f64::EPSILON {
        let sx: f64 = polygon.iter().map(|p| p.0).sum();
        let sy: f64 = polygon.iter().map(|p| p.1).sum();
        return (sx / n as f64, sy / n as f64);
    }

    // Shift to the first vertex to limit cancellation on large coordinates.
    let (ox, oy) = polygon[0];
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (x0, y0) = (polygon[i].0 - ox, polygon[i].1 - oy);
        let (x1, y1) = (polygon[(i + 1) % n].0 - ox, polygon[(i + 1) % n].1 - oy);
        let cross = x0 * y1 - x1 * y0;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    (ox + cx / (6.0 * area), oy + cy / (6.0 * area))
}

/// Barycentric coordinates of `p` in triangle `(a, b, c)`.
///
/// Returns `None` for a degenerate triangle.
pub fn barycentric(
    p: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
) -> Option<[f64; 3]> {
    let m = Matrix2::new(b.0 - a.0, c.0 - a.0, b.1 - a.1, c.1 - a.1);
    let inv = m.try_inverse()?;
    let rhs = Vector2::new(p.0 - a.0, p.1 - a.1);
    let l = inv * rhs;
    Some([1.0 - l.x - l.y, l.x, l.y])
}

/// Whether barycentric coordinates describe a point inside (or on) the triangle.
pub fn inside_triangle(weights: &[f64; 3]) -> bool {
    weights.iter().all(|&w| w >= -BARYCENTRIC_EPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
    }

    #[test]
    fn test_point_in_polygon() {
        let square = unit_square();
        assert!(point_in_polygon(0.5, 0.5, &square));
        assert!(!point_in_polygon(1.5, 0.5, &square));
        assert!(!point_in_polygon(0.5, -0.1, &square));
        assert!(!point_in_polygon(0.5, 0.5, &square[..2]));
    }

    #[test]
    fn test_centroid_and_area() {
        let square = unit_square();
        assert!((signed_area(&square) - 1.0).abs() < 1e-12);
        let (cx, cy) = polygon_centroid(&square);
        assert!((cx - 0.5).abs() < 1e-12);
        assert!((cy - 0.5).abs() < 1e-12);

        let mut cw = square.clone();
        cw.reverse();
        assert!(signed_area(&cw) < 0.0);
        let (cx, cy) = polygon_centroid(&cw);
        assert!((cx - 0.5).abs() < 1e-12);
        assert!((cy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_barycentric() {
        let w = barycentric((0.25, 0.25), (0.0, 0.0), (1.0, 0.0), (0.0, 1.0)).unwrap();
        assert!((w[0] - 0.5).abs() < 1e-12);
        assert!((w[1] - 0.25).abs() < 1e-12);
        assert!((w[2] - 0.25).abs() < 1e-12);
        assert!(inside_triangle(&w));

        let w = barycentric((2.0, 2.0), (0.0, 0.0), (1.0, 0.0), (0.0, 1.0)).unwrap();
        assert!(!inside_triangle(&w));

        assert!(barycentric((0.0, 0.0), (0.0, 0.0), (1.0, 1.0), (2.0, 2.0)).is_none());
    }
}
