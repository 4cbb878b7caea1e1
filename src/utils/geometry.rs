//! Plane geometry: perspective mapping for the QR sampler and the convex
//! hull used to tidy symbol outlines before they are drawn

use crate::models::{Point, PointI};

/// Projective map between two quadrilaterals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    // Row-major 3x3 with the bottom-right coefficient fixed at 1
    m: [f64; 9],
}

impl PerspectiveTransform {
    /// Map that sends each `src[i]` to `dst[i]`
    ///
    /// Returns `None` when three of the points are collinear and the system
    /// is singular.
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            let (sx, sy) = (f64::from(s.x), f64::from(s.y));
            let (dx, dy) = (f64::from(d.x), f64::from(d.y));
            let row = i * 2;
            a[row] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[row] = dx;
            a[row + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[row + 1] = dy;
        }

        let h = solve8(a, b)?;
        Some(Self {
            m: [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0],
        })
    }

    /// Apply the map; points on the line at infinity come back as NaN
    pub fn transform(&self, p: &Point) -> Point {
        let (x, y) = (f64::from(p.x), f64::from(p.y));
        let m = &self.m;
        let w = m[6] * x + m[7] * y + m[8];
        if w.abs() < 1e-12 {
            return Point::new(f32::NAN, f32::NAN);
        }
        Point::new(
            ((m[0] * x + m[1] * y + m[2]) / w) as f32,
            ((m[3] * x + m[4] * y + m[5]) / w) as f32,
        )
    }
}

/// Gaussian elimination with partial pivoting
#[allow(clippy::needless_range_loop)]
fn solve8(mut a: [[f64; 8]; 8], mut b: [f64; 8]) -> Option<[f64; 8]> {
    const N: usize = 8;
    for col in 0..N {
        let pivot = (col..N).max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..N {
            let factor = a[row][col] / a[col][col];
            b[row] -= factor * b[col];
            for k in col..N {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = [0.0f64; N];
    for row in (0..N).rev() {
        let tail: f64 = ((row + 1)..N).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// z component of (a - o) x (b - o); positive for a left turn in a y-up frame
///
/// Computed in `i128` so any pair of `i32` points is exact.
fn cross(o: PointI, a: PointI, b: PointI) -> i128 {
    let (ax, ay) = (i128::from(a.x) - i128::from(o.x), i128::from(a.y) - i128::from(o.y));
    let (bx, by) = (i128::from(b.x) - i128::from(o.x), i128::from(b.y) - i128::from(o.y));
    ax * by - ay * bx
}

/// Convex hull by Andrew's monotone chain
///
/// Vertices come back counter-clockwise in a y-up frame (clockwise on
/// screen), starting from the smallest `(x, y)`. Duplicates and points lying
/// on a hull edge are dropped. Fewer than three distinct points, or points
/// that are all collinear, yield the one or two extreme points.
pub fn convex_hull(points: &[PointI]) -> Vec<PointI> {
    let mut sorted = points.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower = half_hull(sorted.iter());
    let mut upper = half_hull(sorted.iter().rev());
    // Each chain ends where the other begins
    lower.pop();
    upper.pop();
    lower.append(&mut upper);
    lower
}

fn half_hull<'a>(points: impl Iterator<Item = &'a PointI>) -> Vec<PointI> {
    let mut chain: Vec<PointI> = Vec::new();
    for &p in points {
        while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0 {
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

/// Outline to draw for a decoded symbol
///
/// Quadrilaterals and smaller shapes pass through untouched. Longer outlines,
/// which linear symbols produce one scanline at a time, are replaced by their
/// convex hull.
pub fn normalize_polygon(points: &[PointI]) -> Vec<PointI> {
    if points.len() <= 4 {
        points.to_vec()
    } else {
        convex_hull(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<PointI> {
        raw.iter().copied().map(PointI::from).collect()
    }

    #[test]
    fn test_perspective_transform_scales() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let dst = [
            Point::new(10.0, 10.0),
            Point::new(60.0, 10.0),
            Point::new(60.0, 60.0),
            Point::new(10.0, 60.0),
        ];
        let t = PerspectiveTransform::from_points(&src, &dst).expect("non-degenerate quad");
        let p = t.transform(&Point::new(50.0, 50.0));
        assert!((p.x - 35.0).abs() < 1e-3 && (p.y - 35.0).abs() < 1e-3);
    }

    #[test]
    fn test_perspective_transform_hits_corners() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(21.0, 0.0),
            Point::new(21.0, 21.0),
            Point::new(0.0, 21.0),
        ];
        let dst = [
            Point::new(100.0, 120.0),
            Point::new(340.0, 90.0),
            Point::new(380.0, 330.0),
            Point::new(80.0, 360.0),
        ];
        let t = PerspectiveTransform::from_points(&src, &dst).expect("non-degenerate quad");
        for (s, d) in src.iter().zip(&dst) {
            let p = t.transform(s);
            assert!(p.distance(d) < 1e-2, "{p:?} vs {d:?}");
        }
    }

    #[test]
    fn test_degenerate_transform() {
        let line = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        ];
        assert!(PerspectiveTransform::from_points(&line, &line).is_none());
    }

    #[test]
    fn test_hull_drops_interior_and_edge_points() {
        let input = pts(&[(0, 0), (10, 0), (5, 5), (10, 10), (0, 10), (5, 0)]);
        assert_eq!(convex_hull(&input), pts(&[(0, 0), (10, 0), (10, 10), (0, 10)]));
    }

    #[test]
    fn test_hull_degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&pts(&[(3, 3), (3, 3), (3, 3)])), pts(&[(3, 3)]));
        assert_eq!(
            convex_hull(&pts(&[(0, 0), (2, 2), (1, 1), (4, 4), (3, 3)])),
            pts(&[(0, 0), (4, 4)])
        );
    }

    #[test]
    fn test_hull_extreme_coordinates() {
        let (min, max) = (i32::MIN, i32::MAX);
        let diamond = pts(&[(min, 0), (max, 0), (0, max), (0, min), (1, 1)]);
        assert_eq!(
            normalize_polygon(&diamond),
            pts(&[(min, 0), (0, min), (max, 0), (0, max)])
        );
    }

    #[test]
    fn test_normalize_passes_quads_through() {
        let quad = pts(&[(5, 5), (0, 0), (9, 1), (2, 8)]);
        assert_eq!(normalize_polygon(&quad), quad);
        let pair = pts(&[(1, 1), (1, 1)]);
        assert_eq!(normalize_polygon(&pair), pair);
    }

    #[test]
    fn test_normalize_scanline_outline() {
        // Left edge top to bottom, then right edge bottom to top
        let outline = pts(&[
            (10, 0),
            (10, 1),
            (11, 2),
            (10, 3),
            (50, 3),
            (50, 2),
            (49, 1),
            (50, 0),
        ]);
        let hull = normalize_polygon(&outline);
        assert_eq!(hull, pts(&[(10, 0), (50, 0), (50, 3), (10, 3)]));
    }
}
