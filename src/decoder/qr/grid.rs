//! Mapping between module coordinates and image pixels

use super::finder::FinderTriple;
use crate::models::{BitMatrix, Point};
use crate::utils::geometry::PerspectiveTransform;

/// Pattern mismatches tolerated when accepting an alignment pattern
const MAX_ALIGNMENT_MISMATCH: usize = 3;

/// Candidate module-to-image transforms for a symbol of `version`, most
/// precise first
///
/// From version 2 on, the bottom-right alignment pattern is searched for
/// and, when found, pins the fourth corner of a full perspective map. The
/// parallelogram spanned by the three finders is always offered as well.
pub(crate) fn transforms(
    binary: &BitMatrix,
    triple: &FinderTriple,
    version: u8,
) -> Vec<PerspectiveTransform> {
    let dim = 17.0 + 4.0 * f32::from(version);
    let (tl, tr, bl) = (triple.top_left, triple.top_right, triple.bottom_left);
    let module_points = [
        Point::new(3.5, 3.5),
        Point::new(dim - 3.5, 3.5),
        Point::new(3.5, dim - 3.5),
        Point::new(dim - 3.5, dim - 3.5),
    ];
    let bottom_right = Point::new(tr.x + bl.x - tl.x, tr.y + bl.y - tl.y);
    let image_points = [tl, tr, bl, bottom_right];
    let Some(affine) = PerspectiveTransform::from_points(&module_points, &image_points) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(2);
    if version >= 2 {
        let anchor = Point::new(dim - 6.5, dim - 6.5);
        let refined = find_alignment(binary, &affine, anchor, triple.module_size).and_then(|found| {
            PerspectiveTransform::from_points(
                &[module_points[0], module_points[1], module_points[2], anchor],
                &[tl, tr, bl, found],
            )
        });
        out.extend(refined);
    }
    out.push(affine);
    out
}

/// Search around the predicted alignment centre for the 5x5 pattern
///
/// Every pixel in a window of four modules around the prediction is scored
/// by sampling the 25 module centres of the pattern there. The centroid of
/// the best-scoring positions is returned.
fn find_alignment(
    binary: &BitMatrix,
    affine: &PerspectiveTransform,
    anchor: Point,
    module_size: f32,
) -> Option<Point> {
    let predicted = affine.transform(&anchor);
    let right = affine.transform(&Point::new(anchor.x + 1.0, anchor.y));
    let down = affine.transform(&Point::new(anchor.x, anchor.y + 1.0));
    if !predicted.x.is_finite() || !predicted.y.is_finite() {
        return None;
    }
    let (ux, uy) = (right.x - predicted.x, right.y - predicted.y);
    let (vx, vy) = (down.x - predicted.x, down.y - predicted.y);

    let radius = (module_size * 4.0).ceil() as i64;
    let (cx, cy) = (predicted.x.floor() as i64, predicted.y.floor() as i64);

    let mut best = usize::MAX;
    let (mut sum_x, mut sum_y, mut hits) = (0.0f64, 0.0f64, 0u32);
    for py in cy - radius..=cy + radius {
        for px in cx - radius..=cx + radius {
            let (x0, y0) = (px as f32 + 0.5, py as f32 + 0.5);
            let mut mismatch = 0;
            for dy in -2i32..=2 {
                for dx in -2i32..=2 {
                    let expect_dark = dx.abs().max(dy.abs()) != 1;
                    let sx = x0 + dx as f32 * ux + dy as f32 * vx;
                    let sy = y0 + dx as f32 * uy + dy as f32 * vy;
                    if pixel(binary, sx, sy) != expect_dark {
                        mismatch += 1;
                    }
                }
                if mismatch > best {
                    break;
                }
            }
            if mismatch < best {
                best = mismatch;
                (sum_x, sum_y, hits) = (0.0, 0.0, 0);
            }
            if mismatch == best {
                sum_x += f64::from(x0);
                sum_y += f64::from(y0);
                hits += 1;
            }
        }
    }

    (best <= MAX_ALIGNMENT_MISMATCH && hits > 0)
        .then(|| Point::new((sum_x / f64::from(hits)) as f32, (sum_y / f64::from(hits)) as f32))
}

/// Binarized value under an image-space point; outside reads light
fn pixel(binary: &BitMatrix, x: f32, y: f32) -> bool {
    if !(x >= 0.0 && y >= 0.0) {
        return false;
    }
    binary.get(x as usize, y as usize)
}

/// Sample a `dimension` x `dimension` module grid at module centres
pub(crate) fn sample(
    binary: &BitMatrix,
    transform: &PerspectiveTransform,
    dimension: usize,
) -> BitMatrix {
    let mut modules = BitMatrix::new(dimension, dimension);
    for y in 0..dimension {
        for x in 0..dimension {
            let p = transform.transform(&Point::new(x as f32 + 0.5, y as f32 + 0.5));
            if pixel(binary, p.x, p.y) {
                modules.set(x, y, true);
            }
        }
    }
    modules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upscale(modules: &BitMatrix, scale: usize, margin: usize) -> BitMatrix {
        let size = modules.width() * scale + 2 * margin;
        let mut image = BitMatrix::new(size, size);
        for y in 0..modules.height() {
            for x in 0..modules.width() {
                if modules.get(x, y) {
                    for d in 0..scale * scale {
                        let (px, py) = (margin + x * scale, margin + y * scale);
                        image.set(px + d % scale, py + d / scale, true);
                    }
                }
            }
        }
        image
    }

    fn triple_for(dim: usize, scale: usize, margin: usize) -> FinderTriple {
        let at = |m: f32| margin as f32 + m * scale as f32;
        FinderTriple {
            top_left: Point::new(at(3.5), at(3.5)),
            top_right: Point::new(at(dim as f32 - 3.5), at(3.5)),
            bottom_left: Point::new(at(3.5), at(dim as f32 - 3.5)),
            module_size: scale as f32,
            members: [0, 1, 2],
            score: 0.0,
        }
    }

    #[test]
    fn test_sample_recovers_modules() {
        let mut modules = BitMatrix::new(21, 21);
        for i in 0..21 {
            modules.set(i, (i * 7) % 21, true);
            modules.set((i * 5) % 21, i, true);
        }
        let image = upscale(&modules, 3, 12);
        let transforms = transforms(&image, &triple_for(21, 3, 12), 1);
        assert_eq!(transforms.len(), 1);
        assert_eq!(sample(&image, &transforms[0], 21), modules);
    }

    #[test]
    fn test_alignment_pattern_is_found() {
        // Version 2: alignment centred on module (18, 18)
        let mut modules = BitMatrix::new(25, 25);
        for y in 16..=20 {
            for x in 16..=20 {
                let ring = (x as i32 - 18).abs().max((y as i32 - 18).abs());
                modules.set(x, y, ring != 1);
            }
        }
        let image = upscale(&modules, 4, 16);
        let affine = PerspectiveTransform::from_points(
            &[
                Point::new(0.0, 0.0),
                Point::new(25.0, 0.0),
                Point::new(0.0, 25.0),
                Point::new(25.0, 25.0),
            ],
            &[
                Point::new(16.0, 16.0),
                Point::new(116.0, 16.0),
                Point::new(16.0, 116.0),
                Point::new(116.0, 116.0),
            ],
        )
        .unwrap();
        let found =
            find_alignment(&image, &affine, Point::new(18.5, 18.5), 4.0).expect("pattern present");
        assert!(found.distance(&Point::new(90.0, 90.0)) < 1.0, "{found:?}");

        let triple = triple_for(25, 4, 16);
        assert_eq!(transforms(&image, &triple, 2).len(), 2);
    }
}
