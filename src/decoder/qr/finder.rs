//! Finder pattern detection and grouping
//!
//! Rows are scanned for dark-light-dark-light-dark runs in 1:1:3:1:1
//! proportion. Each hit is confirmed by a vertical cross-check through its
//! centre and re-centred horizontally, then merged with nearby hits.
use crate::models::{BitMatrix, Point};

/// Upper bound on patterns considered for grouping
const MAX_PATTERNS: usize = 24;
/// Corners further from a right angle than this are rejected
const MAX_CORNER_COS: f32 = 0.3;

/// Centre of one of a symbol's three finder patterns
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FinderPattern {
    pub center: Point,
    pub module_size: f32,
    /// Scanlines that confirmed this pattern
    pub count: usize,
}

impl FinderPattern {
    fn near(&self, center: Point, module_size: f32) -> bool {
        (self.center.x - center.x).abs() <= self.module_size
            && (self.center.y - center.y).abs() <= self.module_size
            && (self.module_size - module_size).abs() <= self.module_size.max(1.0)
    }

    fn absorb(&mut self, center: Point, module_size: f32) {
        let n = self.count as f32;
        self.center = Point::new(
            (self.center.x * n + center.x) / (n + 1.0),
            (self.center.y * n + center.y) / (n + 1.0),
        );
        self.module_size = (self.module_size * n + module_size) / (n + 1.0);
        self.count += 1;
    }
}

/// Three finder patterns arranged as a symbol's corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FinderTriple {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub module_size: f32,
    /// Indices into the detected pattern list
    pub members: [usize; 3],
    /// Lower is a better fit
    pub score: f32,
}

impl FinderTriple {
    /// Version suggested by the finder spacing
    pub fn estimated_version(&self) -> u8 {
        let across = (self.top_left.distance(&self.top_right)
            + self.top_left.distance(&self.bottom_left))
            / 2.0;
        let dimension = across / self.module_size + 7.0;
        ((dimension - 17.0) / 4.0).round().clamp(1.0, 40.0) as u8
    }
}

/// 1:1:3:1:1 within half a module per element
fn ratio_ok(counts: &[usize; 5]) -> bool {
    let total: usize = counts.iter().sum();
    if total < 7 || counts.contains(&0) {
        return false;
    }
    let module = total as f32 / 7.0;
    let tolerance = module / 2.0;
    counts.iter().zip([1.0f32, 1.0, 3.0, 1.0, 1.0]).all(|(&c, expected)| {
        (c as f32 - expected * module).abs() < expected * tolerance
    })
}

/// Walk out from `center` along one axis, measuring the five runs
///
/// Returns the run lengths and the continuous centre of the middle run.
fn cross_check(
    len: usize,
    center: usize,
    max_count: usize,
    dark: impl Fn(usize) -> bool,
) -> Option<([usize; 5], f32)> {
    let mut counts = [0usize; 5];

    let mut i = center as isize;
    while i >= 0 && dark(i as usize) {
        counts[2] += 1;
        i -= 1;
    }
    if i < 0 {
        return None;
    }
    while i >= 0 && !dark(i as usize) && counts[1] <= max_count {
        counts[1] += 1;
        i -= 1;
    }
    if i < 0 || counts[1] > max_count {
        return None;
    }
    while i >= 0 && dark(i as usize) && counts[0] <= max_count {
        counts[0] += 1;
        i -= 1;
    }
    if counts[0] > max_count {
        return None;
    }

    let mut i = center + 1;
    while i < len && dark(i) {
        counts[2] += 1;
        i += 1;
    }
    if i == len {
        return None;
    }
    while i < len && !dark(i) && counts[3] <= max_count {
        counts[3] += 1;
        i += 1;
    }
    if i == len || counts[3] > max_count {
        return None;
    }
    while i < len && dark(i) && counts[4] <= max_count {
        counts[4] += 1;
        i += 1;
    }
    if counts[4] > max_count || !ratio_ok(&counts) {
        return None;
    }

    let middle = i as f32 - counts[4] as f32 - counts[3] as f32 - counts[2] as f32 / 2.0;
    Some((counts, middle))
}

/// Find finder pattern centres in a binarized image
pub(crate) fn detect(matrix: &BitMatrix) -> Vec<FinderPattern> {
    let (width, height) = (matrix.width(), matrix.height());
    let mut found: Vec<FinderPattern> = Vec::new();
    let mut runs: Vec<(usize, usize, bool)> = Vec::new();

    for y in 0..height {
        runs.clear();
        let mut start = 0;
        for x in 1..=width {
            if x == width || matrix.get(x, y) != matrix.get(start, y) {
                runs.push((start, x - start, matrix.get(start, y)));
                start = x;
            }
        }

        for window in runs.windows(5) {
            if !window[0].2 {
                continue;
            }
            let counts = [window[0].1, window[1].1, window[2].1, window[3].1, window[4].1];
            if !ratio_ok(&counts) {
                continue;
            }
            let total: usize = counts.iter().sum();
            let column = window[2].0 + window[2].1 / 2;

            let Some((vertical, center_y)) =
                cross_check(height, y, total, |yy| matrix.get(column, yy))
            else {
                continue;
            };
            let vertical_total: usize = vertical.iter().sum();
            if 5 * vertical_total.abs_diff(total) >= 2 * total {
                continue;
            }
            let row = center_y as usize;
            let Some((horizontal, center_x)) =
                cross_check(width, column, total, |xx| matrix.get(xx, row))
            else {
                continue;
            };

            let module_size = (horizontal.iter().sum::<usize>() + vertical_total) as f32 / 14.0;
            let center = Point::new(center_x, center_y);
            match found.iter_mut().find(|f| f.near(center, module_size)) {
                Some(existing) => existing.absorb(center, module_size),
                None => found.push(FinderPattern {
                    center,
                    module_size,
                    count: 1,
                }),
            }
        }
    }

    // Prefer patterns seen on several rows once there are enough of them
    if found.iter().filter(|f| f.count >= 2).count() >= 3 {
        found.retain(|f| f.count >= 2);
    }
    found.sort_by(|a, b| b.count.cmp(&a.count));
    found.truncate(MAX_PATTERNS);
    found
}

/// Every plausible corner assignment of three patterns, best first
pub(crate) fn candidate_triples(patterns: &[FinderPattern]) -> Vec<FinderTriple> {
    let mut triples = Vec::new();
    for i in 0..patterns.len() {
        for j in i + 1..patterns.len() {
            for k in j + 1..patterns.len() {
                if let Some(triple) = arrange(patterns, [i, j, k]) {
                    triples.push(triple);
                }
            }
        }
    }
    triples.sort_by(|a, b| a.score.total_cmp(&b.score));
    triples
}

fn arrange(patterns: &[FinderPattern], members: [usize; 3]) -> Option<FinderTriple> {
    let p = members.map(|i| patterns[i]);
    let smallest = p.iter().map(|f| f.module_size).fold(f32::INFINITY, f32::min);
    let largest = p.iter().map(|f| f.module_size).fold(0.0, f32::max);
    if smallest <= 0.0 || largest / smallest > 1.5 {
        return None;
    }

    // The top-left pattern sits at the corner closest to a right angle
    let mut corner = None;
    let mut best_cos = MAX_CORNER_COS;
    for c in 0..3 {
        let a = p[c].center;
        let b = p[(c + 1) % 3].center;
        let d = p[(c + 2) % 3].center;
        let (v1x, v1y, v2x, v2y) = (b.x - a.x, b.y - a.y, d.x - a.x, d.y - a.y);
        let lengths = (v1x * v1x + v1y * v1y).sqrt() * (v2x * v2x + v2y * v2y).sqrt();
        if lengths < f32::EPSILON {
            continue;
        }
        let cos = ((v1x * v2x + v1y * v2y) / lengths).abs();
        if cos < best_cos {
            best_cos = cos;
            corner = Some(c);
        }
    }
    let c = corner?;

    let top_left = p[c].center;
    let (mut top_right, mut bottom_left) = (p[(c + 1) % 3].center, p[(c + 2) % 3].center);
    // With y pointing down, top-right then bottom-left turns clockwise
    let cross = (top_right.x - top_left.x) * (bottom_left.y - top_left.y)
        - (top_right.y - top_left.y) * (bottom_left.x - top_left.x);
    if cross < 0.0 {
        std::mem::swap(&mut top_right, &mut bottom_left);
    }

    let module_size = (p[0].module_size + p[1].module_size + p[2].module_size) / 3.0;
    let (d_tr, d_bl) = (top_left.distance(&top_right), top_left.distance(&bottom_left));
    let ratio = d_tr / d_bl;
    if !(0.7..=1.4).contains(&ratio) || d_tr.min(d_bl) < 10.0 * module_size {
        return None;
    }

    Some(FinderTriple {
        top_left,
        top_right,
        bottom_left,
        module_size,
        members,
        score: best_cos + (1.0 - ratio).abs() + (largest / smallest - 1.0),
    })
}
