use crate::models::BitMatrix;

/// Which modules of a symbol are fixed patterns rather than codeword bits
pub(crate) struct FunctionMask {
    mask: BitMatrix,
}

impl FunctionMask {
    pub fn new(version: u8) -> Self {
        let size = 17 + 4 * usize::from(version);
        let mut mask = BitMatrix::new(size, size);

        // Finders with their separators
        for (x, y) in [(0, 0), (size - 7, 0), (0, size - 7)] {
            for yy in y.saturating_sub(1)..(y + 8).min(size) {
                for xx in x.saturating_sub(1)..(x + 8).min(size) {
                    mask.set(xx, yy, true);
                }
            }
        }

        // Timing
        for i in 0..size {
            mask.set(6, i, true);
            mask.set(i, 6, true);
        }

        let centers = alignment_centers(version);
        let last = centers.last().copied().unwrap_or(0);
        for &cy in &centers {
            for &cx in &centers {
                let on_finder =
                    (cx == 6 && cy == 6) || (cx == last && cy == 6) || (cx == 6 && cy == last);
                if on_finder {
                    continue;
                }
                for y in cy - 2..=cy + 2 {
                    for x in cx - 2..=cx + 2 {
                        mask.set(x, y, true);
                    }
                }
            }
        }

        // Format information, both copies, and the dark module
        for i in 0..9 {
            mask.set(8, i, true);
            mask.set(i, 8, true);
        }
        for i in 0..8 {
            mask.set(size - 1 - i, 8, true);
            mask.set(8, size - 1 - i, true);
        }

        if version >= 7 {
            for a in 0..6 {
                for b in 0..3 {
                    mask.set(size - 11 + b, a, true);
                    mask.set(a, size - 11 + b, true);
                }
            }
        }

        Self { mask }
    }

    pub fn size(&self) -> usize {
        self.mask.width()
    }

    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }
}

/// Row/column coordinates of alignment pattern centres
pub(crate) fn alignment_centers(version: u8) -> Vec<usize> {
    if version < 2 {
        return Vec::new();
    }
    let v = usize::from(version);
    let count = v / 7 + 2;
    let step = (v * 8 + count * 3 + 5) / (count * 4 - 4) * 2;
    let mut centers = vec![6];
    let first = 17 + 4 * v - 7 - step * (count - 2);
    centers.extend((0..count - 1).map(|i| first + i * step));
    centers
}

#[cfg(test)]
mod tests {
    use super::super::tables::raw_data_modules;
    use super::*;

    #[test]
    fn test_alignment_centers() {
        assert!(alignment_centers(1).is_empty());
        assert_eq!(alignment_centers(2), vec![6, 18]);
        assert_eq!(alignment_centers(7), vec![6, 22, 38]);
        assert_eq!(alignment_centers(32), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(alignment_centers(36), vec![6, 24, 50, 76, 102, 128, 154]);
        assert_eq!(alignment_centers(40), vec![6, 30, 58, 86, 114, 142, 170]);
    }

    #[test]
    fn test_data_module_counts() {
        for version in 1..=40u8 {
            let mask = FunctionMask::new(version);
            let n = mask.size();
            let data = (0..n)
                .flat_map(|y| (0..n).map(move |x| (x, y)))
                .filter(|&(x, y)| !mask.is_function(x, y))
                .count();
            assert_eq!(data, raw_data_modules(version), "version {version}");
        }
    }
}
