/// Packed grid of dark (`true`) and light (`false`) cells
///
/// Holds either a binarized image (one cell per pixel) or a sampled QR
/// symbol (one cell per module).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u64>,
}

impl BitMatrix {
    /// Create an all-light matrix
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height).div_ceil(64)],
        }
    }

    /// Build a matrix from text rows, `#` marking dark cells
    ///
    /// Rows shorter than the longest one are padded with light cells.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut matrix = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                matrix.set(x, y, c == '#');
            }
        }
        matrix
    }

    /// Matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y); out-of-range reads are light
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Set the cell at (x, y); out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let bit = 1u64 << (index % 64);
        if value {
            self.data[index / 64] |= bit;
        } else {
            self.data[index / 64] &= !bit;
        }
    }

    /// Flip the cell at (x, y)
    pub fn toggle(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        self.data[index / 64] ^= 1u64 << (index % 64);
    }

    /// Mirror across the main diagonal
    pub fn transposed(&self) -> Self {
        let mut out = Self::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(y, x, true);
                }
            }
        }
        out
    }

    /// Number of dark cells
    pub fn count_dark(&self) -> usize {
        self.data.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
