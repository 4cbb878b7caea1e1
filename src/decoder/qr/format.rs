//! Format and version information
//!
//! Both are BCH-protected and stored twice. Each copy is compared against
//! every valid codeword and the nearest one within three bit errors wins.

use crate::models::BitMatrix;

const FORMAT_XOR: u16 = 0x5412;
const FORMAT_GENERATOR: u32 = 0x537;
const VERSION_GENERATOR: u32 = 0x1f25;
const MAX_BIT_ERRORS: u32 = 3;

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcLevel {
    /// Recovers about 7% of codewords
    L,
    /// About 15%
    M,
    /// About 25%
    Q,
    /// About 30%
    H,
}

impl EcLevel {
    /// Level from the two bits stored in format information
    fn from_format_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b01 => EcLevel::L,
            0b00 => EcLevel::M,
            0b11 => EcLevel::Q,
            _ => EcLevel::H,
        }
    }

    /// Row index into the block tables
    pub(crate) fn ordinal(self) -> usize {
        match self {
            EcLevel::L => 0,
            EcLevel::M => 1,
            EcLevel::Q => 2,
            EcLevel::H => 3,
        }
    }
}

/// Data mask applied over the codeword region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPattern(u8);

impl MaskPattern {
    /// Mask by its 3-bit reference
    pub fn new(reference: u8) -> Option<Self> {
        (reference < 8).then_some(Self(reference))
    }

    /// 3-bit reference as stored in format information
    pub fn reference(self) -> u8 {
        self.0
    }

    /// Whether the module at row `i`, column `j` is inverted
    pub fn is_masked(self, i: usize, j: usize) -> bool {
        match self.0 {
            0 => (i + j) % 2 == 0,
            1 => i % 2 == 0,
            2 => j % 3 == 0,
            3 => (i + j) % 3 == 0,
            4 => (i / 2 + j / 3) % 2 == 0,
            5 => (i * j) % 2 + (i * j) % 3 == 0,
            6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            _ => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
        }
    }
}

/// Decoded format information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FormatInfo {
    pub ec_level: EcLevel,
    pub mask: MaskPattern,
    pub bit_errors: u32,
}

/// Remainder of `data * x^deg(generator)` modulo the generator over GF(2)
fn bch_remainder(data: u32, generator: u32) -> u32 {
    let degree = 31 - generator.leading_zeros();
    let mut rem = data << degree;
    for bit in (degree..32).rev() {
        if rem & (1 << bit) != 0 {
            rem ^= generator << (bit - degree);
        }
    }
    rem
}

/// Masked 15-bit codeword for 5 data bits
pub(crate) fn format_codeword(data: u16) -> u16 {
    let data = u32::from(data & 0x1f);
    ((data << 10 | bch_remainder(data, FORMAT_GENERATOR)) as u16) ^ FORMAT_XOR
}

/// 18-bit codeword for a version number
pub(crate) fn version_codeword(version: u8) -> u32 {
    let data = u32::from(version);
    data << 12 | bch_remainder(data, VERSION_GENERATOR)
}

fn read_bits(matrix: &BitMatrix, cells: impl Iterator<Item = (usize, usize)>) -> u32 {
    cells.fold(0, |acc, (x, y)| (acc << 1) | u32::from(matrix.get(x, y)))
}

impl FormatInfo {
    /// Read and correct the format information of a sampled symbol
    pub fn read(matrix: &BitMatrix) -> Option<Self> {
        let n = matrix.width();
        let near_top_left = (0..6)
            .map(|x| (x, 8))
            .chain([(7, 8), (8, 8), (8, 7)])
            .chain((0..6).rev().map(|y| (8, y)));
        let split = (n - 7..n).rev().map(|y| (8, y)).chain((n - 8..n).map(|x| (x, 8)));

        let copies = [read_bits(matrix, near_top_left), read_bits(matrix, split)];
        let (data, bit_errors) = (0..32u16)
            .map(|d| {
                let codeword = u32::from(format_codeword(d));
                let distance = copies
                    .iter()
                    .map(|c| (c ^ codeword).count_ones())
                    .min()
                    .unwrap_or(u32::MAX);
                (d, distance)
            })
            .min_by_key(|&(_, distance)| distance)?;
        if bit_errors > MAX_BIT_ERRORS {
            return None;
        }
        Some(Self {
            ec_level: EcLevel::from_format_bits(data >> 3),
            mask: MaskPattern(data as u8 & 0b111),
            bit_errors,
        })
    }
}

/// Version number from the version information blocks (versions 7+)
pub(crate) fn read_version(matrix: &BitMatrix) -> Option<u8> {
    let n = matrix.width();
    if n < 45 {
        return None;
    }
    let top_right = (0..6)
        .rev()
        .flat_map(|y| (n - 11..=n - 9).rev().map(move |x| (x, y)));
    let bottom_left = (0..6)
        .rev()
        .flat_map(|x| (n - 11..=n - 9).rev().map(move |y| (x, y)));
    let copies = [read_bits(matrix, top_right), read_bits(matrix, bottom_left)];

    let (version, distance) = (7..=40u8)
        .map(|v| {
            let codeword = version_codeword(v);
            (v, copies.iter().map(|c| (c ^ codeword).count_ones()).min().unwrap_or(u32::MAX))
        })
        .min_by_key(|&(_, distance)| distance)?;
    (distance <= MAX_BIT_ERRORS).then_some(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codewords() {
        // M level, mask 5 (data 0b00101) from the published table
        assert_eq!(format_codeword(0b00101), 0x40ce);
        assert_eq!(format_codeword(0b01000), 0x77c4);
        assert_eq!(version_codeword(7), 0x07c94);
        assert_eq!(version_codeword(40), 0x28c69);
    }

    #[test]
    fn test_level_bits() {
        assert_eq!(EcLevel::from_format_bits(0b01), EcLevel::L);
        assert_eq!(EcLevel::from_format_bits(0b00), EcLevel::M);
        assert_eq!(EcLevel::from_format_bits(0b11), EcLevel::Q);
        assert_eq!(EcLevel::from_format_bits(0b10), EcLevel::H);
    }

    #[test]
    fn test_masks() {
        let m0 = MaskPattern::new(0).unwrap();
        assert!(m0.is_masked(0, 0) && !m0.is_masked(0, 1));
        let m1 = MaskPattern::new(1).unwrap();
        assert!(m1.is_masked(2, 5) && !m1.is_masked(3, 5));
        assert!(MaskPattern::new(8).is_none());
        assert_eq!(MaskPattern::new(7).map(MaskPattern::reference), Some(7));
    }

    fn write_format(matrix: &mut BitMatrix, codeword: u16) {
        let n = matrix.width();
        let cells: Vec<(usize, usize)> = (0..6)
            .map(|x| (x, 8))
            .chain([(7, 8), (8, 8), (8, 7)])
            .chain((0..6).rev().map(|y| (8, y)))
            .collect();
        for (i, &(x, y)) in cells.iter().enumerate() {
            matrix.set(x, y, codeword >> (14 - i) & 1 == 1);
        }
        let split: Vec<(usize, usize)> = (n - 7..n)
            .rev()
            .map(|y| (8, y))
            .chain((n - 8..n).map(|x| (x, 8)))
            .collect();
        for (i, &(x, y)) in split.iter().enumerate() {
            matrix.set(x, y, codeword >> (14 - i) & 1 == 1);
        }
    }

    #[test]
    fn test_read_format_with_errors() {
        let mut matrix = BitMatrix::new(21, 21);
        write_format(&mut matrix, format_codeword(0b11_011));
        let info = FormatInfo::read(&matrix).unwrap();
        assert_eq!(info.ec_level, EcLevel::Q);
        assert_eq!(info.mask.reference(), 3);
        assert_eq!(info.bit_errors, 0);

        // Three flips in one copy, five in the other
        for (x, y) in [(0, 8), (2, 8), (8, 1)] {
            matrix.toggle(x, y);
        }
        for (x, y) in [(8, 20), (8, 18), (14, 8), (16, 8), (20, 8)] {
            matrix.toggle(x, y);
        }
        let info = FormatInfo::read(&matrix).unwrap();
        assert_eq!((info.ec_level, info.mask.reference(), info.bit_errors), (EcLevel::Q, 3, 3));
    }

    #[test]
    fn test_read_version() {
        let n = 17 + 4 * 7;
        let mut matrix = BitMatrix::new(n, n);
        let codeword = version_codeword(7);
        let mut bit: u32 = 17;
        for y in (0..6).rev() {
            for x in (n - 11..=n - 9).rev() {
                matrix.set(x, y, codeword >> bit & 1 == 1);
                matrix.set(y, x, codeword >> bit & 1 == 1);
                bit = bit.saturating_sub(1);
            }
        }
        assert_eq!(read_version(&matrix), Some(7));

        matrix.toggle(n - 9, 5);
        matrix.toggle(n - 10, 3);
        assert_eq!(read_version(&matrix), Some(7));
        assert_eq!(read_version(&BitMatrix::new(21, 21)), None);
    }
}
