//! QR Code model 2 reader
//!
//! Pipeline: Otsu binarization, finder detection, triple grouping, grid
//! sampling, then per-candidate matrix decoding (format and version
//! information, codeword extraction, Reed-Solomon, segment parsing).

mod codewords;
mod finder;
pub mod format;
mod function_mask;
mod grid;
mod payload;
mod reed_solomon;
mod tables;

use image::GrayImage;
use log::debug;

use self::format::{EcLevel, FormatInfo, MaskPattern};
use self::function_mask::FunctionMask;
use crate::models::{BitMatrix, DecodedSymbol, Point, PointI, SymbolType};
use crate::utils::binarization::otsu_binarize;
use crate::utils::geometry::PerspectiveTransform;

/// Finder triples tried per image
const MAX_CANDIDATES: usize = 64;

/// A module grid that decoded successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixDecode {
    /// Payload text, UTF-8 encoded
    pub payload: Vec<u8>,
    /// Symbol version, 1-40
    pub version: u8,
    /// Error correction level from format information
    pub ec_level: EcLevel,
    /// Data mask from format information
    pub mask: MaskPattern,
    /// Codewords repaired by Reed-Solomon
    pub corrected: usize,
    /// ECI designator, when the symbol declares one
    pub eci: Option<u32>,
    /// True when the grid had to be read transposed
    pub mirrored: bool,
}

/// Decode a sampled module grid (one cell per module, quiet zone excluded)
///
/// A grid that fails as read is retried transposed, which is how a
/// mirrored symbol appears.
pub fn decode_matrix(modules: &BitMatrix) -> Option<MatrixDecode> {
    decode_oriented(modules, false).or_else(|| decode_oriented(&modules.transposed(), true))
}

fn decode_oriented(modules: &BitMatrix, mirrored: bool) -> Option<MatrixDecode> {
    let n = modules.width();
    if n != modules.height() || n < 21 || (n - 17) % 4 != 0 {
        return None;
    }
    let version = u8::try_from((n - 17) / 4).ok().filter(|v| *v <= 40)?;
    if version >= 7 {
        if let Some(declared) = format::read_version(modules) {
            if declared != version {
                debug!("version information says {declared}, grid is version {version}");
                return None;
            }
        }
    }

    let format = FormatInfo::read(modules)?;
    if format.bit_errors > 0 {
        debug!("format information repaired {} bit(s)", format.bit_errors);
    }
    let function = FunctionMask::new(version);
    let raw = codewords::read_codewords(modules, &function, format.mask);
    let (data, corrected) = codewords::correct_blocks(&raw, version, format.ec_level)?;
    let parsed = payload::parse(&data, version)?;

    Some(MatrixDecode {
        payload: parsed.bytes,
        version,
        ec_level: format.ec_level,
        mask: format.mask,
        corrected,
        eci: parsed.eci,
        mirrored,
    })
}

/// Find and decode every QR symbol in a greyscale image
pub(crate) fn scan(gray: &GrayImage) -> Vec<DecodedSymbol> {
    let binary = otsu_binarize(gray);
    let patterns = finder::detect(&binary);
    debug!("{} finder pattern(s)", patterns.len());
    if patterns.len() < 3 {
        return Vec::new();
    }

    let mut used = vec![false; patterns.len()];
    let mut symbols = Vec::new();
    for triple in finder::candidate_triples(&patterns).into_iter().take(MAX_CANDIDATES) {
        if triple.members.iter().any(|&i| used[i]) {
            continue;
        }
        if let Some(symbol) = decode_triple(&binary, &triple) {
            for &i in &triple.members {
                used[i] = true;
            }
            symbols.push(symbol);
        }
    }
    symbols
}

fn decode_triple(binary: &BitMatrix, triple: &finder::FinderTriple) -> Option<DecodedSymbol> {
    let estimate = triple.estimated_version();
    let versions = [Some(estimate), estimate.checked_sub(1), estimate.checked_add(1)];
    for version in versions.into_iter().flatten().filter(|v| (1..=40).contains(v)) {
        let dimension = 17 + 4 * usize::from(version);
        for transform in grid::transforms(binary, triple, version) {
            let modules = grid::sample(binary, &transform, dimension);
            if let Some(decoded) = decode_matrix(&modules) {
                debug!(
                    "QR version {} level {:?} mask {} with {} correction(s)",
                    decoded.version,
                    decoded.ec_level,
                    decoded.mask.reference(),
                    decoded.corrected
                );
                let polygon = corners(&transform, dimension as f32);
                return Some(DecodedSymbol::new(SymbolType::QrCode, decoded.payload, polygon));
            }
        }
    }
    None
}

/// Outer symbol corners: top-left, bottom-left, bottom-right, top-right
fn corners(transform: &PerspectiveTransform, dimension: f32) -> Vec<PointI> {
    [(0.0, 0.0), (0.0, dimension), (dimension, dimension), (dimension, 0.0)]
        .into_iter()
        .map(|(x, y)| transform.transform(&Point::new(x, y)).round())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Version 1-M symbol holding the digits 4376471154038
    const GOLDEN: [&str; 21] = [
        "#######.....#.#######",
        "#.....#..#....#.....#",
        "#.###.#...##..#.###.#",
        "#.###.#...#...#.###.#",
        "#.###.#..####.#.###.#",
        "#.....#.#.#...#.....#",
        "#######.#.#.#.#######",
        ".........#...........",
        "#..#.##.######.#.....",
        "###.#..##..#.#.#.##..",
        "#..#.####.##..###...#",
        "..#.#..#....#####....",
        "..#...##.#.#.###.##..",
        "........#.#..####.##.",
        "#######...###.#.####.",
        "#.....#.#.....##....#",
        "#.###.#..##.###..#.##",
        "#.###.#.#.#..####..##",
        "#.###.#..###.###.#..#",
        "#.....#..####..##..#.",
        "#######.###..#.###...",
    ];

    #[test]
    fn test_golden_matrix() {
        let decoded = decode_matrix(&BitMatrix::from_ascii(&GOLDEN)).expect("decodes");
        assert_eq!(decoded.payload, b"4376471154038");
        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.ec_level, EcLevel::M);
        assert_eq!(decoded.mask.reference(), 7);
        assert_eq!(decoded.corrected, 0);
        assert!(!decoded.mirrored);
    }

    #[test]
    fn test_repairs_damaged_modules() {
        let mut modules = BitMatrix::from_ascii(&GOLDEN);
        // Four flipped data modules inside the bottom-right codewords
        for (x, y) in [(20, 20), (18, 15), (12, 20), (10, 12)] {
            modules.toggle(x, y);
        }
        let decoded = decode_matrix(&modules).expect("within correction capacity");
        assert_eq!(decoded.payload, b"4376471154038");
        assert!(decoded.corrected >= 1);
    }

    #[test]
    fn test_mirrored_matrix() {
        let mirrored = BitMatrix::from_ascii(&GOLDEN).transposed();
        let decoded = decode_matrix(&mirrored).expect("decodes mirrored");
        assert_eq!(decoded.payload, b"4376471154038");
        assert!(decoded.mirrored);
    }

    #[test]
    fn test_rejects_blank_grid() {
        assert!(decode_matrix(&BitMatrix::new(21, 21)).is_none());
        assert!(decode_matrix(&BitMatrix::new(22, 22)).is_none());
    }

    #[test]
    fn test_scan_painted_symbol() {
        let modules = BitMatrix::from_ascii(&GOLDEN);
        let (scale, margin) = (5u32, 30u32);
        let size = 21 * scale + 2 * margin;
        let gray = GrayImage::from_fn(size, size, |x, y| {
            let inside = |v: u32| v >= margin && v < margin + 21 * scale;
            let module = |v: u32| ((v - margin) / scale) as usize;
            let dark = inside(x) && inside(y) && modules.get(module(x), module(y));
            image::Luma([if dark { 0 } else { 255 }])
        });

        let symbols = scan(&gray);
        assert_eq!(symbols.len(), 1);
        let symbol = &symbols[0];
        assert_eq!(symbol.payload, b"4376471154038");
        assert_eq!(symbol.symbol_type, SymbolType::QrCode);
        assert_eq!(symbol.polygon.len(), 4);
        let near = |p: PointI, x: i32, y: i32| (p.x - x).abs() <= 2 && (p.y - y).abs() <= 2;
        assert!(near(symbol.polygon[0], 30, 30), "{:?}", symbol.polygon);
        assert!(near(symbol.polygon[2], 135, 135), "{:?}", symbol.polygon);
    }
}
