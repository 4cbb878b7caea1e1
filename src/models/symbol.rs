use std::fmt;
use std::str::Utf8Error;

use super::point::PointI;

/// Symbologies the decoder can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolType {
    /// EAN-13 retail code
    Ean13,
    /// UPC-A, an EAN-13 with a leading zero
    UpcA,
    /// CODE128 linear code
    Code128,
    /// QR Code model 2
    QrCode,
}

impl SymbolType {
    /// Upper-case name used in labels and report lines
    pub fn name(self) -> &'static str {
        match self {
            SymbolType::Ean13 => "EAN13",
            SymbolType::UpcA => "UPCA",
            SymbolType::Code128 => "CODE128",
            SymbolType::QrCode => "QRCODE",
        }
    }

    /// True for symbologies read along scanlines
    pub fn is_linear(self) -> bool {
        !matches!(self, SymbolType::QrCode)
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis-aligned box around a symbol
///
/// `width` and `height` are the spans between the extreme polygon
/// coordinates, so a box from x=10 to x=20 has width 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoundingRect {
    /// Leftmost x
    pub left: i32,
    /// Topmost y
    pub top: i32,
    /// max x - min x
    pub width: i32,
    /// max y - min y
    pub height: i32,
}

impl BoundingRect {
    /// Create a rect from its origin and extent
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Smallest rect containing every point; empty input gives the zero rect
    pub fn enclosing(points: &[PointI]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Rightmost x
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Bottommost y
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }
}

/// One symbol found in an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// Raw payload bytes
    pub payload: Vec<u8>,
    /// Which symbology produced the payload
    pub symbol_type: SymbolType,
    /// Box around `polygon`
    pub rect: BoundingRect,
    /// Outline points in pixel coordinates
    pub polygon: Vec<PointI>,
}

impl DecodedSymbol {
    /// Build a record, deriving `rect` from the polygon
    pub fn new(symbol_type: SymbolType, payload: Vec<u8>, polygon: Vec<PointI>) -> Self {
        Self {
            rect: BoundingRect::enclosing(&polygon),
            payload,
            symbol_type,
            polygon,
        }
    }

    /// Payload as strict UTF-8
    pub fn text(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(SymbolType::Code128.to_string(), "CODE128");
        assert_eq!(SymbolType::QrCode.to_string(), "QRCODE");
        assert_eq!(SymbolType::Ean13.name(), "EAN13");
        assert_eq!(SymbolType::UpcA.name(), "UPCA");
        assert!(SymbolType::UpcA.is_linear());
        assert!(!SymbolType::QrCode.is_linear());
    }

    #[test]
    fn test_enclosing_rect() {
        let points = [
            PointI::new(1498, 869),
            PointI::new(1498, 942),
            PointI::new(1975, 942),
            PointI::new(1975, 869),
        ];
        let rect = BoundingRect::enclosing(&points);
        assert_eq!(rect, BoundingRect::new(1498, 869, 477, 73));
        assert_eq!((rect.right(), rect.bottom()), (1975, 942));
        assert_eq!(BoundingRect::enclosing(&[]), BoundingRect::default());
    }

    #[test]
    fn test_text_is_strict() {
        let ok = DecodedSymbol::new(SymbolType::Code128, b"abc".to_vec(), vec![]);
        assert_eq!(ok.text(), Ok("abc"));

        let bad = DecodedSymbol::new(SymbolType::QrCode, vec![0x82, 0xa0], vec![]);
        assert!(bad.text().is_err());
    }
}
