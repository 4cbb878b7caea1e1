//! Symbol decoding
//!
//! [`Scanner`] converts the buffer to greyscale once and runs the enabled
//! readers over it: the scanline engine for CODE128 and EAN-13/UPC-A, then
//! the QR reader. Results come back linear symbols first, then QR symbols,
//! each group in the order its reader found them.

pub(crate) mod linear;
pub mod qr;

use image::imageops;
use log::debug;

use crate::models::DecodedSymbol;
use crate::source::PixelBuffer;

use self::linear::LineReader;
use self::linear::code128::Code128Reader;
use self::linear::ean13::Ean13Reader;

/// Which symbologies to look for and how densely to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Read CODE128
    pub code128: bool,
    /// Read EAN-13 and UPC-A
    pub ean13: bool,
    /// Read QR Code
    pub qr: bool,
    /// Distance between scanned rows (and columns) for 1D symbols
    pub line_step: usize,
    /// Scanlines that must agree before a 1D symbol is reported
    pub min_line_hits: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            code128: true,
            ean13: true,
            qr: true,
            line_step: 1,
            min_line_hits: 2,
        }
    }
}

/// Reusable decoder with fixed options
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Scanner with every symbology enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner with explicit options
    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Decode every visible symbol. The buffer is only read.
    pub fn decode(&self, buffer: &PixelBuffer) -> Vec<DecodedSymbol> {
        if buffer.width() == 0 || buffer.height() == 0 {
            return Vec::new();
        }
        let gray = imageops::grayscale(buffer);

        let mut readers: Vec<&dyn LineReader> = Vec::with_capacity(2);
        if self.options.code128 {
            readers.push(&Code128Reader);
        }
        if self.options.ean13 {
            readers.push(&Ean13Reader);
        }

        let mut symbols = linear::scan(&gray, &readers, &self.options);
        if self.options.qr {
            symbols.extend(qr::scan(&gray));
        }
        debug!(
            "decoded {} symbol(s) in {}x{}",
            symbols.len(),
            buffer.width(),
            buffer.height()
        );
        symbols
    }
}

/// Decode `buffer` with default options
pub fn decode(buffer: &PixelBuffer) -> Vec<DecodedSymbol> {
    Scanner::new().decode(buffer)
}
