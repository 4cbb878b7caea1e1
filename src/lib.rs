//! barscan - find barcodes in a still image and mark them up
//!
//! Decodes CODE128, EAN-13/UPC-A and QR Code symbols from a pixel buffer,
//! draws each symbol's bounding box, outline and label onto the image,
//! reports one line per symbol and shows the result.
//!
//! ```no_run
//! let buffer = barscan::load("shelf.png").expect("readable image");
//! for symbol in barscan::decode(&buffer) {
//!     println!("{} {:?}", symbol.symbol_type, symbol.text());
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Run configuration and overlay style
pub mod config;
/// Symbol decoders (scanline 1D readers and QR)
pub mod decoder;
/// Crate error type
pub mod error;
/// Core data structures (DecodedSymbol, BitMatrix, Point, etc.)
pub mod models;
/// Load-decode-render-display orchestration
pub mod pipeline;
/// Overlay drawing and report lines
pub mod render;
/// Image loading
pub mod source;
/// Synthetic symbol images for tests and benchmarks
pub mod synth;
/// Utility functions (binarization, geometry)
pub mod utils;
/// Result display
pub mod viewer;

pub use config::{Config, RenderStyle, WINDOW_TITLE};
pub use decoder::{ScanOptions, Scanner, decode};
pub use error::{Error, Result};
pub use models::{BoundingRect, DecodedSymbol, Point, PointI, SymbolType};
pub use pipeline::run;
pub use render::{Renderer, render};
pub use source::{PixelBuffer, load};
pub use utils::geometry::{convex_hull, normalize_polygon};
pub use viewer::{HeadlessViewer, Viewer, default_viewer};
