//! Plain data carried between the decoder and the renderer

pub mod matrix;
pub mod point;
pub mod symbol;

pub use matrix::BitMatrix;
pub use point::{Point, PointI};
pub use symbol::{BoundingRect, DecodedSymbol, SymbolType};
