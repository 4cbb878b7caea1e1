//! Image and geometry helpers shared by the decoder and renderer
//!
//! - Binarization (Otsu's method)
//! - Geometry (perspective transforms, convex hull, outline normalization)

pub mod binarization;
pub mod geometry;
