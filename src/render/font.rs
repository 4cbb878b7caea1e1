//! Label fonts
//!
//! Labels are drawn with the bundled DejaVu Sans face unless a font file is
//! named explicitly.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use log::{debug, warn};

/// Em height in pixels at font scale 1
const BASE_PX: f32 = 32.0;

/// DejaVu Sans, compiled in
static BUNDLED: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// A loaded face plus the pixel size labels are drawn at
#[derive(Debug)]
pub struct LabelFont {
    font: FontVec,
    scale: PxScale,
}

impl LabelFont {
    /// Parse a TrueType/OpenType file already in memory
    pub fn from_bytes(data: Vec<u8>, font_scale: f32) -> Option<Self> {
        let font = FontVec::try_from_vec(data).ok()?;
        Some(Self {
            font,
            scale: PxScale::from(BASE_PX * font_scale),
        })
    }

    /// Load a font file from disk
    pub fn load(path: impl AsRef<Path>, font_scale: f32) -> Option<Self> {
        let data = std::fs::read(path.as_ref()).ok()?;
        Self::from_bytes(data, font_scale)
    }

    /// The face compiled into the crate
    pub fn bundled(font_scale: f32) -> Option<Self> {
        Self::from_bytes(BUNDLED.to_vec(), font_scale)
    }

    /// `path` when it holds a usable font, the bundled face otherwise
    pub fn resolve(path: Option<&Path>, font_scale: f32) -> Option<Self> {
        if let Some(path) = path {
            match Self::load(path, font_scale) {
                Some(font) => {
                    debug!("label font {}", path.display());
                    return Some(font);
                }
                None => warn!(
                    "cannot use {} as label font, using the bundled face",
                    path.display()
                ),
            }
        }
        Self::bundled(font_scale)
    }

    /// Face to draw with
    pub fn font(&self) -> &FontVec {
        &self.font
    }

    /// Pixel size
    pub fn scale(&self) -> PxScale {
        self.scale
    }

    /// Distance from the top of a text line to its baseline
    pub fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }
}
