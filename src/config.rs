//! Run configuration, built once in `main` and passed down by reference

use std::path::PathBuf;

use image::Rgb;

use crate::decoder::ScanOptions;

/// Title of the result window
pub const WINDOW_TITLE: &str = "Decoded results";

/// How overlays are drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Bounding rectangle colour
    pub rect_color: Rgb<u8>,
    /// Bounding rectangle stroke width in pixels
    pub rect_thickness: u32,
    /// Outline polygon colour
    pub outline_color: Rgb<u8>,
    /// Outline polygon stroke width in pixels
    pub outline_thickness: u32,
    /// Label text colour
    pub label_color: Rgb<u8>,
    /// Label stroke weight; each extra unit overdraws the text one pixel right
    pub label_thickness: u32,
    /// Gap between the label baseline and the top of the rectangle
    pub label_padding: i32,
    /// Label size relative to a 32 px em
    pub font_scale: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            rect_color: Rgb([255, 0, 0]),
            rect_thickness: 5,
            outline_color: Rgb([0, 0, 255]),
            outline_thickness: 3,
            label_color: Rgb([255, 0, 0]),
            label_thickness: 2,
            label_padding: 10,
            font_scale: 1.0,
        }
    }
}

/// Everything one run needs
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Input image
    pub image: PathBuf,
    /// Overlay appearance
    pub style: RenderStyle,
    /// Decoder settings
    pub scan: ScanOptions,
    /// Result window title
    pub window_title: String,
    /// Label font file used instead of the bundled face
    pub font: Option<PathBuf>,
}

impl Config {
    /// Defaults for everything except the input path
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: PathBuf::new(),
            style: RenderStyle::default(),
            scan: ScanOptions::default(),
            window_title: WINDOW_TITLE.to_string(),
            font: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("receipt.jpg");
        assert_eq!(config.image, PathBuf::from("receipt.jpg"));
        assert_eq!(config.window_title, "Decoded results");
        assert_eq!(config.style.rect_color, Rgb([255, 0, 0]));
        assert_eq!(config.style.rect_thickness, 5);
        assert_eq!(config.style.outline_color, Rgb([0, 0, 255]));
        assert_eq!(config.style.outline_thickness, 3);
        assert_eq!(config.style.label_padding, 10);
        assert!(config.font.is_none());
    }
}
