//! Overlay drawing and result reporting
//!
//! For every decoded symbol the renderer draws its bounding rectangle, its
//! normalized outline and a `payload (TYPE)` label, then writes one report
//! line. Drawing is clipped to the buffer.

mod font;

pub use font::LabelFont;

use std::io::Write;
use std::path::Path;

use image::Rgb;
use imageproc::drawing::{BresenhamLineIter, draw_filled_circle_mut, draw_text_mut};
use log::warn;

use crate::config::{RenderStyle, WINDOW_TITLE};
use crate::error::{Error, Result};
use crate::models::{BoundingRect, DecodedSymbol, PointI};
use crate::source::PixelBuffer;
use crate::utils::geometry::normalize_polygon;
use crate::viewer::Viewer;

/// Draws overlays in one style
#[derive(Debug)]
pub struct Renderer {
    style: RenderStyle,
    font: Option<LabelFont>,
}

impl Renderer {
    /// Renderer drawing labels with the bundled face
    pub fn new(style: RenderStyle) -> Self {
        Self::with_font_file(style, None)
    }

    /// Renderer drawing labels with the font at `path`, if it loads
    ///
    /// An unreadable file falls back to the bundled face. Should no face
    /// parse at all, labels are skipped and a warning is logged.
    pub fn with_font_file(style: RenderStyle, path: Option<&Path>) -> Self {
        let font = LabelFont::resolve(path, style.font_scale);
        if font.is_none() {
            warn!("no usable label font, labels will not be drawn");
        }
        Self::with_font(style, font)
    }

    /// Renderer with an explicit label font, or none
    pub fn with_font(style: RenderStyle, font: Option<LabelFont>) -> Self {
        Self { style, font }
    }

    /// Style in use
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Draw every symbol onto `buffer` and write its report line
    ///
    /// Payloads are checked for UTF-8 before anything is drawn or written;
    /// one bad payload fails the whole call with
    /// [`Error::PayloadEncoding`] and leaves the buffer untouched.
    pub fn annotate(
        &self,
        buffer: &mut PixelBuffer,
        symbols: &[DecodedSymbol],
        report: &mut impl Write,
    ) -> Result<()> {
        let texts = symbols
            .iter()
            .map(|symbol| {
                symbol.text().map_err(|source| Error::PayloadEncoding {
                    symbol_type: symbol.symbol_type,
                    source,
                })
            })
            .collect::<Result<Vec<&str>>>()?;

        for (symbol, text) in symbols.iter().zip(texts) {
            self.draw_rect(buffer, &symbol.rect);
            self.draw_outline(buffer, &normalize_polygon(&symbol.polygon));
            self.draw_label(buffer, &symbol.rect, &format!("{text} ({})", symbol.symbol_type));
            writeln!(report, "[INFO] Found {} barcode: {text}", symbol.symbol_type)?;
        }
        Ok(())
    }

    fn draw_rect(&self, buffer: &mut PixelBuffer, rect: &BoundingRect) {
        let corners = [
            PointI::new(rect.left, rect.top),
            PointI::new(rect.right(), rect.top),
            PointI::new(rect.right(), rect.bottom()),
            PointI::new(rect.left, rect.bottom()),
        ];
        draw_closed(buffer, &corners, self.style.rect_color, self.style.rect_thickness);
    }

    fn draw_outline(&self, buffer: &mut PixelBuffer, polygon: &[PointI]) {
        draw_closed(buffer, polygon, self.style.outline_color, self.style.outline_thickness);
    }

    /// Text baseline sits `label_padding` above the rectangle's top edge
    fn draw_label(&self, buffer: &mut PixelBuffer, rect: &BoundingRect, label: &str) {
        let Some(font) = &self.font else {
            return;
        };
        let baseline = rect.top - self.style.label_padding;
        let top = baseline - font.ascent().round() as i32;
        for offset in 0..self.style.label_thickness.max(1) as i32 {
            draw_text_mut(
                buffer,
                self.style.label_color,
                rect.left + offset,
                top,
                font.scale(),
                font.font(),
                label,
            );
        }
    }
}

/// Polyline through `points`, closed back to the first one
fn draw_closed(buffer: &mut PixelBuffer, points: &[PointI], color: Rgb<u8>, thickness: u32) {
    match points {
        [] => {}
        [only] => draw_thick_line(buffer, *only, *only, color, thickness),
        _ => {
            for (i, &from) in points.iter().enumerate() {
                let to = points[(i + 1) % points.len()];
                draw_thick_line(buffer, from, to, color, thickness);
            }
        }
    }
}

/// Discs of diameter `thickness` stamped along a Bresenham line
fn draw_thick_line(
    buffer: &mut PixelBuffer,
    from: PointI,
    to: PointI,
    color: Rgb<u8>,
    thickness: u32,
) {
    let radius = (thickness / 2) as i32;
    let start = (from.x as f32, from.y as f32);
    let end = (to.x as f32, to.y as f32);
    for (x, y) in BresenhamLineIter::new(start, end) {
        if radius == 0 {
            if x >= 0 && y >= 0 && (x as u32) < buffer.width() && (y as u32) < buffer.height() {
                buffer.put_pixel(x as u32, y as u32, color);
            }
        } else {
            draw_filled_circle_mut(buffer, (x, y), radius, color);
        }
    }
}

/// Annotate `buffer`, then hand it to `viewer` under the default window title
///
/// The viewer is invoked even when there is nothing to draw. Every payload
/// is validated as UTF-8 before the first symbol is drawn or reported, so a
/// bad payload anywhere in `symbols` leaves `buffer` and `report` untouched
/// and the viewer is not called; no lines are written for the symbols
/// before it.
pub fn render(
    buffer: &mut PixelBuffer,
    symbols: &[DecodedSymbol],
    style: &RenderStyle,
    viewer: &mut dyn Viewer,
    report: &mut impl Write,
) -> Result<()> {
    Renderer::new(*style).annotate(buffer, symbols, report)?;
    viewer.show(WINDOW_TITLE, buffer)
}
