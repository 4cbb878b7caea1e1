//! Synthetic symbol images for tests and benchmarks
//!
//! Symbols are painted black on white without noise or blur, so a decoder
//! that misses one here has a logic bug rather than an imaging problem.

use image::Rgb;

use crate::decoder::linear::{code128, ean13};
use crate::models::{BitMatrix, BoundingRect};
use crate::source::PixelBuffer;

const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const LIGHT: Rgb<u8> = Rgb([255, 255, 255]);

/// White image of the given size
pub fn blank(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_pixel(width, height, LIGHT)
}

/// Bar and space widths, in modules, of a CODE128 symbol for `text`
///
/// Even-length digit strings use code set C, other printable ASCII set B.
pub fn code128_modules(text: &str) -> Option<Vec<u8>> {
    code128::encode(text)
}

/// Bar and space widths of an EAN-13 symbol
///
/// Twelve digits get their check digit computed; thirteen are used as
/// given. A leading zero makes it read back as UPC-A.
pub fn ean13_modules(digits: &str) -> Option<Vec<u8>> {
    ean13::encode(digits)
}

/// Paint alternating bars and spaces, first element dark, so that the
/// outermost dark pixels land exactly on `rect`'s edges
///
/// The painted area is inclusive of `rect.right()` and `rect.bottom()`.
/// Module widths are stretched fractionally to fit; pixels outside the
/// buffer are skipped.
pub fn paint_modules(buffer: &mut PixelBuffer, modules: &[u8], rect: BoundingRect) {
    let total: i64 = modules.iter().map(|&m| i64::from(m)).sum();
    if total == 0 || rect.width < 0 || rect.height < 0 {
        return;
    }
    let mut colors = Vec::with_capacity(total as usize);
    for (i, &m) in modules.iter().enumerate() {
        colors.extend(std::iter::repeat_n(i % 2 == 0, usize::from(m)));
    }

    let span = i64::from(rect.width) + 1;
    for x in rect.left..=rect.right() {
        let module = (i64::from(x - rect.left) * total / span) as usize;
        let color = if colors[module] { DARK } else { LIGHT };
        for y in rect.top..=rect.bottom() {
            put(buffer, x, y, color);
        }
    }
}

/// Paint a module grid with its top-left corner at (`left`, `top`)
pub fn paint_matrix(
    buffer: &mut PixelBuffer,
    left: i32,
    top: i32,
    matrix: &BitMatrix,
    module: u32,
) {
    let module = module as i32;
    for my in 0..matrix.height() {
        for mx in 0..matrix.width() {
            let color = if matrix.get(mx, my) { DARK } else { LIGHT };
            let (x0, y0) = (left + mx as i32 * module, top + my as i32 * module);
            for y in y0..y0 + module {
                for x in x0..x0 + module {
                    put(buffer, x, y, color);
                }
            }
        }
    }
}

fn put(buffer: &mut PixelBuffer, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < buffer.width() && (y as u32) < buffer.height() {
        buffer.put_pixel(x as u32, y as u32, color);
    }
}
