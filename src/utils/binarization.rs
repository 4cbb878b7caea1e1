//! Global thresholding used ahead of QR finder detection

use image::GrayImage;
use imageproc::contrast::otsu_level;

use crate::models::BitMatrix;

/// Binarize with Otsu's level; dark cells are pixels at or below it
///
/// A flat image has no foreground and comes back all light.
pub fn otsu_binarize(gray: &GrayImage) -> BitMatrix {
    let (width, height) = gray.dimensions();
    let mut binary = BitMatrix::new(width as usize, height as usize);

    let mut raw = gray.as_raw().iter();
    let Some(&first) = raw.next() else {
        return binary;
    };
    if raw.all(|&v| v == first) {
        return binary;
    }

    let level = otsu_level(gray);
    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] <= level {
            binary.set(x as usize, y as usize, true);
        }
    }
    binary
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_two_tone_image() {
        let gray = GrayImage::from_fn(8, 4, |x, _| if x < 3 { Luma([20]) } else { Luma([230]) });
        let binary = otsu_binarize(&gray);
        assert!(binary.get(0, 0) && binary.get(2, 3));
        assert!(!binary.get(3, 0) && !binary.get(7, 3));
        assert_eq!(binary.count_dark(), 12);
    }

    #[test]
    fn test_flat_image_is_light() {
        let gray = GrayImage::from_pixel(5, 5, Luma([0]));
        assert_eq!(otsu_binarize(&gray).count_dark(), 0);
        assert_eq!(otsu_binarize(&GrayImage::new(0, 0)).count_dark(), 0);
    }
}
