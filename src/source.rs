//! Image loading

use std::path::Path;

use image::RgbImage;
use log::{debug, warn};

/// In-memory RGB pixels the decoder reads and the renderer draws on
pub type PixelBuffer = RgbImage;

/// Load an image file as RGB
///
/// Failure is reported as `None` (missing file, unknown format, corrupt or
/// empty image). The cause is logged; callers decide whether it is fatal.
pub fn load(path: impl AsRef<Path>) -> Option<PixelBuffer> {
    let path = path.as_ref();
    let image = match image::open(path) {
        Ok(image) => image,
        Err(err) => {
            warn!("cannot read {}: {err}", path.display());
            return None;
        }
    };
    if image.width() == 0 || image.height() == 0 {
        warn!("{} has no pixels", path.display());
        return None;
    }
    debug!("loaded {} ({}x{})", path.display(), image.width(), image.height());
    Some(image.to_rgb8())
}
