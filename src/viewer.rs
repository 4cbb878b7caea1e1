//! Result display
//!
//! Showing the annotated image is the only blocking step of a run. It sits
//! behind [`Viewer`] so the binary can open a window while tests record
//! what would have been shown.

use log::warn;

use crate::error::Result;
use crate::source::PixelBuffer;

/// Shows a finished image and returns once the user is done with it
pub trait Viewer {
    /// Display `image` under `title`, blocking until dismissed
    fn show(&mut self, title: &str, image: &PixelBuffer) -> Result<()>;
}

/// Viewer for builds without a window system; it only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessViewer;

impl Viewer for HeadlessViewer {
    fn show(&mut self, title: &str, image: &PixelBuffer) -> Result<()> {
        warn!(
            "no display available, not showing \"{title}\" ({}x{}); \
             build with the display-window feature for a window",
            image.width(),
            image.height()
        );
        Ok(())
    }
}

/// SDL2 window that stays open until a key press or close request
#[cfg(feature = "display-window")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowViewer;

#[cfg(feature = "display-window")]
impl Viewer for WindowViewer {
    fn show(&mut self, title: &str, image: &PixelBuffer) -> Result<()> {
        use sdl2::event::{Event, WindowEvent};
        use sdl2::pixels::PixelFormatEnum;

        use crate::error::Error;

        let (width, height) = image.dimensions();

        let sdl = sdl2::init().map_err(Error::Display)?;
        let video = sdl.video().map_err(Error::Display)?;
        let window = video
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| Error::Display(e.to_string()))?;
        let mut canvas = window
            .into_canvas()
            .build()
            .map_err(|e| Error::Display(e.to_string()))?;
        let creator = canvas.texture_creator();
        let mut texture = creator
            .create_texture_static(PixelFormatEnum::RGB24, width, height)
            .map_err(|e| Error::Display(e.to_string()))?;
        texture
            .update(None, image.as_raw(), width as usize * 3)
            .map_err(|e| Error::Display(e.to_string()))?;

        canvas.copy(&texture, None, None).map_err(Error::Display)?;
        canvas.present();

        let mut events = sdl.event_pump().map_err(Error::Display)?;
        loop {
            match events.wait_event() {
                Event::Quit { .. } | Event::KeyDown { .. } => break,
                Event::Window {
                    win_event: WindowEvent::Exposed,
                    ..
                } => {
                    canvas.copy(&texture, None, None).map_err(Error::Display)?;
                    canvas.present();
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Window viewer when built with `display-window`, headless otherwise
pub fn default_viewer() -> Box<dyn Viewer> {
    #[cfg(feature = "display-window")]
    {
        Box::new(WindowViewer)
    }
    #[cfg(not(feature = "display-window"))]
    {
        Box::new(HeadlessViewer)
    }
}
