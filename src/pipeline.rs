//! One complete run: load, decode, annotate, display

use std::io::Write;

use log::{debug, info};

use crate::config::Config;
use crate::decoder::Scanner;
use crate::error::{Error, Result};
use crate::models::DecodedSymbol;
use crate::render::Renderer;
use crate::source;
use crate::viewer::Viewer;

/// Load `config.image`, decode it, draw the results, report them to
/// `report` and show the annotated image through `viewer`
///
/// Returns the decoded symbols. The viewer is called even when nothing was
/// found; a payload that is not UTF-8 stops the run before display.
pub fn run(
    config: &Config,
    viewer: &mut dyn Viewer,
    report: &mut impl Write,
) -> Result<Vec<DecodedSymbol>> {
    let renderer = Renderer::with_font_file(config.style, config.font.as_deref());
    run_with(config, &renderer, viewer, report)
}

/// [`run`] with a caller-supplied renderer
pub fn run_with(
    config: &Config,
    renderer: &Renderer,
    viewer: &mut dyn Viewer,
    report: &mut impl Write,
) -> Result<Vec<DecodedSymbol>> {
    let Some(mut buffer) = source::load(&config.image) else {
        return Err(Error::ImageUnavailable {
            path: config.image.clone(),
        });
    };

    let symbols = Scanner::with_options(config.scan.clone()).decode(&buffer);
    info!("{} symbol(s) in {}", symbols.len(), config.image.display());

    renderer.annotate(&mut buffer, &symbols, report)?;
    report.flush()?;

    debug!("showing result as \"{}\"", config.window_title);
    viewer.show(&config.window_title, &buffer)?;
    Ok(symbols)
}
