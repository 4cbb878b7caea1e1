use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use crate::models::SymbolType;

/// Everything that can stop a decode-and-display run
#[derive(Debug, Error)]
pub enum Error {
    /// The input path did not yield a pixel buffer
    #[error("could not load an image from {}", path.display())]
    ImageUnavailable {
        /// Path given on the command line
        path: PathBuf,
    },

    /// A payload is not valid UTF-8 and cannot be labelled
    #[error("{symbol_type} payload is not valid UTF-8")]
    PayloadEncoding {
        /// Symbology of the offending symbol
        symbol_type: SymbolType,
        /// Where decoding stopped
        #[source]
        source: Utf8Error,
    },

    /// The window system refused to show the result
    #[error("display failed: {0}")]
    Display(String),

    /// Writing a report line failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
