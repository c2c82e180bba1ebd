//! Error types for the redeck library.

use std::io;
use thiserror::Error;

/// Result type alias for redeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while transforming a presentation.
///
/// The two remap preconditions ([`Error::InvalidLayout`] and
/// [`Error::NoExtractableContent`]) abort only the remap step; the
/// pipeline records them and still produces the recolored deck. All
/// other variants are hard failures for the whole run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the ZIP package.
    #[error("ZIP package error: {0}")]
    ZipPackage(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package part is missing.
    #[error("Missing part: {0}")]
    MissingPart(String),

    /// Invalid or malformed data in the package.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The requested layout template index does not exist.
    #[error("invalid layout index {index}: the deck has {count} layout(s)")]
    InvalidLayout { index: usize, count: usize },

    /// No slide yielded a non-empty title or body.
    #[error("no extractable content in any slide")]
    NoExtractableContent,
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipPackage(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
