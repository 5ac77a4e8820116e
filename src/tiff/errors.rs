//! Custom error types for TIFF processing

use std::fmt;
use std::io;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Path does not exist
    NotFound(String),
    /// Expected a directory path
    NotADirectory(String),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Unsupported TIFF version (BigTIFF included)
    UnsupportedVersion(u16),
    /// Tag not found in the current directory
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method (only uncompressed strips are read)
    UnsupportedCompression(u64),
    /// Unsupported BitsPerSample / SampleFormat combination
    UnsupportedSampleType { bits: u64, format: u64 },
    /// PlanarConfiguration value other than contiguous or separate
    UnexpectedPlanarConfig(u64),
    /// Image dimensions not found
    MissingDimensions,
    /// Directory or frame index outside the discovered sequence
    DirectoryOutOfRange { index: usize, length: usize },
    /// Strip data did not fill the frame buffer
    IncompleteRead { expected: usize, actual: usize },
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::NotFound(path) => write!(f, "Path not found: {}", path),
            TiffError::NotADirectory(path) => write!(f, "Not a directory: {}", path),
            TiffError::InvalidHeader => write!(f, "Invalid TIFF header"),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::UnsupportedCompression(c) => {
                write!(f, "Unsupported compression method: {}", c)
            }
            TiffError::UnsupportedSampleType { bits, format } => {
                write!(f, "Unsupported sample type: {} bits, format {}", bits, format)
            }
            TiffError::UnexpectedPlanarConfig(v) => {
                write!(f, "Unexpected planar configuration: {}", v)
            }
            TiffError::MissingDimensions => write!(f, "Image dimensions not found"),
            TiffError::DirectoryOutOfRange { index, length } => {
                write!(f, "Directory index {} outside of [0, {})", index, length)
            }
            TiffError::IncompleteRead { expected, actual } => {
                write!(f, "Strips yielded {} of {} expected bytes", actual, expected)
            }
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;
