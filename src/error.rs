//! Error types for label conversion and dataset operations.

use std::path::PathBuf;
use thiserror::Error;

/// Position of a pixel inside a batch: `(image, row, column)`.
pub type PixelPos = (usize, usize, usize);

/// Errors raised by the label registry and the mask codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input grid has the wrong rank or trailing axis
    #[error("Shape error: expected {expected}, found {found:?}")]
    Shape {
        /// Description of the accepted shape
        expected: String,
        /// Shape that was actually presented
        found: Vec<usize>,
    },

    /// Class index outside `[0, 23]`
    #[error("Class index {value} out of range{}", fmt_pos(.position))]
    OutOfRange {
        /// The offending value
        value: i64,
        /// Where it was found, if it came from a grid
        position: Option<PixelPos>,
    },

    /// Color triplet not registered in the class table
    #[error("Unknown label color {color:?}{}", fmt_pos(.position))]
    UnknownColor {
        /// The unmatched RGB triplet
        color: [u8; 3],
        /// Where it was found, if it came from a grid
        position: Option<PixelPos>,
    },

    /// Failure of one item inside a list processed by the batch driver
    #[error("Item {index}: {source}")]
    Item {
        /// Index of the failing item
        index: usize,
        /// Underlying error
        #[source]
        source: Box<CodecError>,
    },
}

fn fmt_pos(position: &Option<PixelPos>) -> String {
    match position {
        Some((n, y, x)) => format!(" at image {}, row {}, column {}", n, y, x),
        None => String::new(),
    }
}

impl CodecError {
    /// Create a shape error.
    pub fn shape(expected: impl Into<String>, found: &[usize]) -> Self {
        Self::Shape {
            expected: expected.into(),
            found: found.to_vec(),
        }
    }

    /// Create an out-of-range error for a bare value.
    pub fn out_of_range(value: i64) -> Self {
        Self::OutOfRange {
            value,
            position: None,
        }
    }

    /// Create an unknown-color error for a bare triplet.
    pub fn unknown_color(color: [u8; 3]) -> Self {
        Self::UnknownColor {
            color,
            position: None,
        }
    }

    /// Attach a pixel position to a range or color error.
    pub fn at(self, pos: PixelPos) -> Self {
        match self {
            Self::OutOfRange { value, .. } => Self::OutOfRange {
                value,
                position: Some(pos),
            },
            Self::UnknownColor { color, .. } => Self::UnknownColor {
                color,
                position: Some(pos),
            },
            other => other,
        }
    }

    /// Wrap the error with the index of the list item that produced it.
    pub fn in_item(self, index: usize) -> Self {
        Self::Item {
            index,
            source: Box::new(self),
        }
    }
}

/// Errors raised while loading, splitting, or exporting datasets.
#[derive(Error, Debug)]
pub enum DataError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// NumPy read error
    #[error("NPY read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// NumPy write error
    #[error("NPY write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// JSON error (training history)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Label conversion failure
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Malformed dataset manifest
    #[error("Manifest error at line {line}: {message}")]
    Manifest {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Invalid parameter (split fraction, image size, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File referenced by a manifest is missing
    #[error("File not found: {path:?}")]
    NotFound {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// Every sample of a batch failed to load
    #[error("No samples could be loaded")]
    EmptyBatch,
}

impl DataError {
    /// Create a manifest error.
    pub fn manifest(line: usize, message: impl Into<String>) -> Self {
        Self::Manifest {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_position() {
        let err = CodecError::out_of_range(24).at((0, 1, 2));
        assert_eq!(
            err.to_string(),
            "Class index 24 out of range at image 0, row 1, column 2"
        );
    }

    #[test]
    fn test_display_without_position() {
        let err = CodecError::unknown_color([1, 2, 3]);
        assert_eq!(err.to_string(), "Unknown label color [1, 2, 3]");
    }

    #[test]
    fn test_item_wraps_source() {
        let err = CodecError::out_of_range(99).in_item(4);
        assert!(err.to_string().starts_with("Item 4: Class index 99"));
    }
}
