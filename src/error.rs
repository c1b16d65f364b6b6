//! Unified error types for codec operations.

use crate::format::ImageFormat;

/// Boxed error produced by an underlying codec crate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for codec operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Extension, ordinal or format has no encoder.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    /// Ordinal cannot be mapped back to a format.
    #[error("unknown image format ordinal {0}")]
    UnknownFormat(i32),
    /// Codec not compiled in, or disabled in the codec registry.
    #[error("format {0} is disabled in the codec registry")]
    DisabledFormat(ImageFormat),
    /// No decoder recognized the stream, or the decoder failed mid-stream.
    #[error("{} decode failed: {source}", .format.map_or("image".to_string(), |f| f.to_string()))]
    Decode {
        format: Option<ImageFormat>,
        #[source]
        source: BoxError,
    },
    /// The codec rejected the image or its settings.
    #[error("{format} encode failed: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: BoxError,
    },
    /// Input validation failed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// I/O failure on the caller's sink or source.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Returned as the [`CodecError::Decode`] source when no decoder claims a stream.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized image format")]
pub struct UnrecognizedFormat;

// Conversion helpers for codec-specific errors
impl CodecError {
    /// Wrap a decoder error.
    pub fn from_decoder<E>(format: ImageFormat, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        CodecError::Decode {
            format: Some(format),
            source: error.into(),
        }
    }

    /// Wrap an encoder error.
    pub fn from_encoder<E>(format: ImageFormat, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        CodecError::Encode {
            format,
            source: error.into(),
        }
    }

    /// Decode error for a stream no decoder recognized.
    pub fn unrecognized() -> Self {
        CodecError::Decode {
            format: None,
            source: Box::new(UnrecognizedFormat),
        }
    }

    /// Whether this is a decode failure of any kind.
    pub fn is_decode(&self) -> bool {
        matches!(self, CodecError::Decode { .. })
    }

    /// Whether this is an encode failure raised by a codec.
    pub fn is_encode(&self) -> bool {
        matches!(self, CodecError::Encode { .. })
    }
}
