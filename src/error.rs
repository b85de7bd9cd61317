//! Error types for WebP plugin operations.

use crate::types::ImageMode;
use whereat::At;

/// Result type for plugin operations.
///
/// Errors carry the location they were raised at via [`whereat::At`].
pub type Result<T> = core::result::Result<T, At<Error>>;

/// Error type for plugin operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input parameters (dimensions, buffer size, option values).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// libwebp could not decode the input.
    #[error("decode failed: {0}")]
    DecodeFailed(DecodingError),
    /// libwebp could not encode the pixels.
    #[error("encode failed: {0}")]
    EncodeFailed(EncodingError),
    /// Probed and decoded dimensions disagree.
    #[error(
        "dimension mismatch: probed {}x{}, decoded {}x{}",
        .probed.0, .probed.1, .decoded.0, .decoded.1
    )]
    DimensionMismatch {
        /// Dimensions reported by the feature probe.
        probed: (u32, u32),
        /// Dimensions reported by the full decode.
        decoded: (u32, u32),
    },
    /// The image's pixel mode cannot be written as WebP.
    #[error("cannot write mode {0} as WEBP")]
    UnsupportedMode(ImageMode),
    /// Reading the input or writing the output failed.
    #[error("I/O error ({0:?}): {1}")]
    Io(std::io::ErrorKind, String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.kind(), err.to_string())
    }
}

/// Encoding error codes from libwebp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[repr(i32)]
pub enum EncodingError {
    /// No error
    #[error("ok")]
    Ok = 0,
    /// Memory allocation error
    #[error("out of memory")]
    OutOfMemory = 1,
    /// Bitstream out of memory
    #[error("bitstream out of memory")]
    BitstreamOutOfMemory = 2,
    /// NULL parameter
    #[error("null parameter")]
    NullParameter = 3,
    /// Invalid configuration
    #[error("invalid configuration")]
    InvalidConfiguration = 4,
    /// Bad dimension (width or height is 0 or > 16383)
    #[error("bad dimension")]
    BadDimension = 5,
    /// Partition is bigger than 512k
    #[error("partition0 overflow")]
    Partition0Overflow = 6,
    /// Partition is bigger than 16M
    #[error("partition overflow")]
    PartitionOverflow = 7,
    /// Bad write callback
    #[error("bad write")]
    BadWrite = 8,
    /// File is bigger than 4G
    #[error("file too big")]
    FileTooBig = 9,
    /// User abort
    #[error("user abort")]
    UserAbort = 10,
    /// Last error (unknown)
    #[error("unknown error")]
    Last = 11,
}

impl From<i32> for EncodingError {
    fn from(code: i32) -> Self {
        match code {
            0 => EncodingError::Ok,
            1 => EncodingError::OutOfMemory,
            2 => EncodingError::BitstreamOutOfMemory,
            3 => EncodingError::NullParameter,
            4 => EncodingError::InvalidConfiguration,
            5 => EncodingError::BadDimension,
            6 => EncodingError::Partition0Overflow,
            7 => EncodingError::PartitionOverflow,
            8 => EncodingError::BadWrite,
            9 => EncodingError::FileTooBig,
            10 => EncodingError::UserAbort,
            _ => EncodingError::Last,
        }
    }
}

/// Decoding status codes from libwebp (`VP8StatusCode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[repr(i32)]
pub enum DecodingError {
    /// No error
    #[error("ok")]
    Ok = 0,
    /// Memory allocation error
    #[error("out of memory")]
    OutOfMemory = 1,
    /// Invalid parameter
    #[error("invalid param")]
    InvalidParam = 2,
    /// Bitstream error
    #[error("bitstream error")]
    BitstreamError = 3,
    /// Unsupported feature
    #[error("unsupported feature")]
    UnsupportedFeature = 4,
    /// Suspended (need more data)
    #[error("suspended")]
    Suspended = 5,
    /// User abort
    #[error("user abort")]
    UserAbort = 6,
    /// Not enough data
    #[error("not enough data")]
    NotEnoughData = 7,
}

impl From<i32> for DecodingError {
    fn from(code: i32) -> Self {
        match code {
            0 => DecodingError::Ok,
            1 => DecodingError::OutOfMemory,
            2 => DecodingError::InvalidParam,
            3 => DecodingError::BitstreamError,
            4 => DecodingError::UnsupportedFeature,
            5 => DecodingError::Suspended,
            6 => DecodingError::UserAbort,
            _ => DecodingError::NotEnoughData,
        }
    }
}
