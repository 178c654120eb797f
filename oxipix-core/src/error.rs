//! Error types for OxiPix operations.
//!
//! A single error enum covers every failure of the codec stack. Variants are
//! grouped into coarse [`ErrorKind`]s so callers can tell a malformed
//! container apart from a verification mismatch or unsupported parameters
//! without matching on every variant.

use std::io;
use thiserror::Error;

/// The main error type for OxiPix operations.
#[derive(Debug, Error)]
pub enum OxiPixError {
    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in container header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Invalid header field.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Unexpected end of data.
    #[error("Unexpected end of data at bit position {bit_position}: needed {needed} more bits")]
    UnexpectedEof {
        /// Bit position where the read was attempted.
        bit_position: u64,
        /// Number of bits that were required but not available.
        needed: u64,
    },

    /// Serialized Huffman code table is inconsistent.
    #[error("Invalid code table: {message}")]
    InvalidCodeTable {
        /// Description of the inconsistency.
        message: String,
    },

    /// Bit sequence does not resolve to a symbol.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted data in a stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte or bit offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid distance in an LZSS back-reference.
    #[error("Invalid back-reference distance: {distance} (history size {history_size})")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Current history size.
        history_size: usize,
    },

    /// Match length outside the configured range.
    #[error("Invalid match length {length}: must be within {min}..={max}")]
    InvalidMatchLength {
        /// The invalid length.
        length: usize,
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Compression parameters that the token format cannot express.
    #[error("Unsupported parameters: {message}")]
    UnsupportedParameters {
        /// Description of the incompatibility.
        message: String,
    },

    /// Round-tripped data differs from the original.
    #[error(
        "Verification mismatch: original {original_len} bytes, round-tripped {actual_len} bytes, first difference at {first_difference:?}"
    )]
    VerificationMismatch {
        /// Length of the original buffer.
        original_len: usize,
        /// Length of the round-tripped buffer.
        actual_len: usize,
        /// Index of the first differing byte, if the byte comparison failed.
        first_difference: Option<usize>,
    },

    /// Input exceeds what the format can represent.
    #[error("Input too large: {message}")]
    InputTooLarge {
        /// Description of the exhausted resource.
        message: String,
    },
}

/// Result type alias for OxiPix operations.
pub type Result<T> = std::result::Result<T, OxiPixError>;

/// Coarse classification of [`OxiPixError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed container or stream (bad magic, truncation, corrupt codes).
    Format,
    /// Back-reference outside the valid range.
    Bounds,
    /// Parameters the format cannot express.
    Unsupported,
    /// Round-trip verification failed.
    Verification,
    /// Input exceeds format limits.
    Resource,
    /// Underlying I/O failure.
    Io,
}

impl OxiPixError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidMagic { .. }
            | Self::InvalidHeader { .. }
            | Self::UnexpectedEof { .. }
            | Self::InvalidCodeTable { .. }
            | Self::InvalidHuffmanCode { .. }
            | Self::CorruptedData { .. } => ErrorKind::Format,
            Self::InvalidDistance { .. } | Self::InvalidMatchLength { .. } => ErrorKind::Bounds,
            Self::UnsupportedParameters { .. } => ErrorKind::Unsupported,
            Self::VerificationMismatch { .. } => ErrorKind::Verification,
            Self::InputTooLarge { .. } => ErrorKind::Resource,
        }
    }

    /// True for errors caused by malformed input (format or bounds).
    pub fn is_malformed(&self) -> bool {
        matches!(self.kind(), ErrorKind::Format | ErrorKind::Bounds)
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(bit_position: u64, needed: u64) -> Self {
        Self::UnexpectedEof {
            bit_position,
            needed,
        }
    }

    /// Create an invalid code table error.
    pub fn invalid_code_table(message: impl Into<String>) -> Self {
        Self::InvalidCodeTable {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an invalid match length error.
    pub fn invalid_match_length(length: usize, min: usize, max: usize) -> Self {
        Self::InvalidMatchLength { length, min, max }
    }

    /// Create an unsupported parameters error.
    pub fn unsupported_parameters(message: impl Into<String>) -> Self {
        Self::UnsupportedParameters {
            message: message.into(),
        }
    }

    /// Create a verification mismatch error.
    pub fn verification_mismatch(
        original_len: usize,
        actual_len: usize,
        first_difference: Option<usize>,
    ) -> Self {
        Self::VerificationMismatch {
            original_len,
            actual_len,
            first_difference,
        }
    }

    /// Create an input too large error.
    pub fn input_too_large(message: impl Into<String>) -> Self {
        Self::InputTooLarge {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiPixError::invalid_magic(b"LZHF".to_vec(), b"LZHX".to_vec());
        assert!(err.to_string().contains("Invalid magic"));

        let err = OxiPixError::invalid_distance(5000, 12);
        assert!(err.to_string().contains("5000"));

        let err = OxiPixError::unsupported_parameters("window 8192");
        assert!(err.to_string().contains("window 8192"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            OxiPixError::invalid_header("x").kind(),
            ErrorKind::Format
        );
        assert_eq!(
            OxiPixError::invalid_match_length(2, 3, 18).kind(),
            ErrorKind::Bounds
        );
        assert_eq!(
            OxiPixError::verification_mismatch(1, 2, None).kind(),
            ErrorKind::Verification
        );
        assert!(OxiPixError::invalid_distance(0, 0).is_malformed());
        assert!(OxiPixError::invalid_huffman(3).is_malformed());
        assert!(!OxiPixError::unsupported_parameters("x").is_malformed());
        assert!(!OxiPixError::input_too_large("x").is_malformed());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OxiPixError = io_err.into();
        assert!(matches!(err, OxiPixError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
