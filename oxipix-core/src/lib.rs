//! # OxiPix Core
//!
//! Core components for the OxiPix pixel codec.
//!
//! This crate provides the building blocks shared by every codec stage:
//!
//! - [`bitstream`]: MSB-first bit-level I/O over byte buffers
//! - [`traits`]: Codec and content digest traits
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Tools                                               │
//! │     CLI, image collaborators                           │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZSS, Huffman, LZHF container, verifier            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, errors, traits                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxipix_core::bitstream::{BitReader, BitWriter};
//! use oxipix_core::traits::{ContentDigest, Crc32Digest};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0xABC, 12);
//! let (bytes, padding) = writer.finish();
//!
//! let mut reader = BitReader::with_padding(&bytes, padding).unwrap();
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! let crc = Crc32Digest.digest(b"Hello, World!");
//! assert_eq!(crc, [0xEC, 0x4A, 0xC3, 0xD0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{ErrorKind, OxiPixError, Result};
pub use traits::{ByteCodec, ContentDigest, Crc32Digest};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{ErrorKind, OxiPixError, Result};
    pub use crate::traits::{ByteCodec, ContentDigest};
}
