//! # OxiPix LZHF
//!
//! Pure Rust two-stage lossless codec: LZSS tokens followed by Huffman
//! coding, wrapped in a small self-describing container.
//!
//! The crate provides:
//!
//! - **LZSS**: hash-chain match finder and byte-by-byte back-reference replay
//!   ([`lzss`])
//! - **Huffman**: per-buffer trees, code tables and their serialization
//!   ([`huffman`])
//! - **Container**: the `LZHF` (two-stage) and `LZSS` (single-stage) formats
//!   ([`container`])
//! - **Pipeline**: both stages composed, with compression reports
//!   ([`pipeline`])
//! - **Verifier**: byte and digest comparison of round trips ([`verify`])
//! - **Image boundary**: traits for pulling pixels out of image files
//!   ([`image`])
//!
//! ## Example
//!
//! ```rust
//! use oxipix_lzhf::{LzssParams, Pipeline, Verifier, compress, decompress};
//!
//! let data = b"pixel pixel pixel pixel pixel pixel";
//! let packed = compress(data).unwrap();
//! assert_eq!(&packed[..4], b"LZHF");
//! assert_eq!(decompress(&packed).unwrap(), data);
//!
//! // LZSS only, with a smaller window
//! let params = LzssParams::new(1024, 18, 3).unwrap();
//! let pipeline = Pipeline::single_stage(params).unwrap();
//! let (_, verified) = Verifier::crc32().roundtrip(&pipeline, data).unwrap();
//! assert_eq!(verified.len, data.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod huffman;
pub mod image;
pub mod lzss;
pub mod params;
pub mod pipeline;
pub mod verify;

// Re-exports
pub use container::{Container, Payload};
pub use huffman::{
    CodeTable, FrequencyTable, HuffmanBlock, HuffmanCode, HuffmanDecoder, HuffmanEncoder,
    HuffmanTree, huffman_compress, huffman_decompress,
};
pub use image::{ImageInfo, ImageSink, ImageSource, PackedImage, RawImage, pack_image, unpack_image};
pub use lzss::{LzssCodec, LzssDecoder, LzssEncoder, LzssToken, lzss_compress, lzss_decompress};
pub use params::{LzssParams, StageMode};
pub use pipeline::{CompressionReport, Pipeline, compress, decompress, decompress_container};
pub use verify::{Sha256Digest, Verifier, VerifyReport};
