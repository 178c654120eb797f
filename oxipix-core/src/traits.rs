//! Core traits shared by the codec stages.

use crate::error::Result;

/// A whole-buffer, reversible byte transform.
///
/// Implemented by each codec stage and by the composed pipeline. Each call
/// owns all of its working state, so one codec value may be shared across
/// threads and used concurrently on different buffers.
pub trait ByteCodec {
    /// Short human-readable codec name.
    fn name(&self) -> &'static str;

    /// Encode a buffer. Only fails on resource exhaustion.
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Decode a buffer produced by [`ByteCodec::encode`].
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// A content digest used as a secondary comparison aid.
///
/// The only property relied upon is that equal inputs produce equal digests.
pub trait ContentDigest {
    /// Digest algorithm name.
    fn name(&self) -> &'static str;

    /// Compute the digest of `data`.
    fn digest(&self, data: &[u8]) -> Vec<u8>;
}

/// CRC-32 (IEEE) content digest, big-endian bytes of the checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Digest;

impl ContentDigest for Crc32Digest {
    fn name(&self) -> &'static str {
        "crc32"
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(data);
        hasher.finalize().to_be_bytes().to_vec()
    }
}

/// Render a digest as lowercase hex.
pub fn digest_hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
