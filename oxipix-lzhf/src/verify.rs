//! Round-trip verification.
//!
//! The byte comparison is authoritative. A [`ContentDigest`] may be attached
//! as a secondary, human-facing confirmation; any disagreement from either
//! check is an error.

use crate::pipeline::{CompressionReport, Pipeline};
use oxipix_core::error::{OxiPixError, Result};
use oxipix_core::traits::{ContentDigest, Crc32Digest, digest_hex};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// SHA-256 content digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl ContentDigest for Sha256Digest {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Number of bytes compared.
    pub len: usize,
    /// Digest algorithm, if one was used.
    pub digest_name: Option<&'static str>,
    /// Hex digest shared by both buffers.
    pub digest_hex: Option<String>,
}

/// Equality oracle for original and round-tripped buffers.
pub struct Verifier {
    digest: Option<Box<dyn ContentDigest + Send + Sync>>,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("digest", &self.digest.as_ref().map(|d| d.name()))
            .finish()
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier {
    /// Byte comparison only.
    pub fn new() -> Self {
        Self { digest: None }
    }

    /// Byte comparison plus `digest`.
    pub fn with_digest(digest: impl ContentDigest + Send + Sync + 'static) -> Self {
        Self {
            digest: Some(Box::new(digest)),
        }
    }

    /// Byte comparison plus CRC-32.
    pub fn crc32() -> Self {
        Self::with_digest(Crc32Digest)
    }

    /// Byte comparison plus SHA-256.
    pub fn sha256() -> Self {
        Self::with_digest(Sha256Digest)
    }

    /// Compare two buffers.
    pub fn verify(&self, original: &[u8], roundtripped: &[u8]) -> Result<VerifyReport> {
        if original != roundtripped {
            // One buffer is a prefix of the other: they part at the shorter length.
            let first_difference = Some(
                original
                    .iter()
                    .zip(roundtripped)
                    .position(|(a, b)| a != b)
                    .unwrap_or(original.len().min(roundtripped.len())),
            );
            warn!(
                original = original.len(),
                actual = roundtripped.len(),
                first_difference,
                "round trip mismatch"
            );
            return Err(OxiPixError::verification_mismatch(
                original.len(),
                roundtripped.len(),
                first_difference,
            ));
        }

        let (digest_name, digest_hex) = match &self.digest {
            Some(digest) => {
                let expected = digest.digest(original);
                let actual = digest.digest(roundtripped);
                if expected != actual {
                    warn!(
                        len = original.len(),
                        digest = digest.name(),
                        "digest mismatch on equal buffers"
                    );
                    return Err(OxiPixError::verification_mismatch(
                        original.len(),
                        roundtripped.len(),
                        None,
                    ));
                }
                (Some(digest.name()), Some(digest_hex(&expected)))
            }
            None => (None, None),
        };

        debug!(len = original.len(), digest = digest_name, "buffers match");
        Ok(VerifyReport {
            len: original.len(),
            digest_name,
            digest_hex,
        })
    }

    /// Compress, decompress and verify `data` in one call.
    pub fn roundtrip(
        &self,
        pipeline: &Pipeline,
        data: &[u8],
    ) -> Result<(CompressionReport, VerifyReport)> {
        let (compressed, report) = pipeline.compress_with_report(data)?;
        let restored = pipeline.decompress(&compressed)?;
        let verified = self.verify(data, &restored)?;
        Ok((report, verified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Digest that disagrees with itself, to exercise the secondary check.
    struct Flaky(std::sync::atomic::AtomicU8);

    impl ContentDigest for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn digest(&self, _data: &[u8]) -> Vec<u8> {
            vec![self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed)]
        }
    }

    #[test]
    fn test_equal_buffers() {
        let report = Verifier::new().verify(b"abc", b"abc").unwrap();
        assert_eq!(report.len, 3);
        assert!(report.digest_name.is_none());
    }

    #[test]
    fn test_first_difference() {
        let err = Verifier::new().verify(b"abcdef", b"abXdef").unwrap_err();
        assert!(matches!(
            err,
            OxiPixError::VerificationMismatch {
                original_len: 6,
                actual_len: 6,
                first_difference: Some(2),
            }
        ));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_length_difference() {
        let err = Verifier::new().verify(b"abc", b"abcd").unwrap_err();
        assert!(matches!(
            err,
            OxiPixError::VerificationMismatch {
                first_difference: Some(3),
                ..
            }
        ));
        let err = Verifier::new().verify(b"abcd", b"").unwrap_err();
        assert!(matches!(
            err,
            OxiPixError::VerificationMismatch {
                first_difference: Some(0),
                ..
            }
        ));
    }

    #[test]
    fn test_digests() {
        let report = Verifier::crc32().verify(b"123456789", b"123456789").unwrap();
        assert_eq!(report.digest_name, Some("crc32"));
        assert_eq!(report.digest_hex.as_deref(), Some("cbf43926"));

        let report = Verifier::sha256().verify(b"abc", b"abc").unwrap();
        assert_eq!(
            report.digest_hex.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn test_digest_disagreement_is_fatal() {
        let verifier = Verifier::with_digest(Flaky(Default::default()));
        let err = verifier.verify(b"same", b"same").unwrap_err();
        assert!(matches!(
            err,
            OxiPixError::VerificationMismatch {
                original_len: 4,
                actual_len: 4,
                first_difference: None,
            }
        ));
    }

    #[test]
    fn test_roundtrip() {
        let data = b"round and round and round".repeat(10);
        let (report, verified) = Verifier::sha256()
            .roundtrip(&Pipeline::default(), &data)
            .unwrap();
        assert_eq!(report.original_size, data.len());
        assert_eq!(verified.len, data.len());
    }
}
