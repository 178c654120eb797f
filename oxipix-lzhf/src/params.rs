//! LZSS parameter sets.
//!
//! The token format reserves 12 bits for the match offset and 4 bits for
//! `length - min_match`, which bounds every parameter set a container may
//! declare. Parameters travel with the container, so a decoder never depends
//! on compile-time constants.

use oxipix_core::error::{OxiPixError, Result};
use serde::{Deserialize, Serialize};

/// Width of the offset field in a serialized match token.
pub const OFFSET_BITS: u8 = 12;

/// Width of the length field in a serialized match token.
pub const LENGTH_BITS: u8 = 4;

/// Largest offset the token format can express.
pub const MAX_WINDOW_SIZE: u16 = (1 << OFFSET_BITS) - 1;

/// Largest `lookahead - min_match` the token format can express.
pub const MAX_LENGTH_SPAN: u8 = (1 << LENGTH_BITS) - 1;

/// LZSS parameters used by both encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LzssParams {
    /// Maximum backward distance searched for matches (1-4095).
    pub window_size: u16,
    /// Maximum match length, i.e. how far ahead the encoder looks.
    pub lookahead: u8,
    /// Shortest match worth emitting as a back-reference.
    pub min_match: u8,
}

impl LzssParams {
    /// Default parameters: 4095-byte window, matches of 3-18 bytes.
    pub const DEFAULT: Self = Self {
        window_size: MAX_WINDOW_SIZE,
        lookahead: 18,
        min_match: 3,
    };

    /// Create and validate a parameter set.
    pub fn new(window_size: u16, lookahead: u8, min_match: u8) -> Result<Self> {
        let params = Self {
            window_size,
            lookahead,
            min_match,
        };
        params.validate()?;
        Ok(params)
    }

    /// Replace the window size.
    pub fn with_window_size(mut self, window_size: u16) -> Self {
        self.window_size = window_size;
        self
    }

    /// Replace the lookahead (maximum match length).
    pub fn with_lookahead(mut self, lookahead: u8) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Replace the minimum match length.
    pub fn with_min_match(mut self, min_match: u8) -> Self {
        self.min_match = min_match;
        self
    }

    /// Check that the token format can express these parameters.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(OxiPixError::unsupported_parameters(format!(
                "window size {} outside 1..={}",
                self.window_size, MAX_WINDOW_SIZE
            )));
        }
        if self.min_match == 0 {
            return Err(OxiPixError::unsupported_parameters(
                "minimum match length must be at least 1",
            ));
        }
        if self.lookahead < self.min_match {
            return Err(OxiPixError::unsupported_parameters(format!(
                "lookahead {} shorter than minimum match {}",
                self.lookahead, self.min_match
            )));
        }
        if self.lookahead - self.min_match > MAX_LENGTH_SPAN {
            return Err(OxiPixError::unsupported_parameters(format!(
                "match lengths {}..={} do not fit in {} bits",
                self.min_match, self.lookahead, LENGTH_BITS
            )));
        }
        Ok(())
    }

    /// Minimum match length as `usize`.
    pub fn min_match_len(&self) -> usize {
        self.min_match as usize
    }

    /// Maximum match length as `usize`.
    pub fn max_match_len(&self) -> usize {
        self.lookahead as usize
    }

    /// Window size as `usize`.
    pub fn window_len(&self) -> usize {
        self.window_size as usize
    }
}

impl Default for LzssParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which stages a container runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageMode {
    /// LZSS followed by Huffman coding.
    #[default]
    LzssHuffman,
    /// LZSS token bytes only.
    LzssOnly,
}

impl StageMode {
    /// Container magic for this mode.
    pub fn magic(&self) -> &'static [u8; 4] {
        match self {
            Self::LzssHuffman => b"LZHF",
            Self::LzssOnly => b"LZSS",
        }
    }

    /// Parse a mode from container magic.
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        match magic {
            b"LZHF" => Some(Self::LzssHuffman),
            b"LZSS" => Some(Self::LzssOnly),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LzssHuffman => "lzss+huffman",
            Self::LzssOnly => "lzss",
        }
    }
}

impl std::fmt::Display for StageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
