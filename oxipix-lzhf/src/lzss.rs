//! LZSS codec.
//!
//! LZSS (Lempel-Ziv-Storer-Szymanski) is a derivative of LZ77 that uses
//! a flag bit to distinguish between literals and matches.
//!
//! # Token stream layout
//!
//! Tokens are packed MSB-first:
//!
//! ```text
//! literal: 0 | byte (8 bits)
//! match:   1 | offset (12 bits) | length - min_match (4 bits)
//! ```
//!
//! The final byte is zero-padded. Every token takes at least 9 bits and the
//! padding never exceeds 7, so fewer than 9 remaining bits always mark the
//! end of the stream and the stream needs no separate terminator.
//!
//! # Match selection
//!
//! The encoder takes the longest match within the window. Among matches of
//! equal length the smallest offset wins, which keeps the output fully
//! deterministic.

use crate::params::{LENGTH_BITS, LzssParams, OFFSET_BITS};
use oxipix_core::bitstream::{BitReader, BitWriter};
use oxipix_core::error::{OxiPixError, Result};
use oxipix_core::traits::ByteCodec;

/// Bits in the shortest token (flag + literal byte).
const MIN_TOKEN_BITS: u64 = 9;

/// Hash table size for the match finder.
const HASH_BITS: u32 = 15;

/// Sentinel for an empty hash chain slot.
const NIL: usize = usize::MAX;

/// LZSS token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzssToken {
    /// A literal byte.
    Literal(u8),
    /// A back-reference into previously produced output.
    Match {
        /// Distance back from the current output end.
        offset: u16,
        /// Number of bytes to copy.
        length: u16,
    },
}

impl LzssToken {
    /// Number of output bytes this token produces.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => *length as usize,
        }
    }

    /// Number of bits this token occupies in the serialized stream.
    pub fn bit_len(&self) -> u64 {
        match self {
            Self::Literal(_) => MIN_TOKEN_BITS,
            Self::Match { .. } => 1 + u64::from(OFFSET_BITS) + u64::from(LENGTH_BITS),
        }
    }
}

/// LZSS decoder.
///
/// Replays tokens into a growing output buffer. Matches copy one byte at a
/// time so a source range overlapping its own destination (offset < length)
/// expands runs correctly.
#[derive(Debug)]
pub struct LzssDecoder {
    /// Parameters the stream was produced with.
    params: LzssParams,
    /// Output buffer, which doubles as the history.
    output: Vec<u8>,
}

impl LzssDecoder {
    /// Create a new LZSS decoder.
    pub fn new(params: LzssParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            output: Vec::new(),
        })
    }

    /// Create a decoder that reserves room for `capacity` output bytes.
    pub fn with_capacity(params: LzssParams, capacity: usize) -> Result<Self> {
        let mut decoder = Self::new(params)?;
        decoder.output.reserve(capacity);
        Ok(decoder)
    }

    /// Reset the decoder.
    pub fn reset(&mut self) {
        self.output.clear();
    }

    /// Decode a literal byte.
    pub fn decode_literal(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Decode a match (offset, length).
    pub fn decode_match(&mut self, offset: u16, length: u16) -> Result<()> {
        let offset = offset as usize;
        let length = length as usize;

        if offset == 0 || offset > self.output.len() || offset > self.params.window_len() {
            return Err(OxiPixError::invalid_distance(offset, self.output.len()));
        }
        if length < self.params.min_match_len() || length > self.params.max_match_len() {
            return Err(OxiPixError::invalid_match_length(
                length,
                self.params.min_match_len(),
                self.params.max_match_len(),
            ));
        }

        let start = self.output.len() - offset;
        for i in 0..length {
            let byte = self.output[start + i];
            self.output.push(byte);
        }

        Ok(())
    }

    /// Decode a single token.
    pub fn decode_token(&mut self, token: LzssToken) -> Result<()> {
        match token {
            LzssToken::Literal(byte) => {
                self.decode_literal(byte);
                Ok(())
            }
            LzssToken::Match { offset, length } => self.decode_match(offset, length),
        }
    }

    /// Decode a serialized token stream, appending to the output.
    pub fn decode_stream(&mut self, stream: &[u8]) -> Result<()> {
        let mut reader = BitReader::new(stream);
        while reader.bits_remaining() >= MIN_TOKEN_BITS {
            let token = read_token(&mut reader, &self.params)?;
            self.decode_token(token)?;
        }
        if !reader.trailing_bits_are_zero() {
            return Err(OxiPixError::corrupted(
                reader.bit_position(),
                "nonzero padding after final LZSS token",
            ));
        }
        Ok(())
    }

    /// Get the decoded output.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take the decoded output.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Get output length.
    pub fn output_len(&self) -> usize {
        self.output.len()
    }
}

/// Hash chains over the positions already passed by the encoder.
#[derive(Debug)]
struct HashChains {
    /// Most recent position per hash bucket.
    head: Vec<usize>,
    /// Previous position with the same hash, per position.
    prev: Vec<usize>,
    /// Number of leading bytes hashed per position.
    key_len: usize,
}

impl HashChains {
    fn new(input_len: usize, key_len: usize) -> Self {
        Self {
            head: vec![NIL; 1 << HASH_BITS],
            prev: vec![NIL; input_len],
            key_len,
        }
    }

    fn hash(bytes: &[u8]) -> usize {
        let mut h = 0u32;
        for &b in bytes {
            h = h.wrapping_mul(0x9E37_79B1).wrapping_add(u32::from(b) + 1);
        }
        (h >> (32 - HASH_BITS)) as usize
    }

    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + self.key_len <= data.len() {
            let h = Self::hash(&data[pos..pos + self.key_len]);
            self.prev[pos] = self.head[h];
            self.head[h] = pos;
        }
    }

    /// Most recent earlier position sharing the hash of `data[pos..]`.
    fn first_candidate(&self, data: &[u8], pos: usize) -> usize {
        self.head[Self::hash(&data[pos..pos + self.key_len])]
    }
}

/// LZSS encoder.
///
/// Matches are found through hash chains keyed on the first bytes of each
/// position. Chains are walked from the most recent position backwards, so
/// candidates arrive in order of increasing offset and the first longest
/// match seen is also the nearest.
#[derive(Debug, Clone)]
pub struct LzssEncoder {
    /// Encoding parameters.
    params: LzssParams,
}

impl LzssEncoder {
    /// Create a new LZSS encoder.
    pub fn new(params: LzssParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters used by this encoder.
    pub fn params(&self) -> &LzssParams {
        &self.params
    }

    /// Find the longest, then nearest, match for `data[pos..]`.
    fn find_match(&self, data: &[u8], pos: usize, chains: &HashChains) -> Option<(u16, u16)> {
        let max_len = (data.len() - pos).min(self.params.max_match_len());
        let min_match = self.params.min_match_len();
        if max_len < min_match {
            return None;
        }

        let window = self.params.window_len();
        let mut best_len = min_match - 1;
        let mut best_offset = 0usize;

        let mut candidate = chains.first_candidate(data, pos);
        while candidate != NIL {
            let offset = pos - candidate;
            if offset > window {
                break;
            }

            // Bytes past `pos` are valid sources: the decoder produces them
            // earlier within the same match.
            let mut len = 0;
            while len < max_len && data[candidate + len] == data[pos + len] {
                len += 1;
            }

            if len > best_len {
                best_len = len;
                best_offset = offset;
                if len == max_len {
                    break;
                }
            }

            candidate = chains.prev[candidate];
        }

        (best_offset > 0).then_some((best_offset as u16, best_len as u16))
    }

    /// Split data into LZSS tokens.
    pub fn tokenize(&self, data: &[u8]) -> Vec<LzssToken> {
        let mut tokens = Vec::with_capacity(data.len() / 2 + 1);
        let key_len = self.params.min_match_len().min(3);
        let mut chains = HashChains::new(data.len(), key_len);

        let mut pos = 0;
        while pos < data.len() {
            let advance = match self.find_match(data, pos, &chains) {
                Some((offset, length)) => {
                    tokens.push(LzssToken::Match { offset, length });
                    length as usize
                }
                None => {
                    tokens.push(LzssToken::Literal(data[pos]));
                    1
                }
            };
            for p in pos..pos + advance {
                chains.insert(data, p);
            }
            pos += advance;
        }

        tokens
    }

    /// Encode data to a serialized token stream.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        write_tokens(&self.tokenize(data), &self.params)
    }
}

/// Read one token from a bit stream.
fn read_token(reader: &mut BitReader<'_>, params: &LzssParams) -> Result<LzssToken> {
    if reader.read_bit()? {
        let offset = reader.read_bits(OFFSET_BITS)? as u16;
        let length = reader.read_bits(LENGTH_BITS)? as u16 + u16::from(params.min_match);
        Ok(LzssToken::Match { offset, length })
    } else {
        Ok(LzssToken::Literal(reader.read_bits(8)? as u8))
    }
}

/// Pack tokens already known to fit the field widths.
fn write_tokens(tokens: &[LzssToken], params: &LzssParams) -> Vec<u8> {
    let bits: u64 = tokens.iter().map(LzssToken::bit_len).sum();
    let mut writer = BitWriter::with_capacity(bits.div_ceil(8) as usize);

    for token in tokens {
        match *token {
            LzssToken::Literal(byte) => {
                writer.write_bit(false);
                writer.write_bits(u64::from(byte), 8);
            }
            LzssToken::Match { offset, length } => {
                writer.write_bit(true);
                writer.write_bits(u64::from(offset), OFFSET_BITS);
                writer.write_bits(u64::from(length - u16::from(params.min_match)), LENGTH_BITS);
            }
        }
    }

    writer.finish().0
}

/// Serialize tokens into a token stream.
///
/// Fails if a match cannot be expressed with `params`.
pub fn serialize_tokens(tokens: &[LzssToken], params: &LzssParams) -> Result<Vec<u8>> {
    params.validate()?;
    for token in tokens {
        if let LzssToken::Match { offset, length } = *token {
            if offset == 0 || offset > params.window_size {
                return Err(OxiPixError::invalid_distance(
                    offset as usize,
                    params.window_len(),
                ));
            }
            let length = length as usize;
            if length < params.min_match_len() || length > params.max_match_len() {
                return Err(OxiPixError::invalid_match_length(
                    length,
                    params.min_match_len(),
                    params.max_match_len(),
                ));
            }
        }
    }
    Ok(write_tokens(tokens, params))
}

/// Parse a token stream back into tokens without replaying them.
pub fn parse_tokens(stream: &[u8], params: &LzssParams) -> Result<Vec<LzssToken>> {
    params.validate()?;
    let mut reader = BitReader::new(stream);
    let mut tokens = Vec::new();
    while reader.bits_remaining() >= MIN_TOKEN_BITS {
        tokens.push(read_token(&mut reader, params)?);
    }
    if !reader.trailing_bits_are_zero() {
        return Err(OxiPixError::corrupted(
            reader.bit_position(),
            "nonzero padding after final LZSS token",
        ));
    }
    Ok(tokens)
}

/// Compress data into an LZSS token stream.
pub fn lzss_compress(data: &[u8], params: &LzssParams) -> Result<Vec<u8>> {
    Ok(LzssEncoder::new(*params)?.encode(data))
}

/// Decompress an LZSS token stream.
pub fn lzss_decompress(stream: &[u8], params: &LzssParams) -> Result<Vec<u8>> {
    // Each 17-bit match yields at most `lookahead` bytes.
    let hint = stream.len().saturating_mul(2).min(1 << 20);
    let mut decoder = LzssDecoder::with_capacity(*params, hint)?;
    decoder.decode_stream(stream)?;
    Ok(decoder.take_output())
}

/// LZSS stage as a [`ByteCodec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LzssCodec {
    /// Parameters for both directions.
    pub params: LzssParams,
}

impl LzssCodec {
    /// Create a codec with the given parameters.
    pub fn new(params: LzssParams) -> Self {
        Self { params }
    }
}

impl ByteCodec for LzssCodec {
    fn name(&self) -> &'static str {
        "lzss"
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        lzss_compress(input, &self.params)
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        lzss_decompress(input, &self.params)
    }
}
