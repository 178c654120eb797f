//! Container format.
//!
//! Every multi-byte fixed-width field is big-endian. Lengths are unsigned
//! LEB128 varints of at most 10 bytes.
//!
//! ```text
//! Two-stage ("LZHF"):
//!   MAGIC(4) | WINDOW u16 | LOOKAHEAD u8 | MIN_MATCH u8
//!   | ORIGINAL_LEN varint | TOKEN_LEN varint
//!   | CODE_TABLE | PADDING u8 | PAYLOAD
//!
//! Single-stage ("LZSS"):
//!   MAGIC(4) | WINDOW u16 | LOOKAHEAD u8 | MIN_MATCH u8
//!   | ORIGINAL_LEN varint | TOKEN_LEN varint | PAYLOAD
//! ```
//!
//! `TOKEN_LEN` is the length of the LZSS token byte stream. In the two-stage
//! format it is also the number of Huffman symbols to decode; in the
//! single-stage format it must equal the payload length.

use crate::huffman::{CodeTable, HuffmanBlock};
use crate::params::{LzssParams, StageMode};
use oxipix_core::error::{OxiPixError, Result};

/// Length of the format marker.
pub const MAGIC_LEN: usize = 4;

/// Longest LEB128 encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as an unsigned LEB128 varint.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Forward-only reader over container bytes.
#[derive(Debug)]
struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.saturating_add(n);
        let bytes = self.data.get(self.pos..end).ok_or_else(|| {
            OxiPixError::unexpected_eof(
                self.data.len() as u64 * 8,
                (end - self.data.len()) as u64 * 8,
            )
        })?;
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16_be(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.u8()?;
            let bits = u64::from(byte & 0x7F);
            // The tenth byte may only contribute the top bit of a u64.
            if i == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(OxiPixError::invalid_header("varint overflows 64 bits"));
            }
            // A zero final byte after the first adds nothing: non-canonical.
            if byte == 0 && i > 0 {
                return Err(OxiPixError::invalid_header("non-canonical varint"));
            }
            value |= bits << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(OxiPixError::invalid_header(format!(
            "varint longer than {MAX_VARINT_LEN} bytes"
        )))
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    fn position(&self) -> usize {
        self.pos
    }
}

/// Stage-specific container body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Huffman-coded token stream.
    Huffman(HuffmanBlock),
    /// Raw LZSS token bytes.
    Tokens(Vec<u8>),
}

/// Parsed or freshly built container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// LZSS parameters the token stream was produced with.
    pub params: LzssParams,
    /// Length of the raw input.
    pub original_len: u64,
    /// Stage-specific body.
    pub payload: Payload,
}

impl Container {
    /// Stage mode implied by the payload.
    pub fn mode(&self) -> StageMode {
        match self.payload {
            Payload::Huffman(_) => StageMode::LzssHuffman,
            Payload::Tokens(_) => StageMode::LzssOnly,
        }
    }

    /// Length of the LZSS token byte stream.
    pub fn token_len(&self) -> usize {
        match &self.payload {
            Payload::Huffman(block) => block.symbol_count,
            Payload::Tokens(tokens) => tokens.len(),
        }
    }

    /// Length of the payload section.
    pub fn payload_len(&self) -> usize {
        match &self.payload {
            Payload::Huffman(block) => block.payload.len(),
            Payload::Tokens(tokens) => tokens.len(),
        }
    }

    /// Serialized code table, if this is a two-stage container.
    pub fn code_table(&self) -> Option<&CodeTable> {
        match &self.payload {
            Payload::Huffman(block) => Some(&block.table),
            Payload::Tokens(_) => None,
        }
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload_len() + 32);
        out.extend_from_slice(self.mode().magic());
        out.extend_from_slice(&self.params.window_size.to_be_bytes());
        out.push(self.params.lookahead);
        out.push(self.params.min_match);
        write_varint(&mut out, self.original_len);
        write_varint(&mut out, self.token_len() as u64);

        match &self.payload {
            Payload::Huffman(block) => {
                block.table.write_to(&mut out);
                out.push(block.padding_bits);
                out.extend_from_slice(&block.payload);
            }
            Payload::Tokens(tokens) => out.extend_from_slice(tokens),
        }

        out
    }

    /// Parse and validate container bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);

        let magic = cursor.take(MAGIC_LEN)?;
        let mode = StageMode::from_magic(magic).ok_or_else(|| {
            OxiPixError::invalid_magic(StageMode::LzssHuffman.magic().to_vec(), magic)
        })?;

        let params = LzssParams {
            window_size: cursor.u16_be()?,
            lookahead: cursor.u8()?,
            min_match: cursor.u8()?,
        };
        params.validate()?;

        let original_len = cursor.varint()?;
        let token_len = usize::try_from(cursor.varint()?)
            .map_err(|_| OxiPixError::invalid_header("token stream length exceeds usize"))?;

        let payload = match mode {
            StageMode::LzssHuffman => {
                let (table, used) = CodeTable::read_from(&data[cursor.position()..])?;
                cursor.take(used)?;
                let padding_bits = cursor.u8()?;
                if padding_bits > 7 {
                    return Err(OxiPixError::invalid_header(format!(
                        "padding bit count {padding_bits} exceeds 7"
                    )));
                }
                let payload = cursor.rest();
                if payload.is_empty() && padding_bits != 0 {
                    return Err(OxiPixError::invalid_header(
                        "padding bits declared for an empty payload",
                    ));
                }
                Payload::Huffman(HuffmanBlock {
                    table,
                    payload: payload.to_vec(),
                    padding_bits,
                    symbol_count: token_len,
                })
            }
            StageMode::LzssOnly => {
                let tokens = cursor.rest();
                if tokens.len() != token_len {
                    return Err(OxiPixError::invalid_header(format!(
                        "token stream length {token_len} does not match payload length {}",
                        tokens.len()
                    )));
                }
                Payload::Tokens(tokens.to_vec())
            }
        };

        Ok(Self {
            params,
            original_len,
            payload,
        })
    }
}
