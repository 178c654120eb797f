//! Bit-level I/O over in-memory byte buffers.
//!
//! `BitWriter` and `BitReader` serialize both the LZSS token stream and the
//! Huffman payload.
//!
//! # Bit Ordering
//!
//! Bits are packed MSB-first: the first bit written lands in the most
//! significant bit of the first byte. Multi-bit values are likewise written
//! starting from their most significant bit, so a 12-bit offset occupies the
//! stream exactly as it reads in binary.
//!
//! # Padding
//!
//! [`BitWriter::finish`] pads the final partial byte with zero bits and
//! reports how many were added. A reader built with
//! [`BitReader::with_padding`] excludes those bits, so padding is never
//! interpreted as data.
//!
//! # Example
//!
//! ```
//! use oxipix_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let (bytes, padding) = writer.finish();
//! assert_eq!(bytes, vec![0b1011_1000]);
//! assert_eq!(padding, 1);
//!
//! let mut reader = BitReader::with_padding(&bytes, padding).unwrap();
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! assert!(reader.is_exhausted());
//! ```

use crate::error::{OxiPixError, Result};

/// MSB-first bit writer that accumulates into a `Vec<u8>`.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Completed bytes.
    output: Vec<u8>,
    /// Pending bits, right-aligned.
    buffer: u64,
    /// Number of pending bits in `buffer` (always < 8 between calls).
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `bytes` bytes of output.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            output: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Number of bytes `finish` would return.
    pub fn len(&self) -> usize {
        self.output.len() + usize::from(self.bits_in_buffer > 0)
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.total_bits_written == 0
    }

    /// Move complete bytes from the accumulator to the output.
    #[inline]
    fn flush_bytes(&mut self) {
        while self.bits_in_buffer >= 8 {
            let shift = self.bits_in_buffer - 8;
            self.output.push((self.buffer >> shift) as u8);
            self.bits_in_buffer -= 8;
        }
        self.buffer &= (1u64 << self.bits_in_buffer) - 1;
    }

    /// Write the low `count` bits of `value`, most significant first.
    ///
    /// # Arguments
    ///
    /// * `value` - The bits to write; bits above `count` are ignored
    /// * `count` - Number of bits to write (0-64)
    pub fn write_bits(&mut self, value: u64, count: u8) {
        debug_assert!(count <= 64, "Cannot write more than 64 bits at once");
        let count = count.min(64);
        if count == 0 {
            return;
        }

        // The accumulator holds < 8 pending bits, so chunks of 32 always fit.
        if count > 32 {
            self.write_bits(value >> 32, count - 32);
            self.write_bits(value & u64::from(u32::MAX), 32);
            return;
        }

        let value = value & ((1u64 << count) - 1);
        self.buffer = (self.buffer << count) | value;
        self.bits_in_buffer += count;
        self.total_bits_written += u64::from(count);
        self.flush_bytes();
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.buffer = (self.buffer << 1) | u64::from(bit);
        self.bits_in_buffer += 1;
        self.total_bits_written += 1;
        if self.bits_in_buffer == 8 {
            self.flush_bytes();
        }
    }

    /// Pad the final partial byte with zeros and return the bytes together
    /// with the number of padding bits added (0-7).
    pub fn finish(mut self) -> (Vec<u8>, u8) {
        let mut padding = 0;
        if self.bits_in_buffer > 0 {
            padding = 8 - self.bits_in_buffer;
            self.output.push((self.buffer << padding) as u8);
        }
        (self.output, padding)
    }
}

/// MSB-first bit reader over a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Next bit to read, counted from the MSB of the first byte.
    position: u64,
    /// One past the last valid (non-padding) bit.
    end: u64,
}

impl<'a> BitReader<'a> {
    /// Create a reader where every bit of `data` is valid.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            end: data.len() as u64 * 8,
        }
    }

    /// Create a reader that ignores the trailing `padding_bits` of the final byte.
    pub fn with_padding(data: &'a [u8], padding_bits: u8) -> Result<Self> {
        if padding_bits > 7 {
            return Err(OxiPixError::invalid_header(format!(
                "padding bit count {padding_bits} exceeds 7"
            )));
        }
        if data.is_empty() && padding_bits != 0 {
            return Err(OxiPixError::invalid_header(
                "padding bits declared for an empty payload",
            ));
        }
        Ok(Self {
            data,
            position: 0,
            end: data.len() as u64 * 8 - u64::from(padding_bits),
        })
    }

    /// Current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.position
    }

    /// Number of valid bits left to read.
    pub fn bits_remaining(&self) -> u64 {
        self.end - self.position
    }

    /// True once every valid bit has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.end
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.end {
            return Err(OxiPixError::unexpected_eof(self.position, 1));
        }
        let byte = self.data[(self.position / 8) as usize];
        let bit = (byte >> (7 - (self.position % 8) as u8)) & 1;
        self.position += 1;
        Ok(bit != 0)
    }

    /// Read `count` bits (0-64) as an unsigned integer, first bit most significant.
    pub fn read_bits(&mut self, count: u8) -> Result<u64> {
        if count > 64 {
            return Err(OxiPixError::invalid_header(format!(
                "cannot read {count} bits at once (max 64)"
            )));
        }
        let needed = u64::from(count);
        if needed > self.bits_remaining() {
            return Err(OxiPixError::unexpected_eof(
                self.position,
                needed - self.bits_remaining(),
            ));
        }

        let mut value = 0u64;
        let mut remaining = count;
        while remaining > 0 {
            let byte = self.data[(self.position / 8) as usize];
            let offset = (self.position % 8) as u8;
            let available = 8 - offset;
            let take = available.min(remaining);
            let bits = (byte >> (available - take)) & (((1u16 << take) - 1) as u8);

            value = (value << take) | u64::from(bits);
            self.position += u64::from(take);
            remaining -= take;
        }

        Ok(value)
    }

    /// True if every bit from the current position to the end of the buffer
    /// (padding included) is zero.
    pub fn trailing_bits_are_zero(&self) -> bool {
        let total = self.data.len() as u64 * 8;
        let mut pos = self.position;
        while pos < total {
            let byte = self.data[(pos / 8) as usize];
            let offset = (pos % 8) as u8;
            if byte & (0xFFu8 >> offset) != 0 {
                return false;
            }
            pos += u64::from(8 - offset);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitwriter_single_bits() {
        let mut writer = BitWriter::new();
        // 0b10110101 written MSB-first
        for bit in [true, false, true, true, false, true, false, true] {
            writer.write_bit(bit);
        }
        let (bytes, padding) = writer.finish();
        assert_eq!(bytes, vec![0xB5]);
        assert_eq!(padding, 0);
    }

    #[test]
    fn test_bitwriter_padding_reported() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1);
        writer.write_bits(0b0110_0001, 8);
        assert_eq!(writer.bits_written(), 9);
        assert_eq!(writer.len(), 2);

        let (bytes, padding) = writer.finish();
        assert_eq!(bytes, vec![0b1011_0000, 0b1000_0000]);
        assert_eq!(padding, 7);
    }

    #[test]
    fn test_empty_writer() {
        let writer = BitWriter::new();
        assert!(writer.is_empty());
        let (bytes, padding) = writer.finish();
        assert!(bytes.is_empty());
        assert_eq!(padding, 0);
    }

    #[test]
    fn test_bitreader_crosses_bytes() {
        let data = [0xAB, 0xCD];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(4).unwrap(), 0xA);
        assert_eq!(reader.read_bits(8).unwrap(), 0xBC);
        assert_eq!(reader.read_bits(4).unwrap(), 0xD);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_token_widths_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(4095, 12);
        writer.write_bits(15, 4);
        writer.write_bit(false);
        writer.write_bits(0x41, 8);
        let (bytes, padding) = writer.finish();

        let mut reader = BitReader::with_padding(&bytes, padding).unwrap();
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(12).unwrap(), 4095);
        assert_eq!(reader.read_bits(4).unwrap(), 15);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(8).unwrap(), 0x41);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_wide_values() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b11, 2);
        writer.write_bits(u64::MAX - 1, 64);
        writer.write_bits(0x1_2345_6789, 40);
        let (bytes, padding) = writer.finish();

        let mut reader = BitReader::with_padding(&bytes, padding).unwrap();
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert_eq!(reader.read_bits(64).unwrap(), u64::MAX - 1);
        assert_eq!(reader.read_bits(40).unwrap(), 0x1_2345_6789);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_padding_is_not_data() {
        let data = [0b1010_0000];
        let mut reader = BitReader::with_padding(&data, 5).unwrap();
        assert_eq!(reader.bits_remaining(), 3);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert!(matches!(
            reader.read_bit(),
            Err(OxiPixError::UnexpectedEof { .. })
        ));
        assert!(reader.trailing_bits_are_zero());
    }

    #[test]
    fn test_read_past_end() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        let err = reader.read_bits(9).unwrap_err();
        assert!(err.is_malformed());
        // A failed read does not consume anything.
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
    }

    #[test]
    fn test_invalid_padding() {
        assert!(BitReader::with_padding(&[0x00], 8).is_err());
        assert!(BitReader::with_padding(&[], 3).is_err());
        assert!(BitReader::with_padding(&[], 0).is_ok());
    }

    #[test]
    fn test_trailing_bits_nonzero() {
        let data = [0b1000_0001];
        let mut reader = BitReader::new(&data);
        reader.read_bit().unwrap();
        assert!(!reader.trailing_bits_are_zero());
    }
}
