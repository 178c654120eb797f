//! Huffman coding over byte streams.
//!
//! The tree is built fresh for each buffer from its byte frequencies and
//! stored as an arena of nodes addressed by index. Codes come from a
//! root-to-leaf walk where **bit 0 selects the left child and bit 1 the
//! right child**; the decoder rebuilds an equivalent tree from the
//! serialized code table alone.
//!
//! # Determinism
//!
//! Leaves enter the priority queue in ascending symbol order and every node
//! carries a sequence number, so nodes of equal weight leave the queue in
//! insertion order. The first node popped becomes the left child.
//!
//! # Code table layout
//!
//! ```text
//! COUNT  u16 BE
//! COUNT x ( SYMBOL u8 | LENGTH u8 | CODE ceil(LENGTH / 8) bytes )
//! ```
//!
//! Codes are MSB-first and left-aligned in their bytes; unused low bits of
//! the last byte are zero. Entries are sorted by symbol.

use oxipix_core::bitstream::{BitReader, BitWriter};
use oxipix_core::error::{OxiPixError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::trace;

/// Maximum code length (codes are held in a `u64`).
pub const MAX_CODE_LENGTH: u8 = 64;

/// Number of distinct byte symbols.
const NUM_SYMBOLS: usize = 256;

/// Largest capacity hint taken from a declared symbol count.
const MAX_PREALLOC: usize = 1 << 20;

/// Byte occurrence counts over one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; NUM_SYMBOLS],
}

impl FrequencyTable {
    /// Count every byte of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; NUM_SYMBOLS];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Occurrences of `symbol`.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of symbols that occur at least once.
    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// True if no bytes were counted.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Present symbols with their counts, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }
}

/// Node in the Huffman tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// A symbol with its weight.
    Leaf {
        /// Byte value.
        symbol: u8,
        /// Occurrence count.
        weight: u64,
    },
    /// Merge of two subtrees.
    Internal {
        /// Sum of the children's weights.
        weight: u64,
        /// Index of the 0-branch child.
        left: usize,
        /// Index of the 1-branch child.
        right: usize,
    },
}

impl Node {
    /// Weight of this node.
    pub fn weight(&self) -> u64 {
        match *self {
            Self::Leaf { weight, .. } | Self::Internal { weight, .. } => weight,
        }
    }
}

/// Huffman tree stored as an arena of nodes.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl HuffmanTree {
    /// Build a tree from symbol frequencies.
    ///
    /// An empty table yields a tree without a root. A single present symbol
    /// yields a tree whose root is that leaf.
    pub fn build(freqs: &FrequencyTable) -> Self {
        let mut nodes = Vec::with_capacity(2 * NUM_SYMBOLS);
        // (weight, sequence, node id); the sequence orders equal weights.
        let mut heap = BinaryHeap::with_capacity(NUM_SYMBOLS);
        let mut seq = 0u64;

        for (symbol, weight) in freqs.iter() {
            heap.push(Reverse((weight, seq, nodes.len())));
            nodes.push(Node::Leaf { symbol, weight });
            seq += 1;
        }

        while heap.len() > 1 {
            let (Some(Reverse((w1, _, left))), Some(Reverse((w2, _, right)))) =
                (heap.pop(), heap.pop())
            else {
                break;
            };
            let weight = w1 + w2;
            heap.push(Reverse((weight, seq, nodes.len())));
            nodes.push(Node::Internal {
                weight,
                left,
                right,
            });
            seq += 1;
        }

        let root = heap.pop().map(|Reverse((_, _, id))| id);
        trace!(leaves = freqs.distinct_symbols(), nodes = nodes.len(), "built Huffman tree");
        Self { nodes, root }
    }

    /// Index of the root node, if any.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Node by index.
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A single Huffman code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HuffmanCode {
    /// Code bits, right-aligned; the first bit sent is bit `length - 1`.
    pub bits: u64,
    /// Number of bits (1-64).
    pub length: u8,
}

impl HuffmanCode {
    /// True if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &HuffmanCode) -> bool {
        self.length <= other.length && other.bits >> (other.length - self.length) == self.bits
    }
}

/// Mapping from symbol to Huffman code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<HuffmanCode>; NUM_SYMBOLS],
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            codes: [None; NUM_SYMBOLS],
        }
    }

    /// Assign codes by walking the tree (0 = left, 1 = right).
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = Self::new();
        let Some(root) = tree.root() else {
            return Ok(table);
        };

        // A lone leaf would get an empty code; give it the 1-bit code `0`.
        if let Some(Node::Leaf { symbol, .. }) = tree.node(root) {
            table.insert(*symbol, HuffmanCode { bits: 0, length: 1 })?;
            return Ok(table);
        }

        let mut stack = vec![(root, 0u64, 0u8)];
        while let Some((id, bits, depth)) = stack.pop() {
            match tree.node(id) {
                Some(Node::Leaf { symbol, .. }) => {
                    table.insert(*symbol, HuffmanCode { bits, length: depth })?;
                }
                Some(Node::Internal { left, right, .. }) => {
                    if depth >= MAX_CODE_LENGTH {
                        return Err(OxiPixError::input_too_large(format!(
                            "Huffman code length would exceed {MAX_CODE_LENGTH} bits"
                        )));
                    }
                    stack.push((*right, (bits << 1) | 1, depth + 1));
                    stack.push((*left, bits << 1, depth + 1));
                }
                None => {
                    return Err(OxiPixError::invalid_code_table(format!(
                        "tree references missing node {id}"
                    )));
                }
            }
        }

        Ok(table)
    }

    /// Add a code for `symbol`.
    pub fn insert(&mut self, symbol: u8, code: HuffmanCode) -> Result<()> {
        if code.length == 0 || code.length > MAX_CODE_LENGTH {
            return Err(OxiPixError::invalid_code_table(format!(
                "code length {} for symbol {symbol} outside 1..={MAX_CODE_LENGTH}",
                code.length
            )));
        }
        if code.length < 64 && code.bits >> code.length != 0 {
            return Err(OxiPixError::invalid_code_table(format!(
                "code for symbol {symbol} wider than its length {}",
                code.length
            )));
        }
        let slot = &mut self.codes[symbol as usize];
        if slot.is_some() {
            return Err(OxiPixError::invalid_code_table(format!(
                "duplicate entry for symbol {symbol}"
            )));
        }
        *slot = Some(code);
        Ok(())
    }

    /// Code for `symbol`, if it has one.
    pub fn get(&self, symbol: u8) -> Option<HuffmanCode> {
        self.codes[symbol as usize]
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    /// True if no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Option::is_none)
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, HuffmanCode)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.map(|code| (s as u8, code)))
    }

    /// Longest code length in the table.
    pub fn max_length(&self) -> u8 {
        self.iter().map(|(_, c)| c.length).max().unwrap_or(0)
    }

    /// Size of the serialized table in bytes.
    pub fn serialized_len(&self) -> usize {
        2 + self
            .iter()
            .map(|(_, c)| 2 + (c.length as usize).div_ceil(8))
            .sum::<usize>()
    }

    /// Append the serialized table to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.reserve(self.serialized_len());
        out.extend_from_slice(&(self.len() as u16).to_be_bytes());
        for (symbol, code) in self.iter() {
            out.push(symbol);
            out.push(code.length);
            let mut writer = BitWriter::with_capacity(8);
            writer.write_bits(code.bits, code.length);
            out.extend_from_slice(&writer.finish().0);
        }
    }

    /// Parse a serialized table from the start of `data`.
    ///
    /// Returns the table and the number of bytes consumed. The table is
    /// checked for prefix conflicts before it is returned.
    pub fn read_from(data: &[u8]) -> Result<(Self, usize)> {
        let count = match data.get(..2) {
            Some(b) => u16::from_be_bytes([b[0], b[1]]) as usize,
            None => return Err(eof_at(data.len(), 2)),
        };
        if count > NUM_SYMBOLS {
            return Err(OxiPixError::invalid_code_table(format!(
                "{count} entries declared, at most {NUM_SYMBOLS} allowed"
            )));
        }

        let mut table = Self::new();
        let mut pos = 2;
        let mut last_symbol: Option<u8> = None;

        for _ in 0..count {
            let (symbol, length) = match data.get(pos..pos + 2) {
                Some(b) => (b[0], b[1]),
                None => return Err(eof_at(data.len(), pos + 2)),
            };
            pos += 2;

            if last_symbol.is_some_and(|last| symbol <= last) {
                return Err(OxiPixError::invalid_code_table(format!(
                    "symbol {symbol} out of order or repeated"
                )));
            }
            last_symbol = Some(symbol);

            if length == 0 || length > MAX_CODE_LENGTH {
                return Err(OxiPixError::invalid_code_table(format!(
                    "code length {length} for symbol {symbol} outside 1..={MAX_CODE_LENGTH}"
                )));
            }

            let width = (length as usize).div_ceil(8);
            let Some(code_bytes) = data.get(pos..pos + width) else {
                return Err(eof_at(data.len(), pos + width));
            };
            pos += width;

            let mut reader = BitReader::new(code_bytes);
            let bits = reader.read_bits(length)?;
            if !reader.trailing_bits_are_zero() {
                return Err(OxiPixError::invalid_code_table(format!(
                    "nonzero filler bits in code for symbol {symbol}"
                )));
            }
            table.insert(symbol, HuffmanCode { bits, length })?;
        }

        // Rejects codes that are prefixes of one another.
        DecodeTree::from_table(&table)?;

        Ok((table, pos))
    }
}

fn eof_at(available: usize, needed: usize) -> OxiPixError {
    OxiPixError::unexpected_eof(available as u64 * 8, (needed - available) as u64 * 8)
}

/// Node of the decoding tree.
#[derive(Debug, Clone, Copy, Default)]
struct DecodeNode {
    children: [Option<usize>; 2],
    symbol: Option<u8>,
}

/// Binary decoding tree rebuilt from a code table.
#[derive(Debug, Clone)]
struct DecodeTree {
    nodes: Vec<DecodeNode>,
}

impl DecodeTree {
    fn from_table(table: &CodeTable) -> Result<Self> {
        let mut nodes = vec![DecodeNode::default()];

        for (symbol, code) in table.iter() {
            let mut current = 0;
            for i in (0..code.length).rev() {
                if nodes[current].symbol.is_some() {
                    return Err(prefix_conflict(symbol));
                }
                let bit = ((code.bits >> i) & 1) as usize;
                current = match nodes[current].children[bit] {
                    Some(next) => next,
                    None => {
                        nodes.push(DecodeNode::default());
                        let next = nodes.len() - 1;
                        nodes[current].children[bit] = Some(next);
                        next
                    }
                };
            }
            let leaf = &mut nodes[current];
            if leaf.symbol.is_some() || leaf.children.iter().any(Option::is_some) {
                return Err(prefix_conflict(symbol));
            }
            leaf.symbol = Some(symbol);
        }

        Ok(Self { nodes })
    }

    /// Walk from the root to a leaf.
    fn decode_symbol(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        let mut current = 0;
        loop {
            let position = reader.bit_position();
            let bit = reader.read_bit()? as usize;
            current = self.nodes[current].children[bit]
                .ok_or_else(|| OxiPixError::invalid_huffman(position))?;
            if let Some(symbol) = self.nodes[current].symbol {
                return Ok(symbol);
            }
        }
    }
}

fn prefix_conflict(symbol: u8) -> OxiPixError {
    OxiPixError::invalid_code_table(format!(
        "code for symbol {symbol} conflicts with another code's prefix"
    ))
}

/// Huffman-coded bytes together with everything needed to decode them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HuffmanBlock {
    /// Code table used for the payload.
    pub table: CodeTable,
    /// Packed code bits.
    pub payload: Vec<u8>,
    /// Zero bits padding the last payload byte (0-7).
    pub padding_bits: u8,
    /// Number of symbols in the payload.
    pub symbol_count: usize,
}

/// Huffman encoder for a fixed code table.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    table: CodeTable,
}

impl HuffmanEncoder {
    /// Create an encoder using `table`.
    pub fn new(table: CodeTable) -> Self {
        Self { table }
    }

    /// Build the table from the frequencies of `data`.
    pub fn for_data(data: &[u8]) -> Result<Self> {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data));
        Ok(Self::new(CodeTable::from_tree(&tree)?))
    }

    /// Code table in use.
    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// Encode `data`, returning the payload and its padding bit count.
    pub fn encode(&self, data: &[u8]) -> Result<(Vec<u8>, u8)> {
        let mut writer = BitWriter::with_capacity(data.len());
        for &byte in data {
            let code = self.table.get(byte).ok_or_else(|| {
                OxiPixError::invalid_code_table(format!("no code for symbol {byte}"))
            })?;
            writer.write_bits(code.bits, code.length);
        }
        Ok(writer.finish())
    }

    /// Consume the encoder and produce a complete block for `data`.
    pub fn encode_block(self, data: &[u8]) -> Result<HuffmanBlock> {
        let (payload, padding_bits) = self.encode(data)?;
        Ok(HuffmanBlock {
            table: self.table,
            payload,
            padding_bits,
            symbol_count: data.len(),
        })
    }
}

/// Huffman decoder for a fixed code table.
#[derive(Debug, Clone)]
pub struct HuffmanDecoder {
    tree: DecodeTree,
}

impl HuffmanDecoder {
    /// Create a decoder from a code table.
    pub fn new(table: &CodeTable) -> Result<Self> {
        Ok(Self {
            tree: DecodeTree::from_table(table)?,
        })
    }

    /// Decode exactly `symbol_count` symbols from `payload`.
    ///
    /// Every valid bit must be consumed; leftover bits are an error.
    pub fn decode(&self, payload: &[u8], padding_bits: u8, symbol_count: usize) -> Result<Vec<u8>> {
        let mut reader = BitReader::with_padding(payload, padding_bits)?;

        // Every code is at least one bit long.
        if symbol_count as u64 > reader.bits_remaining() {
            return Err(OxiPixError::unexpected_eof(
                reader.bits_remaining(),
                symbol_count as u64 - reader.bits_remaining(),
            ));
        }

        let mut output = Vec::with_capacity(symbol_count.min(MAX_PREALLOC));
        for _ in 0..symbol_count {
            output.push(self.tree.decode_symbol(&mut reader)?);
        }

        if !reader.is_exhausted() {
            return Err(OxiPixError::corrupted(
                reader.bit_position(),
                format!(
                    "{} bits left over after the final Huffman symbol",
                    reader.bits_remaining()
                ),
            ));
        }

        Ok(output)
    }
}

/// Huffman-compress a byte buffer.
pub fn huffman_compress(data: &[u8]) -> Result<HuffmanBlock> {
    HuffmanEncoder::for_data(data)?.encode_block(data)
}

/// Decompress a block produced by [`huffman_compress`].
pub fn huffman_decompress(block: &HuffmanBlock) -> Result<Vec<u8>> {
    HuffmanDecoder::new(&block.table)?.decode(&block.payload, block.padding_bits, block.symbol_count)
}
