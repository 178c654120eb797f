//! LZSS + Huffman pipeline.
//!
//! Compression runs the LZSS tokenizer, optionally Huffman-codes the token
//! bytes, and wraps the result in a [`Container`]. Decompression reads the
//! parameters and stage mode from the container itself, so any valid
//! container can be decoded by any pipeline.

use crate::container::{Container, Payload};
use crate::huffman::{HuffmanDecoder, huffman_compress};
use crate::lzss::{LzssEncoder, lzss_decompress};
use crate::params::{LzssParams, StageMode};
use oxipix_core::error::{OxiPixError, Result};
use oxipix_core::traits::ByteCodec;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Sizes and ratios for one compression call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionReport {
    /// Stages that ran.
    pub mode: StageMode,
    /// LZSS parameters used.
    pub params: LzssParams,
    /// Raw input length.
    pub original_size: usize,
    /// LZSS token stream length.
    pub token_stream_size: usize,
    /// Payload length (token bytes or Huffman bits).
    pub payload_size: usize,
    /// Total container length.
    pub container_size: usize,
}

impl CompressionReport {
    /// Container size divided by original size (0 for empty input).
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.container_size as f64 / self.original_size as f64
    }

    /// Percentage of the input saved (0 for empty input).
    pub fn space_savings(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.ratio()) * 100.0
    }

    /// Token stream size divided by original size.
    pub fn lzss_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.token_stream_size as f64 / self.original_size as f64
    }
}

/// Compression pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pipeline {
    params: LzssParams,
    mode: StageMode,
}

impl Pipeline {
    /// Two-stage pipeline with the given parameters.
    pub fn new(params: LzssParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            mode: StageMode::LzssHuffman,
        })
    }

    /// LZSS-only pipeline with the given parameters.
    pub fn single_stage(params: LzssParams) -> Result<Self> {
        Ok(Self::new(params)?.with_mode(StageMode::LzssOnly))
    }

    /// Replace the stage mode.
    pub fn with_mode(mut self, mode: StageMode) -> Self {
        self.mode = mode;
        self
    }

    /// LZSS parameters.
    pub fn params(&self) -> &LzssParams {
        &self.params
    }

    /// Stage mode.
    pub fn mode(&self) -> StageMode {
        self.mode
    }

    /// Compress `data` into a container value.
    pub fn compress_container(&self, data: &[u8]) -> Result<Container> {
        let start = Instant::now();
        let tokens = LzssEncoder::new(self.params)?.encode(data);
        debug!(
            input = data.len(),
            tokens = tokens.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "LZSS stage finished"
        );

        let payload = match self.mode {
            StageMode::LzssOnly => Payload::Tokens(tokens),
            StageMode::LzssHuffman => {
                let start = Instant::now();
                let block = huffman_compress(&tokens)?;
                debug!(
                    symbols = block.table.len(),
                    max_code_len = block.table.max_length(),
                    payload = block.payload.len(),
                    padding = block.padding_bits,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Huffman stage finished"
                );
                Payload::Huffman(block)
            }
        };

        Ok(Container {
            params: self.params,
            original_len: data.len() as u64,
            payload,
        })
    }

    /// Compress `data` and describe the result.
    pub fn compress_with_report(&self, data: &[u8]) -> Result<(Vec<u8>, CompressionReport)> {
        let container = self.compress_container(data)?;
        let bytes = container.to_bytes();
        let report = CompressionReport {
            mode: self.mode,
            params: self.params,
            original_size: data.len(),
            token_stream_size: container.token_len(),
            payload_size: container.payload_len(),
            container_size: bytes.len(),
        };
        debug!(
            mode = %report.mode,
            original = report.original_size,
            compressed = report.container_size,
            ratio = report.ratio(),
            "compressed buffer"
        );
        Ok((bytes, report))
    }

    /// Compress `data` into container bytes.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.compress_container(data)?.to_bytes())
    }

    /// Decompress container bytes.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress_container(&Container::parse(data)?)
    }
}

impl ByteCodec for Pipeline {
    fn name(&self) -> &'static str {
        self.mode.name()
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.compress(input)
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.decompress(input)
    }
}

/// Reverse both stages of a parsed container.
pub fn decompress_container(container: &Container) -> Result<Vec<u8>> {
    container.params.validate()?;

    let start = Instant::now();
    let decoded;
    let tokens = match &container.payload {
        Payload::Tokens(tokens) => tokens.as_slice(),
        Payload::Huffman(block) => {
            decoded = HuffmanDecoder::new(&block.table)?.decode(
                &block.payload,
                block.padding_bits,
                block.symbol_count,
            )?;
            debug!(
                tokens = decoded.len(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "Huffman stage reversed"
            );
            decoded.as_slice()
        }
    };

    let output = lzss_decompress(tokens, &container.params)?;
    if output.len() as u64 != container.original_len {
        return Err(OxiPixError::corrupted(
            output.len() as u64,
            format!(
                "decoded {} bytes, header declares {}",
                output.len(),
                container.original_len
            ),
        ));
    }

    debug!(
        output = output.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "decompressed container"
    );
    Ok(output)
}

/// Compress with the default two-stage pipeline.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    Pipeline::default().compress(data)
}

/// Decompress any container, whichever mode and parameters it declares.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_container(&Container::parse(data)?)
}
