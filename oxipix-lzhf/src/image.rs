//! Image collaborator boundary.
//!
//! The codec never interprets pixels. An [`ImageSource`] turns an image file
//! into a flat pixel buffer plus its dimensions, and an [`ImageSink`] turns
//! them back into a file. Only the pixel bytes pass through the pipeline.

use crate::pipeline::{CompressionReport, Pipeline};
use oxipix_core::error::{OxiPixError, Result};
use serde::{Deserialize, Serialize};

/// Dimensions and sample layout of a raw image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel (1 = gray, 3 = RGB, 4 = RGBA).
    pub channels: u8,
    /// Bits per channel sample.
    pub bit_depth: u8,
}

impl ImageInfo {
    /// Number of pixel bytes an image with this layout holds.
    pub fn expected_len(&self) -> Result<usize> {
        if self.channels == 0 || self.bit_depth == 0 {
            return Err(OxiPixError::invalid_header(format!(
                "image with {} channels at {} bits per sample",
                self.channels, self.bit_depth
            )));
        }
        let bits_per_row = u64::from(self.width)
            .checked_mul(u64::from(self.channels))
            .and_then(|v| v.checked_mul(u64::from(self.bit_depth)));
        bits_per_row
            .map(|bits| bits.div_ceil(8))
            .and_then(|row| row.checked_mul(u64::from(self.height)))
            .and_then(|total| usize::try_from(total).ok())
            .ok_or_else(|| {
                OxiPixError::input_too_large(format!(
                    "{}x{} image does not fit in memory",
                    self.width, self.height
                ))
            })
    }
}

/// Pixel bytes with their layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    /// Layout of `pixels`.
    pub info: ImageInfo,
    /// Row-major pixel samples.
    pub pixels: Vec<u8>,
}

impl RawImage {
    /// Check that the pixel buffer matches the layout.
    pub fn validate(&self) -> Result<()> {
        let expected = self.info.expected_len()?;
        if self.pixels.len() != expected {
            return Err(OxiPixError::corrupted(
                self.pixels.len() as u64,
                format!(
                    "{}x{} image needs {expected} pixel bytes, found {}",
                    self.info.width,
                    self.info.height,
                    self.pixels.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Extracts pixels from an image file.
pub trait ImageSource {
    /// Parse `file` into its pixel buffer and layout.
    fn read_image(&self, file: &[u8]) -> Result<RawImage>;
}

/// Writes pixels back into an image file.
pub trait ImageSink {
    /// Produce a structurally valid image file for `image`.
    fn write_image(&self, image: &RawImage) -> Result<Vec<u8>>;
}

/// Compressed pixels of one image.
#[derive(Debug, Clone)]
pub struct PackedImage {
    /// Layout needed to rebuild the file.
    pub info: ImageInfo,
    /// Container bytes holding the pixels.
    pub container: Vec<u8>,
    /// Sizes of the compression call.
    pub report: CompressionReport,
}

/// Extract the pixels of `file` and compress them.
pub fn pack_image(
    source: &dyn ImageSource,
    file: &[u8],
    pipeline: &Pipeline,
) -> Result<PackedImage> {
    let image = source.read_image(file)?;
    image.validate()?;
    let (container, report) = pipeline.compress_with_report(&image.pixels)?;
    Ok(PackedImage {
        info: image.info,
        container,
        report,
    })
}

/// Decompress pixels and wrap them back into an image file.
pub fn unpack_image(
    sink: &dyn ImageSink,
    info: ImageInfo,
    container: &[u8],
    pipeline: &Pipeline,
) -> Result<Vec<u8>> {
    let image = RawImage {
        info,
        pixels: pipeline.decompress(container)?,
    };
    image.validate()?;
    sink.write_image(&image)
}
