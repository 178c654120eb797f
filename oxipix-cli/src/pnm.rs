//! Binary PPM (P6) and PGM (P5) images.
//!
//! The only image collaborator shipped with the CLI: 8-bit samples,
//! maxval 255, comments allowed in the header.

use oxipix_core::{OxiPixError, Result};
use oxipix_lzhf::{ImageInfo, ImageSink, ImageSource, RawImage};

/// Reader and writer for binary PNM files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PnmCodec;

/// Header scanner over the start of a PNM file.
struct HeaderScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl HeaderScanner<'_> {
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while self.data.get(self.pos).is_some_and(|&c| c != b'\n') {
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn number(&mut self, field: &str) -> Result<u32> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| OxiPixError::invalid_header(format!("missing or invalid PNM {field}")))
    }
}

impl ImageSource for PnmCodec {
    fn read_image(&self, file: &[u8]) -> Result<RawImage> {
        let channels = match file.get(..2) {
            Some(b"P5") => 1,
            Some(b"P6") => 3,
            Some(other) => return Err(OxiPixError::invalid_magic(b"P6".to_vec(), other)),
            None => return Err(OxiPixError::unexpected_eof(file.len() as u64 * 8, 16)),
        };

        let mut scanner = HeaderScanner { data: file, pos: 2 };
        let width = scanner.number("width")?;
        let height = scanner.number("height")?;
        let maxval = scanner.number("maxval")?;
        if maxval != 255 {
            return Err(OxiPixError::unsupported_parameters(format!(
                "PNM maxval {maxval} (only 8-bit samples are supported)"
            )));
        }

        // Exactly one whitespace byte separates the header from the samples.
        if !file.get(scanner.pos).is_some_and(u8::is_ascii_whitespace) {
            return Err(OxiPixError::invalid_header("PNM header not terminated"));
        }

        let image = RawImage {
            info: ImageInfo {
                width,
                height,
                channels,
                bit_depth: 8,
            },
            pixels: file[scanner.pos + 1..].to_vec(),
        };
        image.validate()?;
        Ok(image)
    }
}

impl ImageSink for PnmCodec {
    fn write_image(&self, image: &RawImage) -> Result<Vec<u8>> {
        image.validate()?;
        let magic = match (image.info.channels, image.info.bit_depth) {
            (1, 8) => "P5",
            (3, 8) => "P6",
            (channels, depth) => {
                return Err(OxiPixError::unsupported_parameters(format!(
                    "PNM cannot hold {channels} channels at {depth} bits"
                )));
            }
        };

        let header = format!("{magic}\n{} {}\n255\n", image.info.width, image.info.height);
        let mut out = Vec::with_capacity(header.len() + image.pixels.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&image.pixels);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_image() -> RawImage {
        RawImage {
            info: ImageInfo {
                width: 3,
                height: 2,
                channels: 3,
                bit_depth: 8,
            },
            pixels: (0..18).collect(),
        }
    }

    #[test]
    fn test_ppm_roundtrip() {
        let image = rgb_image();
        let file = PnmCodec.write_image(&image).unwrap();
        assert!(file.starts_with(b"P6\n3 2\n255\n"));
        assert_eq!(PnmCodec.read_image(&file).unwrap(), image);
    }

    #[test]
    fn test_pgm_with_comments() {
        let mut file = b"P5\n# made by hand\n2 2 # trailing\n255\n".to_vec();
        file.extend_from_slice(&[1, 2, 3, 4]);
        let image = PnmCodec.read_image(&file).unwrap();
        assert_eq!(image.info.channels, 1);
        assert_eq!(image.info.width, 2);
        assert_eq!(image.pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rejects_bad_files() {
        assert!(matches!(
            PnmCodec.read_image(b"P3\n1 1\n255\n"),
            Err(OxiPixError::InvalidMagic { .. })
        ));
        assert!(PnmCodec.read_image(b"P").is_err());
        assert!(PnmCodec.read_image(b"P6\n1 1\n65535\n\0\0\0\0\0\0").is_err());
        assert!(PnmCodec.read_image(b"P6\n2 2\n255\n\0\0\0").is_err());
        assert!(PnmCodec.read_image(b"P6\nx 2\n255\n").is_err());
    }

    #[test]
    fn test_write_rejects_unsupported_layout() {
        let mut image = rgb_image();
        image.info.channels = 2;
        image.info.width = 3;
        image.pixels = vec![0; 12];
        assert!(PnmCodec.write_image(&image).is_err());
    }
}
