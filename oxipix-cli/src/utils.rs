//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use oxipix_lzhf::{CompressionReport, LzssParams, Pipeline, StageMode};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extension given to compressed files.
pub const CONTAINER_EXTENSION: &str = "lzhf";

/// Create a spinner for a single long-running step.
pub fn create_spinner(message: &str, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Build a pipeline from command-line parameters.
pub fn build_pipeline(
    window: u16,
    lookahead: u8,
    min_match: u8,
    single_stage: bool,
) -> oxipix_core::Result<Pipeline> {
    let params = LzssParams::new(window, lookahead, min_match)?;
    let mode = if single_stage {
        StageMode::LzssOnly
    } else {
        StageMode::LzssHuffman
    };
    Ok(Pipeline::new(params)?.with_mode(mode))
}

/// `<input>.lzhf`
pub fn default_compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(CONTAINER_EXTENSION);
    PathBuf::from(name)
}

/// Strip `.lzhf` if present, otherwise append `.out`.
pub fn default_decompressed_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == CONTAINER_EXTENSION) {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".out");
        PathBuf::from(name)
    }
}

/// `<output>.json`
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

/// Print the sizes of one compression call.
pub fn print_report(report: &CompressionReport) {
    println!("  Mode:            {}", report.mode);
    println!(
        "  Parameters:      window {}, lookahead {}, min match {}",
        report.params.window_size, report.params.lookahead, report.params.min_match
    );
    println!("  Original size:   {} bytes", report.original_size);
    println!(
        "  Token stream:    {} bytes ({:.3} of original)",
        report.token_stream_size,
        report.lzss_ratio()
    );
    println!("  Compressed size: {} bytes", report.container_size);
    println!("  Ratio:           {:.3}", report.ratio());
    println!("  Space savings:   {:.1}%", report.space_savings());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert_eq!(
            default_compressed_path(Path::new("pixels.raw")),
            PathBuf::from("pixels.raw.lzhf")
        );
        assert_eq!(
            default_decompressed_path(Path::new("pixels.raw.lzhf")),
            PathBuf::from("pixels.raw")
        );
        assert_eq!(
            default_decompressed_path(Path::new("blob.bin")),
            PathBuf::from("blob.bin.out")
        );
        assert_eq!(
            sidecar_path(Path::new("img.lzhf")),
            PathBuf::from("img.lzhf.json")
        );
    }

    #[test]
    fn test_build_pipeline() {
        let pipeline = build_pipeline(4095, 18, 3, true).unwrap();
        assert_eq!(pipeline.mode(), StageMode::LzssOnly);
        assert!(build_pipeline(4096, 18, 3, false).is_err());
    }
}
