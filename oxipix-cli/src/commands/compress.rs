//! Compress command implementation.

use crate::pnm::PnmCodec;
use crate::utils::{create_spinner, default_compressed_path, print_report, sidecar_path};
use oxipix_lzhf::{Pipeline, pack_image};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn cmd_compress(
    input: &Path,
    output: Option<PathBuf>,
    pipeline: &Pipeline,
    image: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| default_compressed_path(input));
    let data = fs::read(input)?;
    info!(input = %input.display(), bytes = data.len(), "read input");

    let pb = create_spinner(&format!("Compressing {}", input.display()), progress);
    let (container, report, info) = if image {
        let packed = pack_image(&PnmCodec, &data, pipeline)?;
        (packed.container, packed.report, Some(packed.info))
    } else {
        let (container, report) = pipeline.compress_with_report(&data)?;
        (container, report, None)
    };
    pb.finish_and_clear();

    fs::write(&output, &container)?;
    println!("Compressed {} -> {}", input.display(), output.display());

    if let Some(info) = info {
        let sidecar = sidecar_path(&output);
        fs::write(&sidecar, serde_json::to_string_pretty(&info)?)?;
        println!(
            "  Image:           {}x{}, {} channel(s), sidecar {}",
            info.width,
            info.height,
            info.channels,
            sidecar.display()
        );
    }
    print_report(&report);

    Ok(())
}
