//! Decompress command implementation.

use crate::pnm::PnmCodec;
use crate::utils::{create_spinner, default_decompressed_path};
use oxipix_lzhf::{ImageInfo, Pipeline, unpack_image};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn cmd_decompress(
    input: &Path,
    output: Option<PathBuf>,
    image: Option<&Path>,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| default_decompressed_path(input));
    let data = fs::read(input)?;
    info!(input = %input.display(), bytes = data.len(), "read container");

    // Parameters and mode come from the container itself.
    let pipeline = Pipeline::default();

    let pb = create_spinner(&format!("Decompressing {}", input.display()), progress);
    let restored = match image {
        Some(sidecar) => {
            let info: ImageInfo = serde_json::from_slice(&fs::read(sidecar)?)?;
            unpack_image(&PnmCodec, info, &data, &pipeline)?
        }
        None => pipeline.decompress(&data)?,
    };
    pb.finish_and_clear();

    fs::write(&output, &restored)?;
    println!(
        "Decompressed {} -> {} ({} bytes)",
        input.display(),
        output.display(),
        restored.len()
    );

    Ok(())
}
