//! Info command implementation.

use oxipix_lzhf::{Container, LzssParams, Payload, StageMode};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Header fields of a container, for `--json`.
#[derive(Debug, Serialize)]
struct ContainerInfo<'a> {
    file: &'a str,
    mode: StageMode,
    params: LzssParams,
    container_size: usize,
    original_size: u64,
    token_stream_size: usize,
    payload_size: usize,
    code_table_entries: Option<usize>,
    max_code_length: Option<u8>,
    padding_bits: Option<u8>,
}

pub fn cmd_info(container_path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(container_path)?;
    let container = Container::parse(&data)?;

    let table = container.code_table();
    let padding_bits = match &container.payload {
        Payload::Huffman(block) => Some(block.padding_bits),
        Payload::Tokens(_) => None,
    };
    let display = container_path.display().to_string();
    let info = ContainerInfo {
        file: &display,
        mode: container.mode(),
        params: container.params,
        container_size: data.len(),
        original_size: container.original_len,
        token_stream_size: container.token_len(),
        payload_size: container.payload_len(),
        code_table_entries: table.map(|t| t.len()),
        max_code_length: table.map(|t| t.max_length()),
        padding_bits,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Container Information");
    println!("=====================");
    println!("File: {}", info.file);
    println!("Format: {} ({})", String::from_utf8_lossy(info.mode.magic()), info.mode);
    println!("Size: {} bytes", info.container_size);
    println!();
    println!("LZSS Parameters:");
    println!("  Window size: {}", info.params.window_size);
    println!("  Lookahead: {}", info.params.lookahead);
    println!("  Minimum match: {}", info.params.min_match);
    println!();
    println!("Contents:");
    println!("  Original size: {} bytes", info.original_size);
    println!("  Token stream: {} bytes", info.token_stream_size);
    println!("  Payload: {} bytes", info.payload_size);
    if let (Some(entries), Some(max_len), Some(padding)) =
        (info.code_table_entries, info.max_code_length, info.padding_bits)
    {
        println!("  Code table: {} symbols, longest code {} bits", entries, max_len);
        println!("  Padding: {} bits", padding);
    }
    if info.original_size > 0 {
        println!(
            "  Space savings: {:.1}%",
            (1.0 - info.container_size as f64 / info.original_size as f64) * 100.0
        );
    }

    Ok(())
}
