//! OxiPix CLI - LZSS + Huffman pixel compressor
//!
//! Compresses raw buffers and PNM images into `LZHF` containers, restores
//! them, and verifies round trips.

mod commands;
mod pnm;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{DigestKind, cmd_compress, cmd_decompress, cmd_info, cmd_test};
use oxipix_lzhf::LzssParams;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use utils::build_pipeline;

#[derive(Parser)]
#[command(name = "oxipix")]
#[command(
    author,
    version,
    about = "LZSS + Huffman lossless compressor for pixel data"
)]
#[command(long_about = "
OxiPix compresses pixel buffers with an LZSS stage followed by a Huffman
stage and stores the result in a self-describing LZHF container.

Examples:
  oxipix compress frame.raw
  oxipix compress frame.raw --single-stage
  oxipix compress photo.ppm --image -o photo.lzhf
  oxipix decompress frame.raw.lzhf
  oxipix decompress photo.lzhf --image photo.lzhf.json -o restored.ppm
  oxipix test frame.raw --digest sha256
  oxipix info frame.raw.lzhf --json
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into an LZHF container
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output container (default: <input>.lzhf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the Huffman stage
        #[arg(long)]
        single_stage: bool,

        /// Sliding window size (1-4095)
        #[arg(long, default_value_t = LzssParams::DEFAULT.window_size)]
        window: u16,

        /// Lookahead buffer size
        #[arg(long, default_value_t = LzssParams::DEFAULT.lookahead)]
        lookahead: u8,

        /// Minimum match length
        #[arg(long, default_value_t = LzssParams::DEFAULT.min_match)]
        min_match: u8,

        /// Treat the input as a PNM image and compress only its pixels
        #[arg(long)]
        image: bool,

        /// Show a spinner while compressing
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Restore a file from an LZHF container
    #[command(alias = "d")]
    Decompress {
        /// Container to decompress
        input: PathBuf,

        /// Output file (default: input without .lzhf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image sidecar written by `compress --image`; rebuilds a PNM file
        #[arg(long, value_name = "SIDECAR")]
        image: Option<PathBuf>,

        /// Show a spinner while decompressing
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Compress, decompress and verify a file without writing anything
    #[command(alias = "t")]
    Test {
        /// File to round-trip
        file: PathBuf,

        /// Skip the Huffman stage
        #[arg(long)]
        single_stage: bool,

        /// Secondary digest to report
        #[arg(short, long, value_enum, default_value = "crc32")]
        digest: DigestKind,
    },

    /// Show the header of an LZHF container
    #[command(alias = "i")]
    Info {
        /// Container to inspect
        container: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            single_stage,
            window,
            lookahead,
            min_match,
            image,
            progress,
        } => build_pipeline(window, lookahead, min_match, single_stage)
            .map_err(Into::into)
            .and_then(|pipeline| cmd_compress(&input, output, &pipeline, image, progress)),
        Commands::Decompress {
            input,
            output,
            image,
            progress,
        } => cmd_decompress(&input, output, image.as_deref(), progress),
        Commands::Test {
            file,
            single_stage,
            digest,
        } => build_pipeline(
            LzssParams::DEFAULT.window_size,
            LzssParams::DEFAULT.lookahead,
            LzssParams::DEFAULT.min_match,
            single_stage,
        )
        .map_err(Into::into)
        .and_then(|pipeline| cmd_test(&file, &pipeline, digest)),
        Commands::Info { container, json } => cmd_info(&container, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
