//! huffpix CLI - lossy Huffman compression for 24-bit bitmaps
//!
//! `huffpix compress` turns a BMP into a `.hpx` container; `huffpix
//! decompress` turns a container back into a BMP with the original headers.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};

use huffpix::codec::{EncodeOptions, EncodeStats};
use huffpix::file::{compress_file, decompress_file};
use huffpix::{Channel, Quality};

/// Per-channel Huffman image compressor for 24-bit BMP files.
#[derive(Parser, Debug)]
#[command(name = "huffpix")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a 24-bit BMP into a container
    Compress {
        /// Input bitmap
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output container (default: input with a .hpx extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Quality (1-10, 10 = lossless)
        #[arg(short, long, default_value = "8", value_parser = clap::value_parser!(u8).range(1..=10))]
        quality: u8,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Decompress a container back into a BMP
    Decompress {
        /// Input container
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output bitmap (default: input with a .decoded.bmp extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Args::parse().command {
        Command::Compress {
            input,
            output,
            quality,
            verbose,
        } => {
            let output = output.unwrap_or_else(|| with_extension(&input, "hpx"));
            compress(&input, &output, Quality::new(quality)?, verbose)
        }
        Command::Decompress {
            input,
            output,
            verbose,
        } => {
            let output = output.unwrap_or_else(|| with_extension(&input, "decoded.bmp"));
            decompress(&input, &output, verbose)
        }
    }
}

fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let mut path = path.to_path_buf();
    path.set_extension(extension);
    path
}

fn compress(
    input: &Path,
    output: &Path,
    quality: Quality,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let stats = compress_file(input, output, &EncodeOptions::with_quality(quality))?;
    let elapsed = start.elapsed();

    let input_size = fs::metadata(input)?.len();
    let output_size = stats.output_bytes as u64;
    if verbose {
        eprintln!("Input: {:?}", input);
        eprintln!("  Dimensions: {}x{}", stats.width, stats.height);
        eprintln!("Output: {:?}", output);
        eprintln!("  Quality: {} (step {})", quality.get(), quality.step());
        print_channel_stats(&stats);
        eprintln!("  Bits per pixel: {:.3}", stats.bits_per_pixel());
        eprintln!("  Time: {:.2?}", elapsed);
    }
    report(input_size, output_size, verbose);
    Ok(())
}

fn decompress(input: &Path, output: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let image = decompress_file(input, output)?;
    let elapsed = start.elapsed();

    let input_size = fs::metadata(input)?.len();
    let output_size = fs::metadata(output)?.len();
    if verbose {
        eprintln!("Input: {:?}", input);
        eprintln!(
            "  Dimensions: {}x{}",
            image.planes.width, image.planes.height
        );
        eprintln!("  Quality: {}", image.quality.get());
        eprintln!("Output: {:?}", output);
        if image.trailer.is_empty() {
            eprintln!("  Header: synthesized (container has no trailer)");
        }
        eprintln!("  Time: {:.2?}", elapsed);
    }
    report(input_size, output_size, verbose);
    Ok(())
}

fn print_channel_stats(stats: &EncodeStats) {
    for channel in Channel::ALL {
        let c = &stats.channels[channel.index()];
        eprintln!(
            "  {:<5} {:>3} symbols, {:>3} nodes, {} bits, {}",
            channel.name(),
            c.distinct_symbols,
            c.tree_nodes,
            c.bit_count,
            format_size(c.payload_bytes as u64)
        );
    }
}

fn report(input_size: u64, output_size: u64, verbose: bool) {
    let ratio = if input_size > 0 {
        (output_size as f64 / input_size as f64) * 100.0
    } else {
        0.0
    };
    let line = format!(
        "{} -> {} ({:.1}%)",
        format_size(input_size),
        format_size(output_size),
        ratio
    );
    if verbose {
        eprintln!("  Size: {line}");
    } else {
        println!("{line}");
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
