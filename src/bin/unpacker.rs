use clap::Parser;
use std::fs;
use std::path::PathBuf;

use amber::io_utils::{amber_cli_error, extension_error, io_cli_error};
use amber::{decompress_archive, ARCHIVE_EXT};

/// Extract an .ambr archive created by the packer.
#[derive(Parser)]
struct Args {
    /// Input .ambr archive
    input: PathBuf,
    /// Output directory (created if missing)
    output: PathBuf,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args
        .input
        .extension()
        .and_then(|s| s.to_str())
        .map_or(true, |ext| ext.to_ascii_lowercase() != ARCHIVE_EXT)
    {
        return Err(extension_error(&args.input).into());
    }
    fs::metadata(&args.input)
        .map_err(|e| io_cli_error("reading input file", &args.input, e))?;
    let out = decompress_archive(&args.input, &args.output)
        .map_err(|e| amber_cli_error("extracting archive", e))?;
    eprintln!("extracted to {}", out.display());
    Ok(())
}
