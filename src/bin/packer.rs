use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;

use amber::config::DEFAULT_STREAMING_THRESHOLD;
use amber::io_utils::amber_cli_error;
use amber::{builder, ArchiveOptions};

/// Build an .ambr archive from a directory tree.
#[derive(Parser)]
struct Args {
    /// Source directory to archive
    source: PathBuf,
    /// Directory the archive is written into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Compression level (1-9)
    #[arg(long, default_value_t = 6)]
    level: u32,
    /// Disable content-hash deduplication
    #[arg(long)]
    no_dedup: bool,
    /// Disable dictionary compression attempts
    #[arg(long)]
    no_delta: bool,
    /// Lossy mode: normalize text files before hashing and archiving
    #[arg(long)]
    normalize_text: bool,
    /// Abort on the first per-file failure instead of skipping
    #[arg(long)]
    strict: bool,
    /// Skip post-build validation
    #[arg(long)]
    no_validate: bool,
    /// Files above this many bytes are compressed as a stream
    #[arg(long, default_value_t = DEFAULT_STREAMING_THRESHOLD)]
    streaming_threshold: u64,
    /// Print the build outcome as JSON on stdout
    #[arg(long)]
    json: bool,
    /// Suppress progress output and the report
    #[arg(long)]
    quiet: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let opts = ArchiveOptions {
        level: args.level,
        dedup: !args.no_dedup,
        delta: !args.no_delta,
        normalize_text: args.normalize_text,
        validate: !args.no_validate,
        strict: args.strict,
        streaming_threshold: args.streaming_threshold,
    };

    let bar = if args.quiet || args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    let outcome =
        builder::compress_directory_with_report(&args.source, &args.out_dir, &opts, |rel| {
            bar.set_message(rel.to_string());
            bar.inc(1);
        })
        .map_err(|e| amber_cli_error("building archive", e))?;
    bar.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        if !args.quiet {
            outcome.report.report();
        }
        println!("{}", outcome.archive_path.display());
    }
    Ok(())
}
