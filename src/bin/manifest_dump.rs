use clap::Parser;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use amber::io_utils::{amber_cli_error, extension_error, io_cli_error};
use amber::{Archive, FileRecord, ARCHIVE_EXT};

/// Inspect the contents of an .ambr archive without extracting it.
#[derive(Parser)]
struct Args {
    /// Input .ambr archive
    input: PathBuf,
    /// Only print summary totals
    #[arg(long)]
    summary: bool,
    /// Optional CSV output path for per-file rows
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Optional JSON output path for per-file rows
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Serialize)]
struct Row {
    path: String,
    kind: String,
    original_size: u64,
    compressed_size: u64,
    hash: String,
    reference: String,
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
    let archive = Archive::read_from(&args.input)
        .map_err(|e| amber_cli_error("reading archive", e))?;

    let m = &archive.metadata;
    println!("archive: {}", args.input.display());
    println!("created: {}", m.created_at.to_rfc3339());
    println!("source: {}", m.source_root);
    println!("format version: {}", m.format_version);

    let mut counts = [0u64; 3]; // standard, duplicate, dictionary
    let mut rows = Vec::new();
    let mut csv_writer = match &args.csv {
        Some(p) => {
            let f = File::create(p).map_err(|e| io_cli_error("creating csv", p, e))?;
            let mut wtr = csv::Writer::from_writer(f);
            wtr.write_record([
                "path",
                "kind",
                "original_size",
                "compressed_size",
                "hash",
                "reference",
            ])?;
            Some(wtr)
        }
        None => None,
    };

    for (path, record) in &archive.files {
        match record {
            FileRecord::Standard { .. } => counts[0] += 1,
            FileRecord::Duplicate { .. } => counts[1] += 1,
            FileRecord::Dictionary { .. } => counts[2] += 1,
        }
        let reference = match record {
            FileRecord::Duplicate { reference, .. } => reference.clone(),
            _ => String::new(),
        };
        let row = Row {
            path: path.clone(),
            kind: record.kind_name().to_string(),
            original_size: record.original_size(),
            compressed_size: record.compressed_size(),
            hash: record.original_hash().short_hex(),
            reference,
        };

        if let Some(wtr) = csv_writer.as_mut() {
            wtr.write_record([
                row.path.as_str(),
                row.kind.as_str(),
                &row.original_size.to_string(),
                &row.compressed_size.to_string(),
                row.hash.as_str(),
                row.reference.as_str(),
            ])?;
        }
        if !args.summary {
            if row.reference.is_empty() {
                println!(
                    "{} [{}] {} -> {} bytes ({})",
                    row.path, row.kind, row.original_size, row.compressed_size, row.hash
                );
            } else {
                println!("{} [{}] -> {}", row.path, row.kind, row.reference);
            }
        }
        if args.json.is_some() {
            rows.push(row);
        }
    }

    if let Some(wtr) = csv_writer.as_mut() {
        wtr.flush()?;
    }
    if let Some(path) = &args.json {
        let mut f = File::create(path).map_err(|e| io_cli_error("creating json", path, e))?;
        serde_json::to_writer_pretty(&mut f, &rows)?;
        f.write_all(b"\n")?;
    }

    let total = m.file_count.max(1);
    println!("#files: {}", m.file_count);
    println!(
        "#standard: {} ({:.1}%)",
        counts[0],
        100.0 * counts[0] as f64 / total as f64
    );
    println!(
        "#duplicate: {} ({:.1}%)",
        counts[1],
        100.0 * counts[1] as f64 / total as f64
    );
    println!(
        "#dictionary: {} ({:.1}%)",
        counts[2],
        100.0 * counts[2] as f64 / total as f64
    );
    println!(
        "bytes: {} -> {}",
        m.total_original_size, m.total_compressed_size
    );

    Ok(())
}
