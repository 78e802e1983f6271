use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::hashing::{ContentHash, HashingWriter, STREAM_BUF_SIZE};

/// Valid compression levels. Out-of-range requests are clamped.
pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 9;

pub fn clamp_level(level: u32) -> u32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Gzip-compress a byte slice at the given level.
pub fn compress_bytes(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(clamp_level(level)));
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inverse of [`compress_bytes`].
pub fn decompress_bytes(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Gzip-compress everything a reader yields, through a bounded buffer.
/// Returns the compressed bytes plus the digest and size of the plain input,
/// so large files are hashed and compressed in a single pass.
pub fn compress_reader<R: Read>(
    mut reader: R,
    level: u32,
) -> io::Result<(Vec<u8>, ContentHash, u64)> {
    let encoder = GzEncoder::new(Vec::new(), Compression::new(clamp_level(level)));
    let mut sink = HashingWriter::new(encoder);
    let mut buf = vec![0u8; STREAM_BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n])?;
    }
    let (encoder, hash, size) = sink.finish();
    Ok((encoder.finish()?, hash, size))
}

/// Decompress a payload into a writer through a bounded buffer.
/// Returns the number of plain bytes produced.
pub fn decompress_to_writer<W: Write>(payload: &[u8], writer: &mut W) -> io::Result<u64> {
    let mut decoder = GzDecoder::new(payload);
    let mut buf = vec![0u8; STREAM_BUF_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = decoder.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}

/// Decompress a payload, keeping only the digest and size of the output.
/// Used to self-validate large-file records without materializing them.
pub fn decompress_to_hash(payload: &[u8]) -> io::Result<(ContentHash, u64)> {
    let mut sink = HashingWriter::new(io::sink());
    decompress_to_writer(payload, &mut sink)?;
    let (_, hash, size) = sink.finish();
    Ok((hash, size))
}
