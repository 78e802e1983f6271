use std::fs;
use std::path::Path;

use amber::{compress_directory, decompress_archive, ArchiveOptions};

fn write(dir: &Path, rel: &str, bytes: &[u8]) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

#[test]
fn archive_roundtrip_identity() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("artifacts");
    fs::create_dir_all(&src).unwrap();

    write(&src, "readme.txt", b"build artifacts\n");
    write(&src, "out/Token.json", br#"{"abi":[],"bytecode":"0x6001"}"#);
    write(&src, "out/nested/deep/data.bin", &(0u8..=255).collect::<Vec<_>>());
    write(&src, "empty.bin", b"");

    let archive = compress_directory(&src, dir.path(), &ArchiveOptions::default()).unwrap();
    let out = dir.path().join("extracted");
    let returned = decompress_archive(&archive, &out).unwrap();
    assert_eq!(returned, out);

    for rel in [
        "readme.txt",
        "out/Token.json",
        "out/nested/deep/data.bin",
        "empty.bin",
    ] {
        let original = fs::read(src.join(rel)).unwrap();
        let extracted = fs::read(out.join(rel)).unwrap();
        assert_eq!(original, extracted, "mismatch for {rel}");
    }
}

#[test]
fn empty_directory_roundtrips_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("empty_src");
    fs::create_dir_all(&src).unwrap();

    let archive = compress_directory(&src, dir.path(), &ArchiveOptions::default()).unwrap();
    let out = dir.path().join("extracted");
    decompress_archive(&archive, &out).unwrap();
    assert!(out.is_dir());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn roundtrip_without_dedup_or_delta() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    write(&src, "a.js", b"import x from 'y';\nexport default x;\n");
    write(&src, "b.js", b"import x from 'y';\nexport default x;\n");

    let opts = ArchiveOptions {
        dedup: false,
        delta: false,
        ..ArchiveOptions::default()
    };
    let archive = compress_directory(&src, dir.path(), &opts).unwrap();
    let out = dir.path().join("extracted");
    decompress_archive(&archive, &out).unwrap();

    assert_eq!(
        fs::read(out.join("a.js")).unwrap(),
        fs::read(src.join("a.js")).unwrap()
    );
    assert_eq!(
        fs::read(out.join("b.js")).unwrap(),
        fs::read(src.join("b.js")).unwrap()
    );
}

#[test]
fn envelope_honors_the_configured_level() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    write(&src, "data.txt", "lorem ipsum dolor sit amet ".repeat(500).as_bytes());

    // Gzip XFL header byte: 4 marks the fastest level, 2 the slowest.
    for (level, xfl) in [(1u32, 4u8), (9, 2)] {
        let out_dir = dir.path().join(format!("out{level}"));
        let opts = ArchiveOptions {
            level,
            ..ArchiveOptions::default()
        };
        let archive = compress_directory(&src, &out_dir, &opts).unwrap();
        let bytes = fs::read(&archive).unwrap();
        assert_eq!(bytes[8], xfl, "level {level}");
    }
}

#[test]
fn every_compression_level_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    let data: Vec<u8> = (0u8..200).cycle().take(10_000).collect();
    write(&src, "data.bin", &data);

    for level in [1u32, 5, 9] {
        let out_dir = dir.path().join(format!("out{level}"));
        let opts = ArchiveOptions {
            level,
            ..ArchiveOptions::default()
        };
        let archive = compress_directory(&src, &out_dir, &opts).unwrap();
        let extracted = out_dir.join("extracted");
        decompress_archive(&archive, &extracted).unwrap();
        assert_eq!(fs::read(extracted.join("data.bin")).unwrap(), data);
    }
}
