use std::collections::BTreeMap;
use std::fs;

use chrono::Utc;

use amber::archive::ArchiveMetadata;
use amber::dictionary::{self, ExtensionGroups, DICTIONARY_GROUP_MIN};
use amber::{
    codec, compress_directory, decompress_archive, Archive, ArchiveOptions, ContentHash,
    FileRecord,
};

fn similar_source(n: usize) -> String {
    format!(
        "import {{ ethers }} from 'ethers';\nimport {{ deploy }} from './lib';\n\nfunction run{n}() {{\n  return deploy({n});\n}}\n"
    )
}

#[test]
fn grouped_text_files_still_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    for i in 0..5 {
        fs::write(src.join(format!("script{i}.js")), similar_source(i)).unwrap();
    }

    let archive_path = compress_directory(&src, dir.path(), &ArchiveOptions::default()).unwrap();
    let archive = Archive::read_from(&archive_path).unwrap();

    // The dictionary attempt is best-effort: records may be standard or
    // dictionary, but every one must reproduce its content exactly.
    let out = dir.path().join("extracted");
    decompress_archive(&archive_path, &out).unwrap();
    for i in 0..5 {
        let name = format!("script{i}.js");
        assert_eq!(
            fs::read(out.join(&name)).unwrap(),
            fs::read(src.join(&name)).unwrap()
        );
    }
    assert_eq!(archive.metadata.file_count, 5);
}

#[test]
fn dictionary_records_extract_with_prefix_stripped() {
    let dir = tempfile::tempdir().unwrap();
    let dict = b"import { ethers } from 'ethers';".to_vec();
    let content = b"import { ethers } from 'ethers';\nfunction f() { return 1; }\n".to_vec();
    let payload = dictionary::try_dictionary(&dict, &content, 6).unwrap();
    let compressed_size = payload.len() as u64;

    let mut files = BTreeMap::new();
    files.insert(
        "f.js".to_string(),
        FileRecord::Dictionary {
            payload,
            dictionary: dict,
            original_hash: ContentHash::of(&content),
            original_size: content.len() as u64,
            compressed_size,
            normalized: false,
        },
    );
    let metadata = ArchiveMetadata::compute("src".to_string(), Utc::now(), &files);
    let archive = Archive { metadata, files };
    let path = dir.path().join("dict.ambr");
    archive.write_to(&path, 6).unwrap();

    let out = dir.path().join("out");
    decompress_archive(&path, &out).unwrap();
    assert_eq!(fs::read(out.join("f.js")).unwrap(), content);
}

#[test]
fn missing_dictionary_prefix_fails_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let content = b"function f() { return 1; }\n";
    // Payload deliberately compressed without the dictionary prefix.
    let payload = codec::compress_bytes(content, 6).unwrap();
    let compressed_size = payload.len() as u64;

    let mut files = BTreeMap::new();
    files.insert(
        "broken.js".to_string(),
        FileRecord::Dictionary {
            payload,
            dictionary: b"some dictionary".to_vec(),
            original_hash: ContentHash::of(content),
            original_size: content.len() as u64,
            compressed_size,
            normalized: false,
        },
    );
    let metadata = ArchiveMetadata::compute("src".to_string(), Utc::now(), &files);
    let archive = Archive { metadata, files };
    let path = dir.path().join("broken.ambr");
    archive.write_to(&path, 6).unwrap();

    let err = decompress_archive(&path, dir.path().join("out").as_path()).unwrap_err();
    match err {
        amber::AmberError::Extraction { path, reason } => {
            assert_eq!(path, "broken.js");
            assert!(reason.contains("dictionary prefix"));
        }
        other => panic!("expected extraction error, got {other:?}"),
    }
}

#[test]
fn groups_only_form_within_one_extension() {
    let mut groups = ExtensionGroups::new();
    groups.push("js", &similar_source(0));
    groups.push("js", &similar_source(1));
    groups.push("sol", &similar_source(2));
    groups.push("sol", &similar_source(3));
    // Neither extension reached the minimum on its own.
    assert!(groups.dictionary_for("js").is_none());
    assert!(groups.dictionary_for("sol").is_none());

    groups.push("js", &similar_source(4));
    assert_eq!(groups.member_count("js"), DICTIONARY_GROUP_MIN);
    let dict = groups.dictionary_for("js").unwrap();
    let text = String::from_utf8(dict).unwrap();
    assert!(text.contains("import { ethers } from 'ethers';"));
}

#[test]
fn prose_files_produce_no_dictionary() {
    let mut groups = ExtensionGroups::new();
    for i in 0..4 {
        groups.push("txt", &format!("note number {i} with plain words\n"));
    }
    // Enough members, but nothing pattern-like to extract.
    assert!(groups.dictionary_for("txt").is_none());
}
