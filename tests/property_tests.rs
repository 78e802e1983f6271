use std::fs;

use proptest::prelude::*;

use amber::{compress_directory, decompress_archive, ArchiveOptions};

proptest! {
    #![proptest_config(ProptestConfig { cases: 24, .. ProptestConfig::default() })]
    #[test]
    fn any_binary_tree_roundtrips(
        entries in proptest::collection::btree_map(
            "[a-z][a-z0-9]{0,7}",
            proptest::collection::vec(any::<u8>(), 0..2048),
            1..8,
        )
    ) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        for (name, content) in &entries {
            fs::write(src.join(format!("{name}.bin")), content).unwrap();
        }

        let archive = compress_directory(&src, dir.path(), &ArchiveOptions::default()).unwrap();
        let out = dir.path().join("extracted");
        decompress_archive(&archive, &out).unwrap();

        for (name, content) in &entries {
            let back = fs::read(out.join(format!("{name}.bin"))).unwrap();
            prop_assert_eq!(&back, content);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 24, .. ProptestConfig::default() })]
    #[test]
    fn any_text_tree_roundtrips_raw_by_default(
        entries in proptest::collection::btree_map(
            "[a-z][a-z0-9]{0,7}",
            ".{0,400}",
            1..6,
        )
    ) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        for (name, content) in &entries {
            fs::write(src.join(format!("{name}.js")), content.as_bytes()).unwrap();
        }

        let archive = compress_directory(&src, dir.path(), &ArchiveOptions::default()).unwrap();
        let out = dir.path().join("extracted");
        decompress_archive(&archive, &out).unwrap();

        for (name, content) in &entries {
            let back = fs::read(out.join(format!("{name}.js"))).unwrap();
            prop_assert_eq!(back, content.as_bytes().to_vec());
        }
    }
}
