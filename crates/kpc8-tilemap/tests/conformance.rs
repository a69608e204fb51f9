use std::fs;
use std::path::PathBuf;

use kpc8_tilemap::{
    flatten, from_base64, read_base64_tilemap, read_binary_tilemap, to_base64, to_binary,
    ExportErrorCode, ExportFormat, FormatTable, FsHost, MemoryLayer, MemoryMap, MAP_HEIGHT,
    MAP_WIDTH,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from("../../test/fixtures").join(name)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "kpc8-tilemap-conformance-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn diagonal_map() -> MemoryMap {
    MemoryMap::new()
        .with_layer(MemoryLayer::objects())
        .with_layer(MemoryLayer::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| {
            (x + y) % 256
        }))
}

fn checker_map() -> MemoryMap {
    MemoryMap::new().with_layer(MemoryLayer::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| {
        if (x + y) % 2 == 1 {
            255
        } else {
            0
        }
    }))
}

#[test]
fn flatten_matches_binary_fixtures() {
    let diagonal = fs::read(fixture_path("diagonal.kpcbin")).expect("read diagonal fixture");
    let checker = fs::read(fixture_path("checker.kpcbin")).expect("read checker fixture");

    let flat = flatten(&diagonal_map()).expect("flatten diagonal map");
    assert_eq!(to_binary(flat.as_bytes()), diagonal);
    for y in 0..MAP_HEIGHT {
        for x in 0..MAP_WIDTH {
            assert_eq!(flat.as_bytes()[(y * 40 + x) as usize], ((x + y) % 256) as u8);
        }
    }

    let flat = flatten(&checker_map()).expect("flatten checker map");
    assert_eq!(flat.as_bytes(), checker.as_slice());
}

#[test]
fn base64_matches_text_fixtures() {
    for (map, name) in [(diagonal_map(), "diagonal"), (checker_map(), "checker")] {
        let expected =
            fs::read_to_string(fixture_path(&format!("{name}.base64"))).expect("read fixture");
        let text = to_base64(flatten(&map).expect("flatten").as_bytes());

        assert_eq!(text.len(), 1280);
        assert!(!text.ends_with('='));
        assert_eq!(text, expected.trim_end(), "{name}");
    }
}

#[test]
fn fixtures_read_back_to_same_buffer() {
    let text = fs::read_to_string(fixture_path("diagonal.base64")).expect("read text fixture");
    let bytes = fs::read(fixture_path("diagonal.kpcbin")).expect("read binary fixture");

    let from_text = read_base64_tilemap(&text).expect("decode text fixture");
    let from_binary = read_binary_tilemap(&bytes).expect("decode binary fixture");
    assert_eq!(from_text, from_binary);
    assert_eq!(from_text.tile_at(39, 23), Some(62));
    assert_eq!(crc32fast::hash(&bytes), crc32fast::hash(from_text.as_bytes()));
}

#[test]
fn base64_roundtrips_padding_cases() {
    let cases: [&[u8]; 5] = [&[], &[0x41], &[0xff, 0xff], &[1, 2, 3], &[0x5a; 960]];
    for bytes in cases {
        assert_eq!(from_base64(&to_base64(bytes)).expect("decode"), bytes);
    }
    assert_eq!(to_base64(&[0x41]), "QQ==");
    assert_eq!(to_base64(&[0xff, 0xff]), "//8=");
}

#[test]
fn exports_both_formats_to_disk() {
    let dir = scratch_dir("export");
    let table = FormatTable::with_builtin();
    let map = diagonal_map();

    for file_name in ["level.kpcbin", "level.base64"] {
        let path = dir.join(file_name);
        let format = table.for_path(&path).expect("resolve format");
        let report = format.write(&map, &path, &FsHost).expect("export");
        assert_eq!(report.path, path);
    }

    let binary = fs::read(dir.join("level.kpcbin")).expect("read binary export");
    let text = fs::read_to_string(dir.join("level.base64")).expect("read text export");
    assert_eq!(binary, fs::read(fixture_path("diagonal.kpcbin")).expect("read fixture"));
    assert_eq!(from_base64(&text).expect("decode export"), binary);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn rejected_map_leaves_no_file() {
    let dir = scratch_dir("rejected");
    let path = dir.join("level.kpcbin");

    let mut layer = MemoryLayer::from_fn(MAP_WIDTH, MAP_HEIGHT, |_, _| 1);
    assert!(layer.set_tile(10, 10, 300));
    let map = MemoryMap::new().with_layer(layer);

    let error = ExportFormat::binary()
        .write(&map, &path, &FsHost)
        .expect_err("should reject");
    assert_eq!(error.code, ExportErrorCode::TileIdRange);
    assert_eq!(error.message, "KPC8 supports up to 256 tiles IDs");
    assert!(!path.exists());
    assert_eq!(fs::read_dir(&dir).expect("list scratch dir").count(), 0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn multiple_tile_layers_are_rejected() {
    let map = diagonal_map().with_layer(MemoryLayer::tiles(MAP_WIDTH, MAP_HEIGHT));
    let error = flatten(&map).expect_err("should reject");
    assert_eq!(error.code, ExportErrorCode::MultipleLayers);
}

#[test]
fn map_without_tile_layer_exports_zeroes() {
    let map = MemoryMap::new().with_layer(MemoryLayer::image());
    let output = ExportFormat::base64().render(&map).expect("render");
    assert_eq!(output.len(), 1280);
    assert!(output.as_bytes().iter().all(|byte| *byte == b'A'));
}
