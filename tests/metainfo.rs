use std::collections::HashMap;
use std::io::Write;

use bitmeta::bencode::{encode_bvalue, BValue, DecodeOptions};
use bitmeta::engine::display_metainfo;
use bitmeta::file_io::read_input;
use bitmeta::torrent::{load_document, ContentLayout, FileNode, ValidationError};

fn dict(entries: Vec<(&str, BValue)>) -> BValue {
    BValue::Dict(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<HashMap<_, _>>())
}

fn file(path: &[&str], length: i128) -> BValue {
    dict(vec![
        ("length", BValue::Integer(length)),
        ("path", BValue::List(path.iter().map(|s| BValue::string(s)).collect())),
    ])
}

fn multi_file_document(files: Vec<BValue>, pieces: usize) -> Vec<u8> {
    encode_bvalue(&dict(vec![
        (
            "announce-list",
            BValue::List(vec![
                BValue::List(vec![BValue::string("http://one.test/announce")]),
                BValue::List(vec![
                    BValue::string("udp://two.test:6969/announce"),
                    BValue::string("https://three.test/announce"),
                ]),
            ]),
        ),
        (
            "info",
            dict(vec![
                ("name", BValue::string("album")),
                ("files", BValue::List(files)),
                ("piece length", BValue::Integer(16384)),
                ("pieces", BValue::ByteString(vec![0x11; pieces])),
            ]),
        ),
    ]))
}

#[test]
fn loads_a_multi_file_document_from_disk() {
    let doc = multi_file_document(
        vec![
            file(&["cover.jpg"], 2048),
            file(&["disc1", "01.flac"], 30_000),
            file(&["disc1", "02.flac"], 31_000),
        ],
        80,
    );
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&doc).unwrap();

    let bytes = read_input(Some(tmp.path())).unwrap();
    let meta = load_document(&bytes).unwrap();

    assert_eq!(meta.trackers.len(), 2);
    assert_eq!(meta.trackers[1].len(), 2);
    assert_eq!(meta.trackers[1][0].port(), Some(6969));
    assert_eq!(meta.total_length(), 63_048);
    assert_eq!(meta.piece_count(), 4);

    let tree = meta.file_tree().unwrap();
    match tree.get("disc1") {
        Some(FileNode::Directory(disc)) => assert_eq!(disc.len(), 2),
        other => panic!("disc1 should be a directory, got {:?}", other),
    }

    let mut out = Vec::new();
    display_metainfo(&bytes, &DecodeOptions::default(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let expected_head = "trackers:\n\
        \thttp://one.test/announce\n\
        \tudp://two.test:6969/announce  https://three.test/announce\n\
        content:\n\
        \talbum/\n\
        \t├─ cover.jpg (2048)\n\
        \t└─ disc1/\n\
        \t   ├─ 01.flac (30000)\n\
        \t   └─ 02.flac (31000)\n\
        piece length: 16384\n";
    assert!(text.starts_with(expected_head), "{}", text);
}

#[test]
fn file_and_directory_with_the_same_name_both_survive() {
    let doc = multi_file_document(vec![file(&["notes"], 10), file(&["notes", "today.txt"], 20)], 20);
    let meta = load_document(&doc).unwrap();
    let tree = meta.file_tree().unwrap();
    assert_eq!(tree.get("notes"), Some(&FileNode::File(10)));
    assert!(matches!(tree.get("notes/"), Some(FileNode::Directory(_))));
    assert!(meta.to_string().contains("\t├─ notes (10)\n\t└─ notes/\n\t   └─ today.txt (20)\n"));
}

#[test]
fn digest_is_identical_for_reordered_info() {
    let doc = multi_file_document(vec![file(&["a"], 1), file(&["b"], 2)], 20);
    let canonical = load_document(&doc).unwrap();

    // same info entries written in reverse key order
    let mut info = Vec::new();
    info.extend_from_slice(b"d6:pieces20:");
    info.extend_from_slice(&[0x11; 20]);
    info.extend_from_slice(b"12:piece lengthi16384e4:name5:album5:filesl");
    info.extend_from_slice(b"d6:lengthi1e4:pathl1:aeed6:lengthi2e4:pathl1:beee");
    info.push(b'e');
    let mut shuffled = b"d4:info".to_vec();
    shuffled.extend_from_slice(&info);
    shuffled.extend_from_slice(b"8:announce15:http://x.test/ae");

    let reordered = load_document(&shuffled).unwrap();
    assert_eq!(reordered.info_hash, canonical.info_hash);
    assert_ne!(reordered.trackers, canonical.trackers);
}

#[test]
fn misaligned_and_aligned_piece_buffers() {
    let err = load_document(&multi_file_document(vec![file(&["a"], 1)], 39)).unwrap_err();
    assert_eq!(err, ValidationError::MisalignedChecksumBuffer { len: 39, chunk_size: 20 });

    let meta = load_document(&multi_file_document(vec![file(&["a"], 1)], 40)).unwrap();
    assert_eq!(meta.piece_hashes(false).count(), 2);
    assert_eq!(meta.piece_hashes(true).count(), 2);
}

#[test]
fn single_file_with_files_list_is_rejected() {
    let doc = encode_bvalue(&dict(vec![
        ("announce", BValue::string("http://tracker.test/")),
        (
            "info",
            dict(vec![
                ("length", BValue::Integer(100)),
                ("files", BValue::List(vec![file(&["x"], 1)])),
                ("piece length", BValue::Integer(20)),
                ("pieces", BValue::ByteString(vec![0; 20])),
            ]),
        ),
    ]));
    assert_eq!(load_document(&doc).unwrap_err(), ValidationError::ConflictingContentFields);
}

#[test]
fn empty_files_list_is_an_empty_directory() {
    let meta = load_document(&multi_file_document(vec![], 0)).unwrap();
    assert_eq!(meta.content, ContentLayout::MultiFile(vec![]));
    assert!(meta.file_tree().unwrap().is_empty());
    assert!(meta.to_string().contains("content:\n\talbum/\npiece length"));
}
