use jpeghash_core::{DigestAlgorithm, IoStage, TypeFilter, fingerprint, parse_directives};
use jpeghash_io::{FileSource, fingerprint_file};
use sha1::{Digest, Sha1};
use std::io::Write;
use tempfile::NamedTempFile;

fn sample_jpeg() -> Vec<u8> {
    let mut jpeg = Vec::new();
    jpeg.extend_from_slice(&[0xFF, 0xD8]);
    jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    jpeg.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x48\x00\x48\x00\x00");
    jpeg.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x07]);
    jpeg.extend_from_slice(b"hello");
    jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    jpeg.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0x56]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_file_fingerprint_matches_in_memory_scan() {
    let jpeg = sample_jpeg();
    let file = write_temp(&jpeg);
    let filter = TypeFilter::from_ranges(parse_directives(["e0-ef", "fe"]).unwrap());

    for algorithm in [DigestAlgorithm::Sha1, DigestAlgorithm::Sha256] {
        let from_disk = fingerprint_file(file.path(), &filter, algorithm).unwrap();
        assert_eq!(from_disk, fingerprint(&jpeg, &filter, algorithm));
    }
}

#[test]
fn test_unfiltered_file_matches_plain_sha1() {
    let jpeg = sample_jpeg();
    let file = write_temp(&jpeg);

    let fp = fingerprint_file(file.path(), &TypeFilter::default(), DigestAlgorithm::Sha1).unwrap();
    assert_eq!(fp.to_hex(), hex::encode(Sha1::digest(&jpeg)));
}

#[test]
fn test_empty_file_hashes_zero_bytes() {
    let file = write_temp(&[]);
    let fp = fingerprint_file(file.path(), &TypeFilter::default(), DigestAlgorithm::Sha1).unwrap();
    assert_eq!(fp.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
}

#[test]
fn test_regular_file_is_mapped() {
    let file = write_temp(&sample_jpeg());
    let source = FileSource::open(file.path()).unwrap();
    assert!(source.is_mmap());
}

#[test]
fn test_missing_file_fails_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let err = fingerprint_file(
        dir.path().join("nope.jpg"),
        &TypeFilter::default(),
        DigestAlgorithm::Sha1,
    )
    .unwrap_err();
    assert_eq!(err.io_stage(), Some(IoStage::Open));
}

#[cfg(unix)]
#[test]
fn test_directory_fails_while_reading() {
    let dir = tempfile::tempdir().unwrap();
    let err = fingerprint_file(dir.path(), &TypeFilter::default(), DigestAlgorithm::Sha1)
        .unwrap_err();
    assert_eq!(err.io_stage(), Some(IoStage::Read));
}
