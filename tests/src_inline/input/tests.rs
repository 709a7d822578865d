use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::config::load_engine_config;
use super::*;
use crate::model::polarity::Polarity;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("morphqc_input_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn write_gz(path: &Path, contents: &str) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn test_load_plain_and_gz_records() {
    let dir = make_temp_dir();
    let text = "M0001\tS1\t0.280000\t0.310000\nM0001\tS2\t0.450000\n";
    let plain = dir.join("FRGC_ArcFace_dissimilarity_scores.txt");
    let gz = dir.join("FRGC_ArcFace_dissimilarity_scores.txt.gz");
    write_file(&plain, text);
    write_gz(&gz, text);

    let a = load_score_records(&plain, MalformedPolicy::Fail).unwrap();
    let b = load_score_records(&gz, MalformedPolicy::Fail).unwrap();
    assert_eq!(a.records, b.records);
    assert_eq!(a.records.len(), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = make_temp_dir();
    let err = load_score_records(&dir.join("absent.txt"), MalformedPolicy::Fail).unwrap_err();
    assert!(matches!(err, InputError::Io { .. }));
}

#[test]
fn test_load_score_list() {
    let dir = make_temp_dir();
    let path = dir.join("mated.txt");
    write_file(&path, "# mated\n0.12\n0.30 0.41\n\n0.05\n");
    let scores = load_score_list(&path).unwrap();
    assert_eq!(scores, vec![0.12, 0.30, 0.41, 0.05]);
}

#[test]
fn test_load_score_list_invalid_token() {
    let dir = make_temp_dir();
    let path = dir.join("non_mated.txt");
    write_file(&path, "0.9\nscore\n");
    match load_score_list(&path).unwrap_err() {
        InputError::InvalidScore { line, token, .. } => {
            assert_eq!(line, 2);
            assert_eq!(token, "score");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_engine_config() {
    let dir = make_temp_dir();
    let path = dir.join("config.json");
    write_file(
        &path,
        r#"{"polarity":"similarity","ratio_denominator":"subjects","malformed":"skip"}"#,
    );
    let config = load_engine_config(&path).unwrap();
    assert_eq!(config.polarity, Polarity::Similarity);
    assert_eq!(config.malformed, MalformedPolicy::Skip);

    let bad = dir.join("bad.json");
    write_file(&bad, r#"{"polarity":"cosine"}"#);
    assert!(matches!(
        load_engine_config(&bad),
        Err(InputError::Config { .. })
    ));
}

#[test]
fn test_load_score_list_non_utf8_and_bom() {
    let dir = make_temp_dir();
    let path = dir.join("mated_bom.txt");
    write_file(&path, "\u{feff}0.12 0.2\n0.3\n");
    assert_eq!(load_score_list(&path).unwrap(), vec![0.12, 0.2, 0.3]);

    let bad = dir.join("mated_bytes.txt");
    fs::write(&bad, b"0.1\n\xff 0.2\n").unwrap();
    match load_score_list(&bad).unwrap_err() {
        InputError::InvalidScore { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}
