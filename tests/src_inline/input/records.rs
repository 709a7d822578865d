use super::*;
use std::io::Cursor;
use std::path::PathBuf;

fn parse(line: &str) -> Result<Option<ScoreRecord>, MalformedRecord> {
    parse_record_line(line, 7)
}

#[test]
fn test_parse_tab_separated_record() {
    let record = parse("M0001\tS1\t0.280000\t0.310000\n").unwrap().unwrap();
    assert_eq!(record.entity_id(), "M0001");
    assert_eq!(record.counterpart_id(), "S1");
    assert_eq!(record.scores(), &[0.28, 0.31]);
}

#[test]
fn test_parse_mixed_whitespace_single_score() {
    let record = parse("  M0002  S2 \t 0.5").unwrap().unwrap();
    assert_eq!(record.scores(), &[0.5]);
}

#[test]
fn test_blank_and_comment_lines_skipped() {
    assert_eq!(parse(""), Ok(None));
    assert_eq!(parse("   \t  \n"), Ok(None));
    assert_eq!(parse("# morph subject scores"), Ok(None));
    assert_eq!(parse("   # indented comment"), Ok(None));
}

#[test]
fn test_too_few_fields_rejected() {
    assert_eq!(
        parse("M0001 S1"),
        Err(MalformedRecord::TooFewFields { line: 7, found: 2 })
    );
    assert_eq!(
        parse("M0001"),
        Err(MalformedRecord::TooFewFields { line: 7, found: 1 })
    );
}

#[test]
fn test_non_numeric_score_rejected() {
    let err = parse("M0001 S1 0.2 abc").unwrap_err();
    assert_eq!(
        err,
        MalformedRecord::NonNumeric {
            line: 7,
            field: 4,
            token: "abc".to_string()
        }
    );
    assert_eq!(err.line(), 7);
}

#[test]
fn test_nan_token_is_a_number() {
    let record = parse("M0001 S1 NaN 0.1").unwrap().unwrap();
    assert!(record.scores()[0].is_nan());
    assert_eq!(record.scores()[1], 0.1);
}

#[test]
fn test_read_records_ragged_rows() {
    let text = "# header\nM0001\tS1\t0.28\t0.31\nM0001\tS2\t0.40\n\nM0002\tS1\t0.1\t0.2\t0.3\n";
    let batch = read_records(Cursor::new(text), &PathBuf::from("mem"), MalformedPolicy::Fail).unwrap();
    assert_eq!(batch.records.len(), 3);
    assert_eq!(batch.skipped, 0);
    assert_eq!(batch.records[2].scores().len(), 3);
}

#[test]
fn test_read_records_fail_reports_line() {
    let text = "M0001 S1 0.2\nM0002 S1\n";
    let err = read_records(Cursor::new(text), &PathBuf::from("scores.txt"), MalformedPolicy::Fail)
        .unwrap_err();
    match err {
        InputError::Malformed { path, source } => {
            assert_eq!(path, PathBuf::from("scores.txt"));
            assert_eq!(source.line(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_read_records_skip_counts() {
    let text = "M0001 S1 0.2\nM0002 S1\nM0003 S1 x\nM0004 S2 0.9\n";
    let batch = read_records(Cursor::new(text), &PathBuf::from("mem"), MalformedPolicy::Skip).unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.skipped, 2);
    assert_eq!(batch.records[1].entity_id(), "M0004");
}

#[test]
fn test_invalid_utf8_line_follows_policy() {
    let bytes: &[u8] = b"M1 S1 0.1\nM2 S1 \xff\xfe 0.2\nM3 S1 0.3\n";

    let batch = read_records(Cursor::new(bytes), &PathBuf::from("mem"), MalformedPolicy::Skip)
        .unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.skipped, 1);
    assert_eq!(batch.records[1].entity_id(), "M3");

    let err = read_records(Cursor::new(bytes), &PathBuf::from("mem"), MalformedPolicy::Fail)
        .unwrap_err();
    match err {
        InputError::Malformed { source, .. } => {
            assert_eq!(source, MalformedRecord::InvalidUtf8 { line: 2 });
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_leading_bom_stripped() {
    let text = "\u{feff}M0001 S1 0.28\nM0001 S2 0.45\n";
    let batch = read_records(Cursor::new(text), &PathBuf::from("mem"), MalformedPolicy::Fail)
        .unwrap();
    assert_eq!(batch.records[0].entity_id(), "M0001");
    assert_eq!(batch.records[1].entity_id(), "M0001");
}

#[test]
fn test_decode_line_keeps_bom_after_first_line() {
    assert_eq!(decode_line("\u{feff}M1".as_bytes(), 1), Ok("M1"));
    assert_eq!(decode_line("\u{feff}M1".as_bytes(), 2), Ok("\u{feff}M1"));
    assert_eq!(
        decode_line(b"\xff", 4),
        Err(MalformedRecord::InvalidUtf8 { line: 4 })
    );
}
