use std::io::BufRead;
use std::path::Path;

use thiserror::Error;

use crate::input::InputError;
use crate::model::config::MalformedPolicy;
use crate::model::record::ScoreRecord;

pub const COMMENT_PREFIX: char = '#';
const BOM: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecord {
    #[error("line {line}: expected at least 3 fields, found {found}")]
    TooFewFields { line: usize, found: usize },
    #[error("line {line}: score field {field} is not a number: {token:?}")]
    NonNumeric {
        line: usize,
        field: usize,
        token: String,
    },
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },
}

impl MalformedRecord {
    pub fn line(&self) -> usize {
        match self {
            MalformedRecord::TooFewFields { line, .. } => *line,
            MalformedRecord::NonNumeric { line, .. } => *line,
            MalformedRecord::InvalidUtf8 { line } => *line,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub records: Vec<ScoreRecord>,
    pub skipped: usize,
}

/// Parses `<entity> <counterpart> <score_1> ... <score_N>`.
///
/// Blank and `#` lines give `Ok(None)`. `line_no` is 1-based and only used
/// for error context.
pub fn parse_record_line(line: &str, line_no: usize) -> Result<Option<ScoreRecord>, MalformedRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(MalformedRecord::TooFewFields {
            line: line_no,
            found: tokens.len(),
        });
    }

    let mut scores = Vec::with_capacity(tokens.len() - 2);
    for (idx, token) in tokens[2..].iter().enumerate() {
        let score = token
            .parse::<f64>()
            .map_err(|_| MalformedRecord::NonNumeric {
                line: line_no,
                field: idx + 3,
                token: token.to_string(),
            })?;
        scores.push(score);
    }

    Ok(ScoreRecord::new(tokens[0], tokens[1], scores))
}

/// Decodes one raw line. A byte order mark is dropped from line 1.
pub fn decode_line(bytes: &[u8], line_no: usize) -> Result<&str, MalformedRecord> {
    let line =
        std::str::from_utf8(bytes).map_err(|_| MalformedRecord::InvalidUtf8 { line: line_no })?;
    if line_no == 1 {
        Ok(line.strip_prefix(BOM).unwrap_or(line))
    } else {
        Ok(line)
    }
}

pub fn read_records<R: BufRead>(
    mut reader: R,
    path: &Path,
    policy: MalformedPolicy,
) -> Result<RecordBatch, InputError> {
    let mut buf = Vec::new();
    let mut batch = RecordBatch::default();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| InputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let parsed =
            decode_line(&buf, line_no).and_then(|line| parse_record_line(line, line_no));
        match parsed {
            Ok(Some(record)) => batch.records.push(record),
            Ok(None) => {}
            Err(err) => match policy {
                MalformedPolicy::Fail => {
                    return Err(InputError::Malformed {
                        path: path.to_path_buf(),
                        source: err,
                    });
                }
                MalformedPolicy::Skip => {
                    tracing::warn!(
                        path = %path.display(),
                        line = err.line(),
                        "skipping malformed record: {err}"
                    );
                    batch.skipped += 1;
                }
            },
        }
    }

    Ok(batch)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/records.rs"]
mod tests;
