use std::io::BufRead;
use std::path::Path;

use crate::input::InputError;
use crate::input::records::{COMMENT_PREFIX, decode_line};

/// Reads a flat list of bona fide comparison scores: any number of
/// whitespace-separated numbers per line, `#` comments allowed.
pub fn read_score_list<R: BufRead>(mut reader: R, path: &Path) -> Result<Vec<f64>, InputError> {
    let mut buf = Vec::new();
    let mut scores = Vec::new();
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
        let line = decode_line(&buf, line_no)
            .map_err(|_| InputError::InvalidScore {
                path: path.to_path_buf(),
                line: line_no,
                token: String::from_utf8_lossy(&buf).trim().to_string(),
            })?
            .trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        for token in line.split_whitespace() {
            let score = token.parse::<f64>().map_err(|_| InputError::InvalidScore {
                path: path.to_path_buf(),
                line: line_no,
                token: token.to_string(),
            })?;
            scores.push(score);
        }
    }

    Ok(scores)
}
