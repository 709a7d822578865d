use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub mod config;
pub mod records;
pub mod scores;

use records::{MalformedRecord, RecordBatch, read_records};
use scores::read_score_list;

use crate::model::config::MalformedPolicy;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: MalformedRecord,
    },
    #[error("invalid score in {} at line {line}: {token:?}", .path.display())]
    InvalidScore {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Opens a text file, gunzipping it when the name ends in `.gz`.
pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn load_score_records(path: &Path, policy: MalformedPolicy) -> Result<RecordBatch, InputError> {
    let reader = open_maybe_gz(path)?;
    let batch = read_records(reader, path, policy)?;
    tracing::info!(
        path = %path.display(),
        records = batch.records.len(),
        skipped = batch.skipped,
        "loaded score records"
    );
    Ok(batch)
}

pub fn load_score_list(path: &Path) -> Result<Vec<f64>, InputError> {
    let reader = open_maybe_gz(path)?;
    let scores = read_score_list(reader, path)?;
    tracing::info!(path = %path.display(), scores = scores.len(), "loaded bona fide scores");
    Ok(scores)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
