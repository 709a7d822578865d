use std::collections::BTreeMap;

use crate::model::polarity::Polarity;
use crate::model::record::ScoreRecord;

/// Per-subject comparison scores (mated and non-mated), sorted ascending.
/// NaN scores are left out and counted.
#[derive(Debug, Clone, Default)]
pub struct SubjectDistribution {
    sorted: BTreeMap<String, Vec<f64>>,
    dropped_nan: usize,
}

impl SubjectDistribution {
    /// Every score of a record joins the distribution of its first column.
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        let mut sorted: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut dropped_nan = 0usize;
        for record in records {
            let scores = sorted.entry(record.entity_id().to_string()).or_default();
            for &score in record.scores() {
                if score.is_nan() {
                    dropped_nan += 1;
                } else {
                    scores.push(score);
                }
            }
        }
        sorted.retain(|_, scores| !scores.is_empty());
        for scores in sorted.values_mut() {
            scores.sort_by(f64::total_cmp);
        }
        Self {
            sorted,
            dropped_nan,
        }
    }

    pub fn scores(&self, subject: &str) -> Option<&[f64]> {
        self.sorted.get(subject).map(Vec::as_slice)
    }

    pub fn n_subjects(&self) -> usize {
        self.sorted.len()
    }

    pub fn n_scores(&self) -> usize {
        self.sorted.values().map(Vec::len).sum()
    }

    pub fn dropped_nan(&self) -> usize {
        self.dropped_nan
    }

    /// How many of the subject's scores are strictly more match-favoring than `score`.
    /// `None` if the subject has no scores.
    pub fn count_better(&self, subject: &str, score: f64, polarity: Polarity) -> Option<usize> {
        let scores = self.scores(subject)?;
        let count = match polarity {
            Polarity::Dissimilarity => scores.partition_point(|&d| d < score),
            Polarity::Similarity => scores.len() - scores.partition_point(|&d| d <= score),
        };
        Some(count)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/distribution.rs"]
mod tests;
