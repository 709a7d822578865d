use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::polarity::Polarity;

/// One probe score slot of a morph: the component subject and the 1-based
/// position of the score among that subject's scores for the morph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProbeId {
    pub subject: String,
    pub ordinal: u32,
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.subject, self.ordinal)
    }
}

/// All probe scores of one morph. Probe counts may differ between morphs and
/// between the subjects of one morph.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphEntry {
    pub morph_id: String,
    pub subjects: BTreeSet<String>,
    pub probe_scores: BTreeMap<ProbeId, f64>,
}

impl MorphEntry {
    pub fn new(morph_id: impl Into<String>) -> Self {
        Self {
            morph_id: morph_id.into(),
            subjects: BTreeSet::new(),
            probe_scores: BTreeMap::new(),
        }
    }

    /// Appends scores for `subject`, continuing its ordinals.
    pub fn push_scores(&mut self, subject: &str, scores: &[f64]) {
        if scores.is_empty() {
            return;
        }
        let existing = self.subject_scores(subject).count() as u32;
        self.subjects.insert(subject.to_string());
        for (offset, &score) in scores.iter().enumerate() {
            let id = ProbeId {
                subject: subject.to_string(),
                ordinal: existing + offset as u32 + 1,
            };
            self.probe_scores.insert(id, score);
        }
    }

    pub fn n_probes(&self) -> usize {
        self.probe_scores.len()
    }

    pub fn subject_scores<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.probe_scores
            .iter()
            .filter(move |(id, _)| id.subject == subject)
            .map(|(_, &score)| score)
    }

    /// Most match-favoring score for `subject`; NaN when every score is NaN.
    pub fn best_score(&self, subject: &str, polarity: Polarity) -> Option<f64> {
        let mut scores = self.subject_scores(subject);
        let first = scores.next()?;
        Some(scores.fold(first, |acc, s| polarity.best(acc, s)))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/morph.rs"]
mod tests;
