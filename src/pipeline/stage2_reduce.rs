use crate::model::config::RatioDenominator;
use crate::model::distribution::SubjectDistribution;
use crate::model::morph::MorphEntry;
use crate::model::polarity::{Polarity, decide};
use crate::pipeline::MetricError;

/// Position of a morph's best score for one component subject within that
/// subject's comparison score distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRank {
    pub subject: String,
    pub best_score: f64,
    /// 1-based; `None` when the morph's score for the subject is NaN.
    pub rank: Option<usize>,
}

impl SubjectRank {
    pub fn reciprocal(&self) -> f64 {
        self.rank.map_or(0.0, |rank| 1.0 / rank as f64)
    }
}

pub fn matched_probes(entry: &MorphEntry, threshold: f64, polarity: Polarity) -> usize {
    entry
        .probe_scores
        .values()
        .filter(|&&score| decide(score, threshold, polarity))
        .count()
}

/// ANY: at least one probe score of the morph matches.
pub fn reduce_any(entry: &MorphEntry, threshold: f64, polarity: Polarity) -> bool {
    entry
        .probe_scores
        .values()
        .any(|&score| decide(score, threshold, polarity))
}

/// RATIO: fraction in `[0, 1]` of matching probes or matching subjects.
pub fn reduce_ratio(
    entry: &MorphEntry,
    threshold: f64,
    polarity: Polarity,
    denominator: RatioDenominator,
) -> f64 {
    match denominator {
        RatioDenominator::Probes => {
            let total = entry.n_probes();
            if total == 0 {
                return 0.0;
            }
            matched_probes(entry, threshold, polarity) as f64 / total as f64
        }
        RatioDenominator::Subjects => {
            let total = entry.subjects.len();
            if total == 0 {
                return 0.0;
            }
            let matched = entry
                .subjects
                .iter()
                .filter(|subject| {
                    entry
                        .subject_scores(subject)
                        .any(|score| decide(score, threshold, polarity))
                })
                .count();
            matched as f64 / total as f64
        }
    }
}

/// Ranks the morph's best score for every component subject.
pub fn rank_subjects(
    entry: &MorphEntry,
    distribution: &SubjectDistribution,
    polarity: Polarity,
) -> Result<Vec<SubjectRank>, MetricError> {
    let mut ranks = Vec::with_capacity(entry.subjects.len());
    for subject in &entry.subjects {
        let best_score = entry
            .best_score(subject, polarity)
            .unwrap_or(f64::NAN);
        let better = distribution
            .count_better(subject, best_score, polarity)
            .ok_or_else(|| MetricError::MissingSubjectScores {
                morph_id: entry.morph_id.clone(),
                subject: subject.clone(),
            })?;
        let rank = if best_score.is_nan() {
            None
        } else {
            Some(better + 1)
        };
        ranks.push(SubjectRank {
            subject: subject.clone(),
            best_score,
            rank,
        });
    }
    Ok(ranks)
}

/// RANK: mean reciprocal rank over component subjects. With a gate, subjects
/// whose best score does not match at the threshold contribute zero.
pub fn reduce_rank(ranks: &[SubjectRank], gate: Option<(f64, Polarity)>) -> f64 {
    if ranks.is_empty() {
        return 0.0;
    }
    let sum: f64 = ranks
        .iter()
        .map(|rank| match gate {
            Some((threshold, polarity)) if !decide(rank.best_score, threshold, polarity) => 0.0,
            _ => rank.reciprocal(),
        })
        .sum();
    sum / ranks.len() as f64
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_reduce.rs"]
mod tests;
