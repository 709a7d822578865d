use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::model::config::{EngineConfig, MapMode, ReductionPolicy};
use crate::model::distribution::SubjectDistribution;
use crate::model::metric::{MetricKind, MetricResult};
use crate::model::morph::MorphEntry;
use crate::model::polarity::{Polarity, decide};
use crate::pipeline::MetricError;
use crate::pipeline::stage2_reduce::{
    SubjectRank, matched_probes, rank_subjects, reduce_any, reduce_rank, reduce_ratio,
};

/// Bona fide comparison scores used to report FMR / FNMR at the given threshold.
#[derive(Debug, Clone, Default)]
pub struct BonaFideScores {
    pub mated: Vec<f64>,
    pub non_mated: Vec<f64>,
}

/// Per-morph match record at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MorphRecord {
    pub morph_id: String,
    pub subjects: Vec<String>,
    pub n_probes: usize,
    pub n_matched: usize,
    pub any_match: bool,
    pub ratio: f64,
    pub map: Option<f64>,
}

pub struct MetricEngine<'a> {
    morphs: &'a BTreeMap<String, MorphEntry>,
    config: &'a EngineConfig,
    ranks: Option<BTreeMap<String, Vec<SubjectRank>>>,
    bona_fide: Option<&'a BonaFideScores>,
}

impl<'a> MetricEngine<'a> {
    /// Subject ranks are computed up front when RANK is configured; they do
    /// not depend on the threshold.
    pub fn new(
        morphs: &'a BTreeMap<String, MorphEntry>,
        config: &'a EngineConfig,
        distribution: Option<&SubjectDistribution>,
    ) -> Result<Self, MetricError> {
        let ranks = match distribution {
            Some(distribution) if config.uses(ReductionPolicy::Rank) => {
                let mut ranks = BTreeMap::new();
                for (morph_id, entry) in morphs {
                    let subject_ranks = rank_subjects(entry, distribution, config.polarity)?;
                    ranks.insert(morph_id.clone(), subject_ranks);
                }
                Some(ranks)
            }
            None if config.uses(ReductionPolicy::Rank) => {
                return Err(MetricError::MissingDistribution);
            }
            _ => None,
        };
        Ok(Self {
            morphs,
            config,
            ranks,
            bona_fide: None,
        })
    }

    pub fn with_bona_fide(mut self, scores: &'a BonaFideScores) -> Self {
        self.bona_fide = Some(scores);
        self
    }

    fn polarity(&self) -> Polarity {
        self.config.polarity
    }

    fn population(&self, metric: MetricKind) -> Result<usize, MetricError> {
        if self.morphs.is_empty() {
            Err(MetricError::EmptyPopulation { metric })
        } else {
            Ok(self.morphs.len())
        }
    }

    pub fn mmpmr(&self, threshold: f64) -> Result<MetricResult, MetricError> {
        let threshold = finite(threshold)?;
        let n = self.population(MetricKind::Mmpmr)?;
        let hits = self
            .morphs
            .values()
            .filter(|entry| reduce_any(entry, threshold, self.polarity()))
            .count();
        MetricResult::fraction(MetricKind::Mmpmr, Some(threshold), hits, n)
    }

    pub fn rmmr(&self, threshold: f64) -> Result<MetricResult, MetricError> {
        let threshold = finite(threshold)?;
        let n = self.population(MetricKind::Rmmr)?;
        let sum: f64 = self
            .morphs
            .values()
            .map(|entry| {
                reduce_ratio(
                    entry,
                    threshold,
                    self.polarity(),
                    self.config.ratio_denominator,
                )
            })
            .sum();
        MetricResult::mean(MetricKind::Rmmr, Some(threshold), sum, n)
    }

    /// In rank mode the threshold is ignored and the result carries none.
    pub fn map(&self, threshold: f64) -> Result<MetricResult, MetricError> {
        let n = self.population(MetricKind::Map)?;
        let ranks = self.ranks.as_ref().ok_or(MetricError::MissingDistribution)?;
        let gate = match self.config.map_mode {
            MapMode::Rank => None,
            MapMode::Threshold => Some((finite(threshold)?, self.polarity())),
        };
        let sum: f64 = ranks
            .values()
            .map(|subject_ranks| reduce_rank(subject_ranks, gate))
            .sum();
        MetricResult::mean(MetricKind::Map, gate.map(|(t, _)| t), sum, n)
    }

    /// Fraction of bona fide mated comparisons that do not match.
    pub fn fnmr(&self, threshold: f64) -> Result<MetricResult, MetricError> {
        let threshold = finite(threshold)?;
        let mated = self.bona_fide.map(|b| b.mated.as_slice()).unwrap_or(&[]);
        if mated.is_empty() {
            return Err(MetricError::EmptyPopulation {
                metric: MetricKind::Fnmr,
            });
        }
        let misses = mated
            .iter()
            .filter(|&&score| !decide(score, threshold, self.polarity()))
            .count();
        MetricResult::fraction(MetricKind::Fnmr, Some(threshold), misses, mated.len())
    }

    /// Fraction of bona fide non-mated comparisons that match.
    pub fn fmr(&self, threshold: f64) -> Result<MetricResult, MetricError> {
        let threshold = finite(threshold)?;
        let non_mated = self
            .bona_fide
            .map(|b| b.non_mated.as_slice())
            .unwrap_or(&[]);
        if non_mated.is_empty() {
            return Err(MetricError::EmptyPopulation {
                metric: MetricKind::Fmr,
            });
        }
        let hits = non_mated
            .iter()
            .filter(|&&score| decide(score, threshold, self.polarity()))
            .count();
        MetricResult::fraction(MetricKind::Fmr, Some(threshold), hits, non_mated.len())
    }

    /// Every configured metric at `threshold`, in ANY, RATIO, RANK order,
    /// followed by FNMR and FMR when bona fide scores are present.
    pub fn evaluate(&self, threshold: f64) -> Result<Vec<MetricResult>, MetricError> {
        self.evaluate_inner(threshold, true)
    }

    fn evaluate_inner(
        &self,
        threshold: f64,
        include_threshold_free: bool,
    ) -> Result<Vec<MetricResult>, MetricError> {
        let mut out = Vec::new();
        for policy in self.config.ordered_policies() {
            match policy {
                ReductionPolicy::Any => out.push(self.mmpmr(threshold)?),
                ReductionPolicy::Ratio => out.push(self.rmmr(threshold)?),
                ReductionPolicy::Rank => {
                    if include_threshold_free || self.config.map_mode == MapMode::Threshold {
                        out.push(self.map(threshold)?);
                    }
                }
            }
        }
        if let Some(bona_fide) = self.bona_fide {
            if !bona_fide.mated.is_empty() {
                out.push(self.fnmr(threshold)?);
            }
            if !bona_fide.non_mated.is_empty() {
                out.push(self.fmr(threshold)?);
            }
        }
        Ok(out)
    }

    /// Thresholded metrics at each sweep point, in input order. A
    /// threshold-free MAP is reported once, ahead of the sweep rows.
    pub fn sweep(&self, thresholds: &[f64]) -> Result<Vec<MetricResult>, MetricError> {
        let Some(&first) = thresholds.first() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        if self.config.uses(ReductionPolicy::Rank) && self.config.map_mode == MapMode::Rank {
            out.push(self.map(first)?);
        }
        let points = thresholds
            .par_iter()
            .map(|&threshold| self.evaluate_inner(threshold, false))
            .collect::<Result<Vec<_>, _>>()?;
        out.extend(points.into_iter().flatten());
        Ok(out)
    }

    pub fn morph_records(&self, threshold: f64) -> Result<Vec<MorphRecord>, MetricError> {
        let threshold = finite(threshold)?;
        let gate = match self.config.map_mode {
            MapMode::Rank => None,
            MapMode::Threshold => Some((threshold, self.polarity())),
        };
        let records = self
            .morphs
            .values()
            .map(|entry| MorphRecord {
                morph_id: entry.morph_id.clone(),
                subjects: entry.subjects.iter().cloned().collect(),
                n_probes: entry.n_probes(),
                n_matched: matched_probes(entry, threshold, self.polarity()),
                any_match: reduce_any(entry, threshold, self.polarity()),
                ratio: reduce_ratio(
                    entry,
                    threshold,
                    self.polarity(),
                    self.config.ratio_denominator,
                ),
                map: self
                    .ranks
                    .as_ref()
                    .and_then(|ranks| ranks.get(&entry.morph_id))
                    .map(|subject_ranks| reduce_rank(subject_ranks, gate)),
            })
            .collect();
        Ok(records)
    }
}

fn finite(threshold: f64) -> Result<f64, MetricError> {
    if threshold.is_finite() {
        Ok(threshold)
    } else {
        Err(MetricError::InvalidThreshold(threshold))
    }
}

#[derive(Debug, Clone)]
pub struct Stage3Inputs<'a> {
    pub morphs: &'a BTreeMap<String, MorphEntry>,
    pub config: &'a EngineConfig,
    pub threshold: f64,
    pub distribution: Option<&'a SubjectDistribution>,
    pub bona_fide: Option<&'a BonaFideScores>,
}

#[derive(Debug, Clone)]
pub struct Stage3Output {
    pub operating: Vec<MetricResult>,
    pub sweep: Vec<MetricResult>,
    pub morph_records: Vec<MorphRecord>,
}

pub fn run_stage3(inputs: &Stage3Inputs<'_>) -> Result<Stage3Output, MetricError> {
    let mut engine = MetricEngine::new(inputs.morphs, inputs.config, inputs.distribution)?;
    if let Some(bona_fide) = inputs.bona_fide {
        engine = engine.with_bona_fide(bona_fide);
    }

    let operating = engine.evaluate(inputs.threshold)?;
    let sweep = match &inputs.config.threshold_sweep {
        Some(sweep) => engine.sweep(sweep.thresholds())?,
        None => Vec::new(),
    };
    let morph_records = engine.morph_records(inputs.threshold)?;

    for result in &operating {
        tracing::info!(
            metric = %result.metric,
            value = result.value,
            sample_size = result.sample_size,
            "operating point"
        );
    }

    Ok(Stage3Output {
        operating,
        sweep,
        morph_records,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_metrics.rs"]
mod tests;
