use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::metric::MetricKind;
use crate::model::polarity::Polarity;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid polarity {0:?} (use similarity|dissimilarity)")]
    InvalidPolarity(String),
    #[error("invalid reduction policy {0:?} (use any|ratio|rank)")]
    InvalidReductionPolicy(String),
    #[error("invalid ratio denominator {0:?} (use probes|subjects)")]
    InvalidRatioDenominator(String),
    #[error("invalid MAP mode {0:?} (use rank|threshold)")]
    InvalidMapMode(String),
    #[error("invalid malformed-record policy {0:?} (use fail|skip)")]
    InvalidMalformedPolicy(String),
    #[error("invalid threshold sweep: {0}")]
    InvalidSweep(String),
    #[error("threshold must be finite, got {0}")]
    InvalidThreshold(f64),
    #[error("no reduction policy selected")]
    NoPolicies,
    #[error("RANK reduction requires a subject score distribution (--distribution)")]
    RankWithoutDistribution,
}

/// Per-morph reduction; each one feeds exactly one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionPolicy {
    Any,
    Ratio,
    Rank,
}

impl ReductionPolicy {
    pub fn metric(self) -> MetricKind {
        match self {
            ReductionPolicy::Any => MetricKind::Mmpmr,
            ReductionPolicy::Ratio => MetricKind::Rmmr,
            ReductionPolicy::Rank => MetricKind::Map,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReductionPolicy::Any => "any",
            ReductionPolicy::Ratio => "ratio",
            ReductionPolicy::Rank => "rank",
        }
    }
}

impl fmt::Display for ReductionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReductionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(ReductionPolicy::Any),
            "ratio" => Ok(ReductionPolicy::Ratio),
            "rank" => Ok(ReductionPolicy::Rank),
            _ => Err(ConfigError::InvalidReductionPolicy(s.to_string())),
        }
    }
}

/// What the RATIO reduction divides by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioDenominator {
    /// Matched probe scores over all probe scores of the morph.
    Probes,
    /// Subjects with at least one matching probe over all component subjects.
    Subjects,
}

impl FromStr for RatioDenominator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "probes" => Ok(RatioDenominator::Probes),
            "subjects" => Ok(RatioDenominator::Subjects),
            _ => Err(ConfigError::InvalidRatioDenominator(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    /// Mean reciprocal rank, independent of any threshold.
    Rank,
    /// Reciprocal rank only for subjects whose best score matches at the threshold.
    Threshold,
}

impl FromStr for MapMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rank" => Ok(MapMode::Rank),
            "threshold" => Ok(MapMode::Threshold),
            _ => Err(ConfigError::InvalidMapMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    Fail,
    Skip,
}

impl FromStr for MalformedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(MalformedPolicy::Fail),
            "skip" => Ok(MalformedPolicy::Skip),
            _ => Err(ConfigError::InvalidMalformedPolicy(s.to_string())),
        }
    }
}

/// Upper bound on the number of sweep points.
pub const MAX_SWEEP_STEPS: usize = 100_000;

/// Explicit, ordered threshold sequence. Order is kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ThresholdSweep(Vec<f64>);

impl ThresholdSweep {
    pub fn new(thresholds: Vec<f64>) -> Result<Self, ConfigError> {
        if thresholds.is_empty() {
            return Err(ConfigError::InvalidSweep("no thresholds".to_string()));
        }
        if thresholds.len() > MAX_SWEEP_STEPS {
            return Err(ConfigError::InvalidSweep(format!(
                "{} thresholds exceed the limit of {MAX_SWEEP_STEPS}",
                thresholds.len()
            )));
        }
        if let Some(bad) = thresholds.iter().find(|t| !t.is_finite()) {
            return Err(ConfigError::InvalidSweep(format!(
                "non-finite threshold {bad}"
            )));
        }
        Ok(Self(thresholds))
    }

    /// `steps` evenly spaced thresholds from `start` to `stop`, both inclusive.
    pub fn linspace(start: f64, stop: f64, steps: usize) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::InvalidSweep("steps must be >= 1".to_string()));
        }
        if steps > MAX_SWEEP_STEPS {
            return Err(ConfigError::InvalidSweep(format!(
                "{steps} steps exceed the limit of {MAX_SWEEP_STEPS}"
            )));
        }
        if steps == 1 {
            return Self::new(vec![start]);
        }
        let step = (stop - start) / (steps - 1) as f64;
        let mut thresholds = Vec::with_capacity(steps);
        for i in 0..steps {
            if i == steps - 1 {
                thresholds.push(stop);
            } else {
                thresholds.push(start + step * i as f64);
            }
        }
        Self::new(thresholds)
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Vec<f64>> for ThresholdSweep {
    type Error = ConfigError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ThresholdSweep> for Vec<f64> {
    fn from(value: ThresholdSweep) -> Self {
        value.0
    }
}

impl FromStr for ThresholdSweep {
    type Err = ConfigError;

    /// Accepts `start:stop:steps` or a comma-separated list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |tok: &str| -> Result<f64, ConfigError> {
            tok.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidSweep(format!("not a number: {tok:?}")))
        };
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            &[start, stop, steps] => {
                let steps = steps.trim().parse::<usize>().map_err(|_| {
                    ConfigError::InvalidSweep(format!("invalid step count: {steps:?}"))
                })?;
                Self::linspace(parse(start)?, parse(stop)?, steps)
            }
            &[list] => {
                let thresholds = list
                    .split(',')
                    .filter(|tok| !tok.trim().is_empty())
                    .map(parse)
                    .collect::<Result<Vec<_>, _>>()?;
                Self::new(thresholds)
            }
            _ => Err(ConfigError::InvalidSweep(format!(
                "expected start:stop:steps or a comma list, got {s:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub polarity: Polarity,
    pub policies: Vec<ReductionPolicy>,
    pub ratio_denominator: RatioDenominator,
    pub map_mode: MapMode,
    pub threshold_sweep: Option<ThresholdSweep>,
    pub malformed: MalformedPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            polarity: Polarity::Dissimilarity,
            policies: vec![ReductionPolicy::Any, ReductionPolicy::Ratio],
            ratio_denominator: RatioDenominator::Probes,
            map_mode: MapMode::Rank,
            threshold_sweep: None,
            malformed: MalformedPolicy::Fail,
        }
    }
}

impl EngineConfig {
    pub fn uses(&self, policy: ReductionPolicy) -> bool {
        self.policies.contains(&policy)
    }

    /// Policies deduplicated, in ANY, RATIO, RANK order.
    pub fn ordered_policies(&self) -> Vec<ReductionPolicy> {
        let mut out = self.policies.clone();
        out.sort();
        out.dedup();
        out
    }

    pub fn validate(&self, has_distribution: bool) -> Result<(), ConfigError> {
        if self.policies.is_empty() {
            return Err(ConfigError::NoPolicies);
        }
        if self.uses(ReductionPolicy::Rank) && !has_distribution {
            return Err(ConfigError::RankWithoutDistribution);
        }
        Ok(())
    }
}

pub fn check_threshold(threshold: f64) -> Result<f64, ConfigError> {
    if threshold.is_finite() {
        Ok(threshold)
    } else {
        Err(ConfigError::InvalidThreshold(threshold))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/config.rs"]
mod tests;
