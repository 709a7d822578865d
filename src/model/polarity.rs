use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::config::ConfigError;

/// Direction in which a comparison score indicates a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Higher is more alike; match iff `score >= threshold`.
    Similarity,
    /// Lower is more alike; match iff `score <= threshold`.
    Dissimilarity,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Similarity => "similarity",
            Polarity::Dissimilarity => "dissimilarity",
        }
    }

    /// True when `a` is strictly more match-favoring than `b`. NaN is never better.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Polarity::Similarity => a > b,
            Polarity::Dissimilarity => a < b,
        }
    }

    /// The more match-favoring of two scores; a NaN loses to any number.
    pub fn best(self, a: f64, b: f64) -> f64 {
        if a.is_nan() || self.is_better(b, a) {
            b
        } else {
            a
        }
    }
}

/// Match decision, inclusive at the threshold on the match side.
///
/// NaN scores never match: every comparison against NaN is false.
pub fn decide(score: f64, threshold: f64, polarity: Polarity) -> bool {
    match polarity {
        Polarity::Similarity => score >= threshold,
        Polarity::Dissimilarity => score <= threshold,
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Polarity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "similarity" => Ok(Polarity::Similarity),
            "dissimilarity" => Ok(Polarity::Dissimilarity),
            _ => Err(ConfigError::InvalidPolarity(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/polarity.rs"]
mod tests;
