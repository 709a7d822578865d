use std::fmt;

use serde::Serialize;

use crate::pipeline::MetricError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetricKind {
    #[serde(rename = "MMPMR")]
    Mmpmr,
    #[serde(rename = "RMMR")]
    Rmmr,
    #[serde(rename = "MAP")]
    Map,
    #[serde(rename = "FMR")]
    Fmr,
    #[serde(rename = "FNMR")]
    Fnmr,
}

impl MetricKind {
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Mmpmr => "MMPMR",
            MetricKind::Rmmr => "RMMR",
            MetricKind::Map => "MAP",
            MetricKind::Fmr => "FMR",
            MetricKind::Fnmr => "FNMR",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One metric value at one threshold. `threshold` is `None` for threshold-free MAP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricResult {
    pub metric: MetricKind,
    pub threshold: Option<f64>,
    pub value: f64,
    pub sample_size: usize,
}

impl MetricResult {
    /// `hits / total`; an empty sample is an error, never 0.
    pub fn fraction(
        metric: MetricKind,
        threshold: Option<f64>,
        hits: usize,
        total: usize,
    ) -> Result<Self, MetricError> {
        Self::mean(metric, threshold, hits as f64, total)
    }

    pub fn mean(
        metric: MetricKind,
        threshold: Option<f64>,
        sum: f64,
        total: usize,
    ) -> Result<Self, MetricError> {
        if total == 0 {
            return Err(MetricError::EmptyPopulation { metric });
        }
        Ok(Self {
            metric,
            threshold,
            value: sum / total as f64,
            sample_size: total,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/metric.rs"]
mod tests;
