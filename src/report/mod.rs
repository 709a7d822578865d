use serde::Serialize;

use crate::model::config::EngineConfig;
use crate::model::metric::{MetricKind, MetricResult};

pub mod json;
pub mod text;

#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub scores: String,
    pub distribution: Option<String>,
    pub mated: Option<String>,
    pub non_mated: Option<String>,
    pub n_records: usize,
    pub skipped_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopulationSummary {
    pub n_morphs: usize,
    pub n_subjects: usize,
    pub n_probes: usize,
    pub min_probes: Option<usize>,
    pub max_probes: Option<usize>,
    pub n_any_match: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: String,
    pub version: String,
    pub label: String,
    pub input: InputSummary,
    pub config: EngineConfig,
    pub threshold: f64,
    pub target_fmr: Option<f64>,
    pub population: PopulationSummary,
    pub metrics: Vec<MetricResult>,
    pub sweep_points: usize,
}

impl SummaryData {
    pub fn metric(&self, kind: MetricKind) -> Option<&MetricResult> {
        find_metric(&self.metrics, kind)
    }
}

pub fn find_metric(results: &[MetricResult], kind: MetricKind) -> Option<&MetricResult> {
    results.iter().find(|r| r.metric == kind)
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

pub fn format_threshold(threshold: Option<f64>) -> String {
    match threshold {
        Some(t) => format_f64_6(t),
        None => "NA".to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
