use thiserror::Error;

use crate::model::metric::MetricKind;

pub mod stage1_aggregate;
pub mod stage2_reduce;
pub mod stage3_metrics;
pub mod stage4_report;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("{metric}: population is empty")]
    EmptyPopulation { metric: MetricKind },
    #[error("morph {morph_id}: no distribution scores for component subject {subject}")]
    MissingSubjectScores { morph_id: String, subject: String },
    #[error("MAP requested but no subject score distribution was supplied")]
    MissingDistribution,
    #[error("threshold must be finite, got {0}")]
    InvalidThreshold(f64),
}
