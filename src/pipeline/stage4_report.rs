use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::config::EngineConfig;
use crate::model::metric::MetricResult;
use crate::pipeline::stage1_aggregate::Stage1Output;
use crate::pipeline::stage3_metrics::{MorphRecord, Stage3Output};
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{InputSummary, PopulationSummary, SummaryData, format_f64_6, format_threshold};

#[derive(Debug, Clone)]
pub struct Stage4Input<'a> {
    pub label: String,
    pub scores_path: String,
    pub distribution_path: Option<String>,
    pub mated_path: Option<String>,
    pub non_mated_path: Option<String>,
    pub skipped_records: usize,

    pub config: &'a EngineConfig,
    pub threshold: f64,
    pub target_fmr: Option<f64>,

    pub stage1: &'a Stage1Output,
    pub stage3: &'a Stage3Output,

    pub tool_name: String,
    pub tool_version: String,
}

pub fn write_reports(input: &Stage4Input<'_>, out_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    write_metrics_tsv(&input.stage3.operating, &out_dir.join("metrics.tsv"))?;
    if !input.stage3.sweep.is_empty() {
        write_metrics_tsv(&input.stage3.sweep, &out_dir.join("sweep.tsv"))?;
    }
    write_morphs_tsv(&input.stage3.morph_records, &out_dir.join("morphs.tsv"))?;

    let summary = build_summary(input);
    let json = render_summary_json(&summary)?;
    write_text(&out_dir.join("summary.json"), &json)?;

    let report = render_report_text(&summary);
    write_text(&out_dir.join("report.txt"), &report)?;

    tracing::info!(out_dir = %out_dir.display(), "reports written");
    Ok(())
}

fn write_metrics_tsv(results: &[MetricResult], path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = ["metric", "threshold", "value", "sample_size"];
    writeln!(w, "{}", header.join("\t"))?;
    for result in results {
        let row = [
            result.metric.name().to_string(),
            format_threshold(result.threshold),
            format_f64_6(result.value),
            result.sample_size.to_string(),
        ];
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()
}

fn write_morphs_tsv(records: &[MorphRecord], path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = [
        "morph_id",
        "subjects",
        "n_probes",
        "n_matched",
        "any_match",
        "ratio",
        "map",
    ];
    writeln!(w, "{}", header.join("\t"))?;
    for record in records {
        let row = [
            record.morph_id.clone(),
            record.subjects.join(","),
            record.n_probes.to_string(),
            record.n_matched.to_string(),
            record.any_match.to_string(),
            format_f64_6(record.ratio),
            format_threshold(record.map),
        ];
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()
}

pub fn build_summary(input: &Stage4Input<'_>) -> SummaryData {
    let subjects: BTreeSet<&str> = input
        .stage1
        .morphs
        .values()
        .flat_map(|entry| entry.subjects.iter().map(String::as_str))
        .collect();
    let n_any_match = input
        .stage3
        .morph_records
        .iter()
        .filter(|r| r.any_match)
        .count();

    SummaryData {
        tool: input.tool_name.clone(),
        version: input.tool_version.clone(),
        label: input.label.clone(),
        input: InputSummary {
            scores: input.scores_path.clone(),
            distribution: input.distribution_path.clone(),
            mated: input.mated_path.clone(),
            non_mated: input.non_mated_path.clone(),
            n_records: input.stage1.n_records,
            skipped_records: input.skipped_records,
        },
        config: input.config.clone(),
        threshold: input.threshold,
        target_fmr: input.target_fmr,
        population: PopulationSummary {
            n_morphs: input.stage1.morphs.len(),
            n_subjects: subjects.len(),
            n_probes: input.stage1.n_probes,
            min_probes: input.stage1.min_probes,
            max_probes: input.stage1.max_probes,
            n_any_match,
        },
        metrics: input.stage3.operating.clone(),
        sweep_points: input
            .config
            .threshold_sweep
            .as_ref()
            .map_or(0, |sweep| sweep.len()),
    }
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_report.rs"]
mod tests;
