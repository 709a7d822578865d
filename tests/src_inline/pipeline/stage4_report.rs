use super::*;
use crate::model::config::ThresholdSweep;
use crate::model::record::ScoreRecord;
use crate::pipeline::stage1_aggregate::run_stage1;
use crate::pipeline::stage3_metrics::{Stage3Inputs, run_stage3};
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("morphqc_report_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn record(entity: &str, counterpart: &str, scores: &[f64]) -> ScoreRecord {
    ScoreRecord::new(entity, counterpart, scores.to_vec()).unwrap()
}

fn stage1() -> Stage1Output {
    run_stage1(&[
        record("M0001", "S1", &[0.28, 0.31]),
        record("M0001", "S2", &[0.45, 0.50]),
        record("M0002", "S3", &[0.52]),
        record("M0002", "S4", &[0.61]),
    ])
}

fn write_for(config: &EngineConfig, out_dir: &Path) -> SummaryData {
    let stage1 = stage1();
    let stage3 = run_stage3(&Stage3Inputs {
        morphs: &stage1.morphs,
        config,
        threshold: 0.3,
        distribution: None,
        bona_fide: None,
    })
    .unwrap();
    let input = Stage4Input {
        label: "frs-a".to_string(),
        scores_path: "morph_scores.txt".to_string(),
        distribution_path: None,
        mated_path: None,
        non_mated_path: None,
        skipped_records: 0,
        config,
        threshold: 0.3,
        target_fmr: None,
        stage1: &stage1,
        stage3: &stage3,
        tool_name: "morphqc".to_string(),
        tool_version: "0.0.0".to_string(),
    };
    write_reports(&input, out_dir).unwrap();
    build_summary(&input)
}

#[test]
fn test_metrics_tsv_rows() {
    let dir = make_temp_dir();
    write_for(&EngineConfig::default(), &dir);
    let text = std::fs::read_to_string(dir.join("metrics.tsv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "metric\tthreshold\tvalue\tsample_size");
    assert_eq!(lines[1], "MMPMR\t0.300000\t0.500000\t2");
    assert_eq!(lines[2], "RMMR\t0.300000\t0.125000\t2");
    assert_eq!(lines.len(), 3);
    assert!(!dir.join("sweep.tsv").exists());
}

#[test]
fn test_morphs_tsv() {
    let dir = make_temp_dir();
    write_for(&EngineConfig::default(), &dir);
    let text = std::fs::read_to_string(dir.join("morphs.tsv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("morph_id\tsubjects\tn_probes"));
    assert_eq!(lines[1], "M0001\tS1,S2\t4\t1\ttrue\t0.250000\tNA");
    assert_eq!(lines[2], "M0002\tS3,S4\t2\t0\tfalse\t0.000000\tNA");
}

#[test]
fn test_sweep_tsv_written_when_configured() {
    let dir = make_temp_dir();
    let config = EngineConfig {
        threshold_sweep: Some(ThresholdSweep::new(vec![0.3, 0.6]).unwrap()),
        ..EngineConfig::default()
    };
    let summary = write_for(&config, &dir);
    assert_eq!(summary.sweep_points, 2);
    let text = std::fs::read_to_string(dir.join("sweep.tsv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[3], "MMPMR\t0.600000\t1.000000\t2");
}

#[test]
fn test_summary_json_schema() {
    let dir = make_temp_dir();
    let summary = write_for(&EngineConfig::default(), &dir);
    assert_eq!(summary.population.n_morphs, 2);
    assert_eq!(summary.population.n_subjects, 4);
    assert_eq!(summary.population.n_any_match, 1);

    let text = std::fs::read_to_string(dir.join("summary.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["tool"], "morphqc");
    assert_eq!(value["label"], "frs-a");
    assert_eq!(value["config"]["polarity"], "dissimilarity");
    assert_eq!(value["metrics"][0]["metric"], "MMPMR");
    assert_eq!(value["input"]["n_records"], 4);
}

#[test]
fn test_report_text_sections() {
    let dir = make_temp_dir();
    write_for(&EngineConfig::default(), &dir);
    let text = std::fs::read_to_string(dir.join("report.txt")).unwrap();
    assert!(text.contains("1. Input"));
    assert!(text.contains("A comparison matches when score <= threshold."));
    assert!(text.contains("MMPMR: 0.500000"));
    assert!(text.contains("1 of 2 morphs were matched"));
    assert!(!text.contains("4. Bona fide operating point"));
}

#[test]
fn test_deterministic_output() {
    let a = make_temp_dir();
    let b = make_temp_dir();
    write_for(&EngineConfig::default(), &a);
    write_for(&EngineConfig::default(), &b);
    for name in ["metrics.tsv", "morphs.tsv", "summary.json", "report.txt"] {
        let left = std::fs::read_to_string(a.join(name)).unwrap();
        let right = std::fs::read_to_string(b.join(name)).unwrap();
        assert_eq!(left, right, "{name}");
    }
}
