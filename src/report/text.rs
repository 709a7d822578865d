use crate::model::config::{MapMode, RatioDenominator};
use crate::model::metric::MetricKind;
use crate::model::polarity::Polarity;
use crate::report::{SummaryData, format_f64_6, format_threshold};

pub fn render_report_text(data: &SummaryData) -> String {
    let mut out = String::new();

    out.push_str("Morphing Attack Vulnerability Report\n");
    out.push_str("====================================\n\n");

    out.push_str("1. Input\n");
    out.push_str(&format!("FRS configuration: {}\n", data.label));
    out.push_str(&format!("Score file: {}\n", data.input.scores));
    if let Some(path) = &data.input.distribution {
        out.push_str(&format!("Subject distribution: {}\n", path));
    }
    out.push_str(&format!(
        "Records: {} (skipped malformed: {})\n",
        data.input.n_records, data.input.skipped_records
    ));
    out.push_str(&format!(
        "Morphs: {}\nComponent subjects: {}\nProbe scores: {}\n",
        data.population.n_morphs, data.population.n_subjects, data.population.n_probes
    ));
    if let (Some(lo), Some(hi)) = (data.population.min_probes, data.population.max_probes) {
        out.push_str(&format!("Probe scores per morph: {}..{}\n", lo, hi));
    }
    out.push('\n');

    out.push_str("2. Decision rule\n");
    out.push_str(&format!("Polarity: {}\n", data.config.polarity));
    out.push_str(&format!("Threshold: {}\n", format_f64_6(data.threshold)));
    out.push_str(&format!("{}\n\n", decision_statement(data.config.polarity)));

    out.push_str("3. Morphing vulnerability\n");
    for kind in [MetricKind::Mmpmr, MetricKind::Rmmr, MetricKind::Map] {
        if let Some(result) = data.metric(kind) {
            out.push_str(&format!(
                "{}: {} (threshold {}, n={}){}\n",
                kind,
                format_f64_6(result.value),
                format_threshold(result.threshold),
                result.sample_size,
                metric_note(kind, data)
            ));
        }
    }
    out.push_str(&format!(
        "Conclusion: {}\n\n",
        vulnerability_statement(data.population.n_any_match, data.population.n_morphs)
    ));

    let fmr = data.metric(MetricKind::Fmr);
    let fnmr = data.metric(MetricKind::Fnmr);
    if fmr.is_some() || fnmr.is_some() {
        out.push_str("4. Bona fide operating point\n");
        if let Some(result) = fmr {
            out.push_str(&format!(
                "FMR: {} (n={})",
                format_f64_6(result.value),
                result.sample_size
            ));
            if let Some(target) = data.target_fmr {
                out.push_str(&format!(", calibration target {}", format_f64_6(target)));
            }
            out.push('\n');
        }
        if let Some(result) = fnmr {
            out.push_str(&format!(
                "FNMR: {} (n={})\n",
                format_f64_6(result.value),
                result.sample_size
            ));
        }
        out.push('\n');
    }

    if data.sweep_points > 0 {
        out.push_str(&format!(
            "Threshold sweep: {} points written to sweep.tsv\n",
            data.sweep_points
        ));
    }

    out
}

fn decision_statement(polarity: Polarity) -> &'static str {
    match polarity {
        Polarity::Similarity => "A comparison matches when score >= threshold.",
        Polarity::Dissimilarity => "A comparison matches when score <= threshold.",
    }
}

fn metric_note(kind: MetricKind, data: &SummaryData) -> &'static str {
    match kind {
        MetricKind::Rmmr => match data.config.ratio_denominator {
            RatioDenominator::Probes => " [matched probes / probes]",
            RatioDenominator::Subjects => " [matched subjects / subjects]",
        },
        MetricKind::Map => match data.config.map_mode {
            MapMode::Rank => " [rank-based]",
            MapMode::Threshold => " [threshold-gated]",
        },
        _ => "",
    }
}

fn vulnerability_statement(n_any_match: usize, n_morphs: usize) -> String {
    if n_morphs == 0 {
        return "no morphs evaluated".to_string();
    }
    if n_any_match == 0 {
        return "no morph was matched by any contributing subject".to_string();
    }
    format!(
        "{} of {} morphs were matched by at least one contributing subject",
        n_any_match, n_morphs
    )
}
