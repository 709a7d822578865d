mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::input::config::load_engine_config;
use crate::input::{InputError, load_score_list, load_score_records};
use crate::model::config::{
    ConfigError, EngineConfig, MalformedPolicy, MapMode, RatioDenominator, ReductionPolicy,
    ThresholdSweep, check_threshold,
};
use crate::model::distribution::SubjectDistribution;
use crate::model::polarity::Polarity;
use crate::pipeline::MetricError;
use crate::pipeline::stage1_aggregate::run_stage1;
use crate::pipeline::stage3_metrics::{BonaFideScores, Stage3Inputs, run_stage3};
use crate::pipeline::stage4_report::{Stage4Input, write_reports};

#[derive(Debug, Parser)]
#[command(
    name = "morphqc",
    version,
    about = "Morphing-attack vulnerability metrics from face comparison scores"
)]
struct Cli {
    /// Debug-level logging unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute metrics at a fixed threshold and write reports.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Morph score file: `<morphID> <subjectID> <score> ...`.
    #[arg(long)]
    scores: PathBuf,

    /// Decision threshold, used as given.
    #[arg(long, allow_negative_numbers = true)]
    threshold: f64,

    #[arg(long)]
    out: PathBuf,

    /// Subject score distribution, required for the RANK reduction.
    #[arg(long)]
    distribution: Option<PathBuf>,

    /// Bona fide mated scores (FNMR).
    #[arg(long)]
    mated: Option<PathBuf>,

    /// Bona fide non-mated scores (FMR).
    #[arg(long)]
    non_mated: Option<PathBuf>,

    /// JSON engine configuration; CLI flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// similarity (match if score >= threshold) or dissimilarity (score <= threshold).
    #[arg(long)]
    polarity: Option<Polarity>,

    /// Comma-separated reductions: any, ratio, rank.
    #[arg(long, value_delimiter = ',')]
    policy: Vec<ReductionPolicy>,

    #[arg(long)]
    ratio_denominator: Option<RatioDenominator>,

    #[arg(long)]
    map_mode: Option<MapMode>,

    /// `start:stop:steps` or a comma-separated list.
    #[arg(long, allow_hyphen_values = true)]
    sweep: Option<ThresholdSweep>,

    /// Malformed score line handling: fail or skip.
    #[arg(long, conflicts_with = "skip_malformed")]
    malformed: Option<MalformedPolicy>,

    /// Same as `--malformed skip`.
    #[arg(long)]
    skip_malformed: bool,

    /// FRS configuration name; defaults to the score file stem.
    #[arg(long)]
    label: Option<String>,

    /// FMR the threshold was calibrated for, echoed in the report.
    #[arg(long, default_value_t = 0.001)]
    target_fmr: f64,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Metric(#[from] MetricError),
    #[error("failed to write reports to {}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run(&args),
    };
    if let Err(err) = result {
        tracing::error!(error = %err, "run failed");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            tracing::error!(cause = %cause, "caused by");
            source = std::error::Error::source(cause);
        }
        std::process::exit(1);
    }
}

fn run(args: &RunArgs) -> Result<(), RunError> {
    let file_config = args
        .config
        .as_deref()
        .map(load_engine_config)
        .transpose()?;
    let config = resolve_engine_config(args, file_config)?;
    let threshold = check_threshold(args.threshold)?;
    tracing::info!(
        polarity = %config.polarity,
        policies = ?config.ordered_policies(),
        ratio_denominator = ?config.ratio_denominator,
        map_mode = ?config.map_mode,
        threshold,
        "resolved configuration"
    );

    let batch = load_score_records(&args.scores, config.malformed)?;
    let stage1 = run_stage1(&batch.records);

    let distribution = match &args.distribution {
        Some(path) => {
            let dist_batch = load_score_records(path, config.malformed)?;
            let distribution = SubjectDistribution::from_records(&dist_batch.records);
            if distribution.dropped_nan() > 0 {
                tracing::warn!(
                    path = %path.display(),
                    dropped = distribution.dropped_nan(),
                    "NaN scores dropped from subject distribution"
                );
            }
            tracing::info!(
                subjects = distribution.n_subjects(),
                scores = distribution.n_scores(),
                "subject distribution ready"
            );
            Some(distribution)
        }
        None => None,
    };

    let bona_fide = if args.mated.is_some() || args.non_mated.is_some() {
        Some(BonaFideScores {
            mated: args
                .mated
                .as_deref()
                .map(load_score_list)
                .transpose()?
                .unwrap_or_default(),
            non_mated: args
                .non_mated
                .as_deref()
                .map(load_score_list)
                .transpose()?
                .unwrap_or_default(),
        })
    } else {
        None
    };

    let stage3 = run_stage3(&Stage3Inputs {
        morphs: &stage1.morphs,
        config: &config,
        threshold,
        distribution: distribution.as_ref(),
        bona_fide: bona_fide.as_ref(),
    })?;

    let target_fmr = bona_fide
        .as_ref()
        .filter(|b| !b.non_mated.is_empty())
        .map(|_| args.target_fmr);

    let input = Stage4Input {
        label: args
            .label
            .clone()
            .unwrap_or_else(|| default_label(&args.scores)),
        scores_path: args.scores.display().to_string(),
        distribution_path: path_string(args.distribution.as_deref()),
        mated_path: path_string(args.mated.as_deref()),
        non_mated_path: path_string(args.non_mated.as_deref()),
        skipped_records: batch.skipped,
        config: &config,
        threshold,
        target_fmr,
        stage1: &stage1,
        stage3: &stage3,
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    write_reports(&input, &args.out).map_err(|source| RunError::Report {
        path: args.out.clone(),
        source,
    })?;

    Ok(())
}

/// File config first, then CLI overrides. RANK joins the default policies
/// when a distribution is supplied and `--policy` is absent.
fn resolve_engine_config(
    args: &RunArgs,
    file_config: Option<EngineConfig>,
) -> Result<EngineConfig, ConfigError> {
    let mut config = file_config.unwrap_or_default();

    if let Some(polarity) = args.polarity {
        config.polarity = polarity;
    }
    if !args.policy.is_empty() {
        config.policies = args.policy.clone();
    } else if args.distribution.is_some() && !config.uses(ReductionPolicy::Rank) {
        config.policies.push(ReductionPolicy::Rank);
    }
    if let Some(denominator) = args.ratio_denominator {
        config.ratio_denominator = denominator;
    }
    if let Some(mode) = args.map_mode {
        config.map_mode = mode;
    }
    if let Some(sweep) = &args.sweep {
        config.threshold_sweep = Some(sweep.clone());
    }
    if let Some(policy) = args.malformed {
        config.malformed = policy;
    } else if args.skip_malformed {
        config.malformed = MalformedPolicy::Skip;
    }

    config.validate(args.distribution.is_some())?;
    Ok(config)
}

/// Score file stem, ignoring a trailing `.gz`.
fn default_label(path: &Path) -> String {
    let stripped = if path.extension().is_some_and(|ext| ext == "gz") {
        path.with_extension("")
    } else {
        path.to_path_buf()
    };
    stripped
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scores".to_string())
}

fn path_string(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.display().to_string())
}
