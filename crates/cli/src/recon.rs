//! `docrecon run | validate | score`.

use std::path::{Path, PathBuf};

use clap::Args;
use docrecon_engine::config::ReconConfig;
use docrecon_engine::load::load_csv_records;
use docrecon_engine::model::{ReconInput, Side};
use docrecon_engine::normalize::{extract_codename, to_fuzzy_key};
use docrecon_engine::score::score_keys;

use crate::exit_codes::{recon_exit_code, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_OUTPUT, EXIT_UNMATCHED};
use crate::report;
use crate::CliError;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Left-side CSV export (e.g. the Salesforce document list)
    #[arg(long, short = 'l')]
    pub left: PathBuf,

    /// Right-side CSV export (e.g. the SharePoint file list)
    #[arg(long, short = 'r')]
    pub right: PathBuf,

    /// TOML config (labels, columns, thresholds)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Directory for the output tables and summary
    #[arg(long, short = 'o', default_value = "./comparison_results")]
    pub output_dir: PathBuf,

    /// Minimum fuzzy score, 0-100 (overrides config)
    #[arg(long, short = 't')]
    pub threshold: Option<i64>,

    /// Compare exact names case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Exact matching only
    #[arg(long)]
    pub no_fuzzy: bool,

    /// Left name column; repeat for fallbacks in priority order (overrides config)
    #[arg(long = "left-column")]
    pub left_columns: Vec<String>,

    /// Right name column; repeat for fallbacks in priority order (overrides config)
    #[arg(long = "right-column")]
    pub right_columns: Vec<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    pub json: bool,

    /// Write JSON result to file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit 6 when any name is left unmatched on either side
    #[arg(long)]
    pub fail_on_unmatched: bool,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| recon_err(EXIT_INPUT, format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| recon_err(EXIT_INVALID_CONFIG, e.to_string()))
}

/// Read an export as text. Invalid UTF-8 is replaced rather than rejected.
fn read_input(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path)
        .map_err(|e| recon_err(EXIT_INPUT, format!("cannot read {}: {e}", path.display())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Config file values, then command-line overrides.
fn merge_config(args: &RunArgs) -> Result<ReconConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ReconConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        if !(0..=100).contains(&threshold) {
            return Err(CliError::args(format!("--threshold must be between 0 and 100, got {threshold}")));
        }
        config.threshold = threshold;
    }
    if args.case_sensitive {
        config.case_sensitive = true;
    }
    if args.no_fuzzy {
        config.fuzzy = false;
    }
    if !args.left_columns.is_empty() {
        config.left.name_columns = args.left_columns.clone();
    }
    if !args.right_columns.is_empty() {
        config.right.name_columns = args.right_columns.clone();
    }

    config
        .validate()
        .map_err(|e| recon_err(recon_exit_code(&e), e.to_string()))?;
    Ok(config)
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    for path in [&args.left, &args.right] {
        if !path.is_file() {
            return Err(recon_err(EXIT_INPUT, format!("input not found: {}", path.display()))
                .with_hint("pass the CSV exports with --left and --right"));
        }
    }

    let config = merge_config(&args)?;
    log::info!(
        "reconciling {} ({}) against {} ({})",
        args.left.display(),
        config.left.label,
        args.right.display(),
        config.right.label,
    );

    let input = ReconInput {
        left: load_csv_records(Side::Left, &read_input(&args.left)?, &config.left)
            .map_err(|e| recon_err(recon_exit_code(&e), format!("{}: {e}", args.left.display())))?,
        right: load_csv_records(Side::Right, &read_input(&args.right)?, &config.right)
            .map_err(|e| recon_err(recon_exit_code(&e), format!("{}: {e}", args.right.display())))?,
    };

    let result = docrecon_engine::run(&config, &input).map_err(|e| recon_err(recon_exit_code(&e), e.to_string()))?;

    let summary = report::write_outputs(&args.output_dir, &config, &input, &result, &args.left, &args.right)?;

    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| recon_err(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| recon_err(EXIT_OUTPUT, format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    eprint!("{summary}");

    let s = &result.summary;
    if args.fail_on_unmatched && s.only_left + s.only_right > 0 {
        return Err(recon_err(
            EXIT_UNMATCHED,
            format!("{} unmatched in {}, {} unmatched in {}", s.only_left, config.left.label, s.only_right, config.right.label),
        ));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: '{}' {} [{}] vs {} [{}], threshold {} (auxiliary {}), fuzzy {}",
        config.name,
        config.left.label,
        config.left.name_columns.join(", "),
        config.right.label,
        config.right.name_columns.join(", "),
        config.threshold,
        config.auxiliary_threshold(),
        if config.fuzzy { "on" } else { "off" },
    );
    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct ScoreReport {
    left: String,
    right: String,
    left_fuzzy: String,
    right_fuzzy: String,
    left_codename: Option<String>,
    right_codename: Option<String>,
    score: u8,
}

fn score_report(a: &str, b: &str) -> ScoreReport {
    let left_fuzzy = to_fuzzy_key(a);
    let right_fuzzy = to_fuzzy_key(b);
    ScoreReport {
        left: a.to_string(),
        right: b.to_string(),
        score: score_keys(&left_fuzzy, &right_fuzzy),
        left_fuzzy,
        right_fuzzy,
        left_codename: extract_codename(a),
        right_codename: extract_codename(b),
    }
}

pub fn cmd_score(a: String, b: String, json: bool) -> Result<(), CliError> {
    let report = score_report(&a, &b);

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| recon_err(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    let codename = |c: &Option<String>| c.clone().unwrap_or_else(|| "-".into());
    println!("left:   {:?} -> {:?} (codename {})", report.left, report.left_fuzzy, codename(&report.left_codename));
    println!("right:  {:?} -> {:?} (codename {})", report.right, report.right_fuzzy, codename(&report.right_codename));
    println!("score:  {}", report.score);
    Ok(())
}
