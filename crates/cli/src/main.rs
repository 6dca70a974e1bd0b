// docrecon - reconcile two document inventories by file name

mod exit_codes;
mod recon;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "docrecon")]
#[command(about = "Reconcile two document inventories by file name (exact + fuzzy)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two CSV exports and write the result tables
    #[command(after_help = "\
Examples:
  docrecon run --left salesforce.csv --right sharepoint.csv
  docrecon run -l sf.csv -r sp.csv -o ./comparison_results --threshold 80
  docrecon run -l sf.csv -r sp.csv --config recon.toml --json
  docrecon run -l sf.csv -r sp.csv --no-fuzzy --fail-on-unmatched")]
    Run(recon::RunArgs),

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  docrecon validate recon.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Show the fuzzy keys, codenames, and score for two names
    #[command(after_help = "\
Examples:
  docrecon score 'Project Eagle CIM (HIG) 2024.pdf' 'Eagle_CIM_Final.docx'
  docrecon score 'QoE Databook.xlsx' 'Project Resurgence QoE Databook v3.xlsx' --json")]
    Score {
        /// First name
        a: String,

        /// Second name
        b: String,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("DOCRECON_GIT_HASH"), ")",
        "\nengine:  docrecon-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("DOCRECON_TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: docrecon <command> [options]");
            eprintln!("       docrecon --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Run(args)) => recon::cmd_run(args),
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
        Some(Commands::Score { a, b, json }) => recon::cmd_score(a, b, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
