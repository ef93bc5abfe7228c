use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::cli::error::{
    user_error, validate_input_file, validate_layout, validate_spreadsheet, validate_threshold,
};
use crate::cli::output::{format_inspection, format_report, is_tty, ReportOptions};
use crate::config::Config;
use crate::extract::{BudgetInference, PatternBudget};
use crate::intake::{
    extract_candidates, extract_text, parse_candidates_lenient, records_to_json, GeminiClient,
    GeminiError, TranscriptError,
};
use crate::models::TaskRecord;
use crate::reconcile::{prepare_records, reconcile_file, AppendLayout, ReconcileOptions, RunOptions};
use crate::workbook::XlsxStore;

#[derive(Parser)]
#[command(name = "renosheet")]
#[command(about = "Reconcile renovation tasks from meeting transcripts into a tracking spreadsheet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command that writes a spreadsheet
#[derive(Args, Debug, Clone, Default)]
pub struct WriteArgs {
    /// Reconcile in memory and report, without saving the spreadsheet
    #[arg(long)]
    pub dry_run: bool,
    /// Copy the spreadsheet to a timestamped .bak.xlsx before saving
    #[arg(long)]
    pub backup: bool,
    /// Print the reconciliation report as JSON
    #[arg(long)]
    pub json: bool,
    /// Placement of appended rows: aligned (under headers) or schema (schema order)
    #[arg(long, value_parser = validate_layout)]
    pub layout: Option<AppendLayout>,
    /// Minimum fuzzy match score (0-100) to treat a row as the same task
    #[arg(long, value_parser = validate_threshold)]
    pub threshold: Option<u8>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile a candidate task JSON file into a spreadsheet
    Apply {
        /// Tracking spreadsheet (.xlsx), updated in place
        spreadsheet: PathBuf,
        /// Candidate tasks: JSON object keyed by task description
        #[arg(long)]
        tasks: PathBuf,
        /// Use budgets, references and leads exactly as given
        #[arg(long)]
        no_refine: bool,
        #[command(flatten)]
        write: WriteArgs,
    },
    /// Extract candidate tasks from a transcript and print them as JSON
    Extract {
        /// Meeting transcript (.docx, .pdf, .txt or .md)
        transcript: PathBuf,
        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip budget, reference and lead extraction
        #[arg(long)]
        no_refine: bool,
    },
    /// Extract tasks from a transcript and reconcile them into a spreadsheet
    Sync {
        /// Meeting transcript (.docx, .pdf, .txt or .md)
        transcript: PathBuf,
        /// Tracking spreadsheet (.xlsx), updated in place
        spreadsheet: PathBuf,
        /// Use budgets, references and leads exactly as extracted
        #[arg(long)]
        no_refine: bool,
        #[command(flatten)]
        write: WriteArgs,
    },
    /// Show how each sheet of a spreadsheet will be read
    Inspect {
        /// Tracking spreadsheet (.xlsx)
        spreadsheet: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            // --help and --version are reported through the same path
            if e.use_stderr() {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    init_logging(cli.verbose);
    handle_command(cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Apply { spreadsheet, tasks, no_refine, write } => {
            handle_apply(&spreadsheet, &tasks, no_refine, &write)
        }
        Commands::Extract { transcript, output, no_refine } => {
            handle_extract(&transcript, output.as_deref(), no_refine)
        }
        Commands::Sync { transcript, spreadsheet, no_refine, write } => {
            handle_sync(&transcript, &spreadsheet, no_refine, &write)
        }
        Commands::Inspect { spreadsheet } => handle_inspect(&spreadsheet),
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => user_error(&format!("{:#}", e)),
    }
}

fn budget_rules(no_refine: bool) -> Option<&'static dyn BudgetInference> {
    if no_refine {
        None
    } else {
        Some(&PatternBudget)
    }
}

fn check_spreadsheet(path: &Path) {
    if let Err(e) = validate_spreadsheet(path) {
        user_error(&e);
    }
}

fn handle_apply(spreadsheet: &Path, tasks: &Path, no_refine: bool, write: &WriteArgs) -> Result<()> {
    let config = load_config();
    check_spreadsheet(spreadsheet);
    if let Err(e) = validate_input_file(tasks, "Task file") {
        user_error(&e);
    }

    let raw = std::fs::read_to_string(tasks)
        .with_context(|| format!("Failed to read task file: {}", tasks.display()))?;
    let records = prepare_records(parse_candidates_lenient(&raw), budget_rules(no_refine));
    log::info!("Loaded {} candidate task(s) from {}", records.len(), tasks.display());

    reconcile_and_report(spreadsheet, &records, &config, write)
}

/// Plain text of a transcript file; unreadable files are user errors
fn transcript_text(transcript: &Path) -> String {
    if let Err(e) = validate_input_file(transcript, "Transcript") {
        user_error(&e);
    }
    let text = match extract_text(transcript) {
        Ok(text) => text,
        Err(e @ TranscriptError::UnsupportedFormat(_)) => user_error(&e.to_string()),
        Err(e) => user_error(&format!("{} ({})", e, transcript.display())),
    };
    if text.trim().is_empty() {
        log::warn!("Transcript {} contains no text", transcript.display());
    }
    text
}

/// Transcript text through the extraction service, unrefined
///
/// Only building the client can fail here; service and parse failures
/// already come back as an empty list.
fn request_candidates(text: &str, config: &Config) -> Result<Vec<TaskRecord>, GeminiError> {
    let client = GeminiClient::new(&config.gemini)?;
    let records = extract_candidates(text, &client);
    log::info!("Extracted {} candidate task(s)", records.len());
    Ok(records)
}

fn handle_extract(transcript: &Path, output: Option<&Path>, no_refine: bool) -> Result<()> {
    let config = load_config();
    let text = transcript_text(transcript);
    let records = match request_candidates(&text, &config) {
        Ok(records) => records,
        Err(e) => user_error(&e.to_string()),
    };
    let records = prepare_records(records, budget_rules(no_refine));
    let json = serde_json::to_string_pretty(&records_to_json(&records))?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} task(s) to {}.", records.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn handle_sync(transcript: &Path, spreadsheet: &Path, no_refine: bool, write: &WriteArgs) -> Result<()> {
    let config = load_config();
    check_spreadsheet(spreadsheet);

    let text = transcript_text(transcript);
    let records = request_candidates(&text, &config).unwrap_or_else(|e| {
        log::error!("Task extraction failed: {}", e);
        Vec::new()
    });
    let records = prepare_records(records, budget_rules(no_refine));
    reconcile_and_report(spreadsheet, &records, &config, write)
}

fn reconcile_and_report(
    spreadsheet: &Path,
    records: &[TaskRecord],
    config: &Config,
    write: &WriteArgs,
) -> Result<()> {
    if records.is_empty() {
        log::warn!("No candidate tasks; spreadsheet rows will not change");
    }

    let options = RunOptions {
        reconcile: ReconcileOptions {
            threshold: write.threshold.unwrap_or(config.threshold),
            layout: write.layout.unwrap_or(config.layout),
        },
        dry_run: write.dry_run,
        backup: write.backup,
    };
    let report = reconcile_file(spreadsheet, records, &options)?;

    if write.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report, spreadsheet, &ReportOptions::default()));
    }
    Ok(())
}

fn handle_inspect(spreadsheet: &Path) -> Result<()> {
    check_spreadsheet(spreadsheet);
    let (_, workbook) = XlsxStore::open(spreadsheet)?;
    println!("{}", format_inspection(&workbook, is_tty()));
    Ok(())
}
