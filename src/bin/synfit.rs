//! Synfit CLI - Command-line interface for Synheart Fit
//!
//! Commands:
//! - summarize: Turn decoder JSON into an activity report
//! - hrv: Compute HRV metrics from decoder JSON or a raw RR interval array
//! - catalog: List the message groups present in decoder JSON
//! - schema: Print the known message types and their decoder keys

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use synheart_fit::hrv::{HrvOptions, RrIntervalExtractor, DEFAULT_NN50_THRESHOLD_MS};
use synheart_fit::types::ActivityReport;
use synheart_fit::{FitProcessor, MessageKind, FIT_VERSION};

/// Synfit - Activity summary and HRV derivation for decoded activity files
#[derive(Parser)]
#[command(name = "synfit")]
#[command(author = "Synheart AI Inc")]
#[command(version = FIT_VERSION)]
#[command(about = "Summarize decoded activity files", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn decoder JSON into an activity report
    Summarize {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Successive-difference threshold for pNN50 (ms)
        #[arg(long, default_value_t = DEFAULT_NN50_THRESHOLD_MS)]
        nn50_threshold_ms: f64,
    },

    /// Compute HRV metrics
    Hrv {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Treat input as a JSON array of RR intervals in milliseconds
        #[arg(long)]
        rr: bool,

        /// Successive-difference threshold for pNN50 (ms)
        #[arg(long, default_value_t = DEFAULT_NN50_THRESHOLD_MS)]
        nn50_threshold_ms: f64,
    },

    /// List the message groups present in decoder JSON
    Catalog {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the known message types
    Schema {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON followed by a newline
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), SynfitCliError> {
    match cli.command {
        Commands::Summarize {
            input,
            output,
            output_format,
            nn50_threshold_ms,
        } => cmd_summarize(&input, &output, output_format, nn50_threshold_ms),

        Commands::Hrv {
            input,
            rr,
            nn50_threshold_ms,
        } => cmd_hrv(&input, rr, nn50_threshold_ms),

        Commands::Catalog { input, json } => cmd_catalog(&input, json),

        Commands::Schema { json } => cmd_schema(json),
    }
}

fn hrv_options(nn50_threshold_ms: f64) -> Result<HrvOptions, SynfitCliError> {
    if !nn50_threshold_ms.is_finite() || nn50_threshold_ms < 0.0 {
        return Err(SynfitCliError::InvalidArgument(format!(
            "nn50 threshold must be a non-negative number, got {nn50_threshold_ms}"
        )));
    }
    Ok(HrvOptions {
        nn50_threshold_ms,
        ..Default::default()
    })
}

fn cmd_summarize(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    nn50_threshold_ms: f64,
) -> Result<(), SynfitCliError> {
    let input_data = read_input(input)?;
    let processor = FitProcessor::with_options(hrv_options(nn50_threshold_ms)?);

    let report = processor.process(&input_data)?;
    info!(
        data_types = report.data_types.len(),
        warnings = report.warnings.len(),
        "summarized {}",
        input.display()
    );

    let output_data = format_output(&report, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
        debug!("wrote report to {}", output.display());
    }

    Ok(())
}

fn cmd_hrv(input: &Path, rr: bool, nn50_threshold_ms: f64) -> Result<(), SynfitCliError> {
    let input_data = read_input(input)?;
    let processor = FitProcessor::with_options(hrv_options(nn50_threshold_ms)?);

    let intervals: Vec<f64> = if rr {
        let raw: Vec<f64> = serde_json::from_str(&input_data)?;
        RrIntervalExtractor::filter_ms(&raw, processor.options())
    } else {
        let (groups, _) = processor.normalize(&input_data)?;
        RrIntervalExtractor::extract(&groups.hrv, processor.options())
    };
    debug!(intervals = intervals.len(), "collected RR intervals");

    match processor.hrv_from_rr(&intervals) {
        Some(metrics) => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
        None => Err(SynfitCliError::InsufficientHrv(intervals.len())),
    }
}

fn cmd_catalog(input: &Path, json: bool) -> Result<(), SynfitCliError> {
    let input_data = read_input(input)?;
    let processor = FitProcessor::new();
    let (groups, warnings) = processor.normalize(&input_data)?;
    let entries = processor.catalog(&groups);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Data Types");
        println!("==========");
        if entries.is_empty() {
            println!("  (none)");
        }
        for entry in &entries {
            println!("  {:<20} {:>8}  ({})", entry.label, entry.count, entry.key);
        }
        for warning in &warnings {
            println!("\n[WARN] {}", warning);
        }
    }

    Ok(())
}

fn cmd_schema(json: bool) -> Result<(), SynfitCliError> {
    if json {
        let kinds: Vec<SchemaEntry> = MessageKind::ALL
            .iter()
            .map(|kind| SchemaEntry {
                key: kind.key(),
                decoder_key: kind.decoder_key(),
                label: kind.label(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&kinds)?);
    } else {
        println!("Known message types (listing order):");
        println!();
        for (index, kind) in MessageKind::ALL.iter().enumerate() {
            println!(
                "{:>3}. {:<20} {:<24} {}",
                index + 1,
                kind.key(),
                kind.decoder_key(),
                kind.label()
            );
        }
        println!();
        println!("Input may be the bare collections object or an envelope:");
        println!("  {{ \"messages\": {{...}}, \"errors\": [...], \"integrityOk\": true }}");
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, SynfitCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading decoder output from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn format_output(
    report: &ActivityReport,
    format: &OutputFormat,
) -> Result<String, SynfitCliError> {
    match format {
        OutputFormat::Ndjson => Ok(serde_json::to_string(report)? + "\n"),
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum SynfitCliError {
    Io(io::Error),
    Compute(synheart_fit::ComputeError),
    Json(serde_json::Error),
    InvalidArgument(String),
    InsufficientHrv(usize),
}

impl From<io::Error> for SynfitCliError {
    fn from(e: io::Error) -> Self {
        SynfitCliError::Io(e)
    }
}

impl From<synheart_fit::ComputeError> for SynfitCliError {
    fn from(e: synheart_fit::ComputeError) -> Self {
        SynfitCliError::Compute(e)
    }
}

impl From<serde_json::Error> for SynfitCliError {
    fn from(e: serde_json::Error) -> Self {
        SynfitCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SynfitCliError> for CliError {
    fn from(e: SynfitCliError) -> Self {
        match e {
            SynfitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SynfitCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'synfit schema' for the expected input shape".to_string()),
            },
            SynfitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SynfitCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: None,
            },
            SynfitCliError::InsufficientHrv(count) => CliError {
                code: "INSUFFICIENT_HRV".to_string(),
                message: format!("{} valid RR intervals found, at least 2 required", count),
                hint: Some("Check that the file contains hrv messages".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaEntry {
    key: &'static str,
    decoder_key: &'static str,
    label: &'static str,
}
