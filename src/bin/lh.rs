//! lh CLI - Command-line interface for Landmark Hunt processing
//!
//! Commands:
//! - overview: Participant & session overview
//! - landmarks: Landmark coordinates
//! - trials: Task-level trial data, optionally filtered
//! - footprint: Convex hull area per user (or hull polygons)
//! - summarize: One summary row per document for a task source

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use landmark_hunt::pipeline::summary_export_name;
use landmark_hunt::schema::collect_documents;
use landmark_hunt::{DocumentBatch, Table, TaskSource, TaskType, TrialFilter, LH_VERSION};

/// lh - Landmark Hunt session-log explorer and converter
#[derive(Parser)]
#[command(name = "lh")]
#[command(version = LH_VERSION)]
#[command(about = "Flatten Landmark Hunt session logs into tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Participant & session overview
    Overview(CommonArgs),

    /// Landmark coordinates of every document
    Landmarks(CommonArgs),

    /// Task-level trial data
    Trials {
        #[command(flatten)]
        common: CommonArgs,

        /// Only trials from this task source
        #[arg(long, value_enum)]
        source: Option<TaskSource>,

        /// Only trials of this task type
        #[arg(long, value_enum)]
        task: Option<TaskType>,
    },

    /// Spatial footprint (convex hull area) per user
    Footprint {
        #[command(flatten)]
        common: CommonArgs,

        /// Emit geographic hull polygons (JSON) instead of the area table
        #[arg(long)]
        polygons: bool,
    },

    /// Per-document summary with day/week/overall metrics
    Summarize {
        #[command(flatten)]
        common: CommonArgs,

        /// Task source to summarize
        #[arg(long, value_enum)]
        source: TaskSource,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// JSON files or directories of JSON files (reads stdin when omitted)
    inputs: Vec<PathBuf>,

    /// Output file or directory (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values with header row
    Csv,
    /// Newline-delimited JSON (one row per line)
    Ndjson,
    /// JSON array of rows
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Ndjson => "ndjson",
            OutputFormat::Json | OutputFormat::JsonPretty => "json",
        }
    }
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Commands::Overview(common) | Commands::Landmarks(common) => common,
            Commands::Trials { common, .. }
            | Commands::Footprint { common, .. }
            | Commands::Summarize { common, .. } => common,
        }
    }

    /// File stem used when the output is a directory
    fn export_name(&self) -> String {
        match self {
            Commands::Overview(_) => "session_overview".to_string(),
            Commands::Landmarks(_) => "landmark_coordinates".to_string(),
            Commands::Trials { .. } => "trial_data".to_string(),
            Commands::Footprint { polygons: true, .. } => "convex_hull_polygons".to_string(),
            Commands::Footprint { .. } => "convex_hull_areas".to_string(),
            Commands::Summarize { source, .. } => summary_export_name(*source),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.command.common().verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

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

fn run(cli: Cli) -> Result<(), LhCliError> {
    let common = cli.command.common();
    let texts = read_inputs(&common.inputs)?;
    if texts.is_empty() {
        return Err(LhCliError::NoDocuments);
    }

    let batch = DocumentBatch::parse(&texts);
    if batch.skipped() > 0 {
        tracing::warn!(skipped = batch.skipped(), "some documents were skipped");
    }
    if batch.is_empty() {
        return Err(LhCliError::NoValidDocuments(batch.skipped()));
    }

    let output = match &cli.command {
        Commands::Overview(_) => format_table(&batch.overview_table(), common.format)?,
        Commands::Landmarks(_) => format_table(&batch.landmark_table(), common.format)?,
        Commands::Trials { source, task, .. } => format_table(
            &batch.trial_table(TrialFilter::new(*source, *task)),
            common.format,
        )?,
        Commands::Footprint { polygons: true, .. } => {
            serde_json::to_string_pretty(&batch.hull_polygons())? + "\n"
        }
        Commands::Footprint { .. } => format_table(&batch.hull_table(), common.format)?,
        Commands::Summarize { source, .. } => {
            format_table(&batch.summary_table(*source), common.format)?
        }
    };

    let extension = match &cli.command {
        Commands::Footprint { polygons: true, .. } => "json",
        _ => common.format.extension(),
    };
    write_output(&common.output, &cli.command.export_name(), extension, &output)
}

/// Collect decoded documents from files, directories or stdin
fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<String>, LhCliError> {
    if inputs.is_empty() {
        if atty::is(atty::Stream::Stdin) {
            return Err(LhCliError::NoInput);
        }
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        return Ok(vec![landmark_hunt::decode_document(&buffer)]);
    }

    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
    for input in inputs {
        gather_files(input, &mut entries)?;
    }
    tracing::debug!(files = entries.len(), "read input files");
    Ok(collect_documents(entries))
}

fn gather_files(path: &Path, entries: &mut Vec<(String, Vec<u8>)>) -> Result<(), LhCliError> {
    if path.is_dir() {
        let mut children: Vec<PathBuf> = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        children.sort();
        for child in children {
            gather_files(&child, entries)?;
        }
    } else {
        let name = path.to_string_lossy().to_string();
        if name.to_ascii_lowercase().ends_with(".zip") {
            tracing::warn!(file = %name, "zip archives are not supported; extract them first");
            return Ok(());
        }
        entries.push((name, fs::read(path)?));
    }
    Ok(())
}

fn format_table(table: &Table, format: OutputFormat) -> Result<String, LhCliError> {
    let output = match format {
        OutputFormat::Csv => table.to_csv_string()?,
        OutputFormat::Ndjson => table.to_ndjson()?,
        OutputFormat::Json => serde_json::to_string(table)? + "\n",
        OutputFormat::JsonPretty => serde_json::to_string_pretty(table)? + "\n",
    };
    Ok(output)
}

fn write_output(
    output: &Path,
    export_name: &str,
    extension: &str,
    data: &str,
) -> Result<(), LhCliError> {
    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        stdout.write_all(data.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let target = if output.is_dir() {
        output.join(format!("{export_name}.{extension}"))
    } else {
        output.to_path_buf()
    };
    fs::write(&target, data)?;
    tracing::info!(path = %target.display(), "wrote output");
    Ok(())
}

// Error types

#[derive(Debug)]
enum LhCliError {
    Io(io::Error),
    Compute(landmark_hunt::ComputeError),
    Json(serde_json::Error),
    NoInput,
    NoDocuments,
    NoValidDocuments(usize),
}

impl From<io::Error> for LhCliError {
    fn from(e: io::Error) -> Self {
        LhCliError::Io(e)
    }
}

impl From<landmark_hunt::ComputeError> for LhCliError {
    fn from(e: landmark_hunt::ComputeError) -> Self {
        LhCliError::Compute(e)
    }
}

impl From<serde_json::Error> for LhCliError {
    fn from(e: serde_json::Error) -> Self {
        LhCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LhCliError> for CliError {
    fn from(e: LhCliError) -> Self {
        match e {
            LhCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LhCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            LhCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            LhCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No input files given and stdin is a terminal".to_string(),
                hint: Some("Pass JSON files or directories, or pipe a document".to_string()),
            },
            LhCliError::NoDocuments => CliError {
                code: "NO_DOCUMENTS".to_string(),
                message: "No .json documents found in input".to_string(),
                hint: Some("Inputs must be .json files or directories containing them".to_string()),
            },
            LhCliError::NoValidDocuments(skipped) => CliError {
                code: "NO_VALID_DOCUMENTS".to_string(),
                message: format!("All {} documents failed to parse", skipped),
                hint: Some("Check JSON syntax".to_string()),
            },
        }
    }
}
