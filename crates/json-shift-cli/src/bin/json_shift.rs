//! `json-shift`: reshape JSON with shift specs and build chart configs.
//!
//! Usage:
//!   json-shift transform --spec <FILE> [--input <FILE>]
//!   json-shift preset <NAME> [--input <FILE>] [--chart | --explain] [--title <TEXT>]
//!   json-shift chart <KIND> [--input <FILE>] [--title <TEXT>]
//!   json-shift request [--input <FILE>]
//!   json-shift presets
//!   json-shift self-check
//!
//! Documents are read from stdin when `--input` is absent or `-`.
//! Logs go to stderr, filtered by `--log-level` or `JSON_SHIFT_LOG`.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use json_shift_chart::ChartOptions;
use json_shift_cli::commands::{self, PresetView};
use tracing_subscriber::EnvFilter;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "json-shift", version)]
#[command(about = "Declarative JSON reshaping and chart config synthesis", long_about = None)]
struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    /// Log filter directive, e.g. `debug` or `json_shift=trace`.
    #[arg(long, global = true, env = "JSON_SHIFT_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a spec document to an input document.
    Transform {
        #[arg(long)]
        spec: PathBuf,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Run a built-in preset over flattened records.
    Preset {
        name: String,

        #[arg(long)]
        input: Option<PathBuf>,

        /// Emit the chart config instead of the reshaped data.
        #[arg(long, conflicts_with = "explain")]
        chart: bool,

        /// Emit the spec, the reshaped data and the chart config together.
        #[arg(long)]
        explain: bool,

        #[arg(long)]
        title: Option<String>,
    },

    /// Build a chart config from already shaped data.
    Chart {
        kind: String,

        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long)]
        subtitle: Option<String>,

        #[arg(long)]
        series_name: Option<String>,
    },

    /// Answer a request envelope; failures are reported inside the envelope.
    Request {
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// List the built-in presets.
    Presets,

    /// Run built-in sample records through the `grade` preset.
    SelfCheck,
}

fn read_document(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn init_logging(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).with_context(|| format!("invalid log filter {filter:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn print(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn run(cli: Cli) -> Result<bool> {
    let pretty = cli.pretty;
    let output = match cli.cmd {
        Commands::Transform { spec, input } => {
            let spec_json = read_document(Some(&spec))?;
            let input_json = read_document(input.as_ref())?;
            commands::transform(&spec_json, &input_json)?
        }
        Commands::Preset {
            name,
            input,
            chart,
            explain,
            title,
        } => {
            let view = if explain {
                PresetView::Explain
            } else if chart {
                PresetView::Chart
            } else {
                PresetView::Output
            };
            let input_json = read_document(input.as_ref())?;
            commands::preset(&name, &input_json, view, title.as_deref())?
        }
        Commands::Chart {
            kind,
            input,
            title,
            subtitle,
            series_name,
        } => {
            let shaped_json = read_document(input.as_ref())?;
            let options = ChartOptions {
                title,
                subtitle,
                series_name,
            };
            commands::chart(&kind, &shaped_json, &options)?
        }
        Commands::Request { input } => {
            let response = commands::request(&read_document(input.as_ref())?);
            print(&commands::render(&response, pretty)?)?;
            return Ok(response.success);
        }
        Commands::Presets => commands::presets()?,
        Commands::SelfCheck => commands::check()?,
    };
    print(&commands::render(&output, pretty)?)?;
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
