//! The `leafcheck diagnose` command.

use std::fs::File;
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use leafcheck_core::{Config, Diagnoser, Diagnosis, OutputFormat, OutputWriter};

use super::report;

/// Arguments for the `diagnose` command.
#[derive(Args, Debug, Default)]
pub struct DiagnoseArgs {
    /// Leaf photo to diagnose (JPEG or PNG)
    pub image: PathBuf,

    /// Number of predictions to report
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output format (defaults to `output.format` from config)
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail instead of falling back to the untrained classifier
    #[arg(long)]
    pub require_trained: bool,
}

/// How results are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON document
    Json,
    /// One JSON object per line
    Jsonl,
}

impl ReportFormat {
    fn from_config(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "jsonl" | "jsonlines" | "ndjson" => Self::Jsonl,
            _ => Self::Text,
        }
    }
}

/// Apply command-line overrides to the loaded config.
fn apply_overrides(mut config: Config, args: &DiagnoseArgs) -> anyhow::Result<Config> {
    if let Some(k) = args.top_k {
        config.ranking.top_k = k;
    }
    if args.require_trained {
        config.model.require_trained = true;
    }
    config.validate()?;
    Ok(config)
}

/// Run a future while showing a spinner on stderr.
pub async fn with_spinner<F: Future>(message: impl Into<String>, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    spinner.finish_and_clear();
    output
}

/// Execute the diagnose command.
pub async fn execute(args: DiagnoseArgs, config: Config) -> anyhow::Result<()> {
    let format = args
        .format
        .unwrap_or_else(|| ReportFormat::from_config(&config.output.format));
    let pretty = config.output.pretty;
    let config = apply_overrides(config, &args)?;

    let diagnoser = Diagnoser::new(config)?;
    let status = with_spinner("Loading classifier...", diagnoser.warm_up()).await?;
    if !status.is_trained() {
        eprintln!("{}\n", report::degraded_banner(&status));
    }

    let message = format!("Diagnosing {}...", args.image.display());
    let diagnosis = with_spinner(message, diagnoser.diagnose_file(&args.image)).await?;

    write_result(&diagnosis, format, pretty, args.output.as_ref())
}

fn write_result(
    diagnosis: &Diagnosis,
    format: ReportFormat,
    pretty: bool,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let to_file = output.is_some();
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    match format {
        ReportFormat::Text => {
            let text = report::render_diagnosis(diagnosis);
            if to_file {
                write!(writer, "{}", console::strip_ansi_codes(&text))?;
            } else {
                write!(writer, "{text}")?;
            }
            writer.flush()?;
        }
        ReportFormat::Json | ReportFormat::Jsonl => {
            let core_format = if format == ReportFormat::Json {
                OutputFormat::Json
            } else {
                OutputFormat::JsonLines
            };
            let mut writer = OutputWriter::new(writer, core_format, pretty);
            writer.write(diagnosis)?;
            writer.flush()?;
        }
    }

    if let Some(path) = output {
        tracing::info!("Wrote diagnosis of {} to {:?}", diagnosis.source_name, path);
    }
    Ok(())
}
