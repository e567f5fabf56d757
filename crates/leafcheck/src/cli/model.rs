//! The `leafcheck model` command for inspecting the classifier artifact.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use leafcheck_core::classifier::checksum::artifact_digest;
use leafcheck_core::Config;
use serde::Serialize;

/// Arguments for the `model` command.
#[derive(Args, Debug)]
pub struct ModelArgs {
    #[command(subcommand)]
    pub command: ModelCommand,
}

/// Subcommands for model inspection.
#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// Show whether a trained model is installed and which mode will be used
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print where the trained model is expected
    Path,
}

/// Outcome of comparing the artifact against `model.blake3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumState {
    /// No expected digest configured
    NotConfigured,
    Verified,
    Mismatch,
    /// The file could not be read
    Unreadable,
}

/// What the classifier would do if loaded now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    Trained,
    UntrainedFallback,
    /// Loading would fail: the checksum does not match, or the model is
    /// missing while `require_trained` is set
    Unavailable,
}

/// Installation report for the model artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub path: PathBuf,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blake3: Option<String>,
    pub checksum: ChecksumState,
    pub mode: ClassifierMode,
}

/// Inspect the configured model path without loading a session.
pub fn inspect(config: &Config) -> ModelReport {
    let path = config.model_path();
    let size_bytes = std::fs::metadata(&path).ok().map(|m| m.len());
    let installed = size_bytes.is_some();

    let blake3 = if installed {
        artifact_digest(&path).ok()
    } else {
        None
    };

    let checksum = match (&config.model.blake3, &blake3) {
        (None, _) => ChecksumState::NotConfigured,
        (Some(_), None) => ChecksumState::Unreadable,
        (Some(expected), Some(actual)) if expected.eq_ignore_ascii_case(actual) => {
            ChecksumState::Verified
        }
        (Some(_), Some(_)) => ChecksumState::Mismatch,
    };

    let mode = if installed {
        match checksum {
            ChecksumState::Mismatch | ChecksumState::Unreadable => ClassifierMode::Unavailable,
            ChecksumState::NotConfigured | ChecksumState::Verified => ClassifierMode::Trained,
        }
    } else if config.model.require_trained {
        ClassifierMode::Unavailable
    } else {
        ClassifierMode::UntrainedFallback
    };

    ModelReport {
        path,
        installed,
        size_bytes,
        blake3,
        checksum,
        mode,
    }
}

/// Execute the model command.
pub fn execute(args: ModelArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        ModelCommand::Status { json } => {
            let report = inspect(&config);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Classifier model:");
            println!("  Path:      {}", report.path.display());
            match report.size_bytes {
                Some(size) => println!(
                    "  Installed: yes ({:.1} MB)",
                    size as f64 / 1_000_000.0
                ),
                None => println!("  Installed: no"),
            }
            if let Some(digest) = &report.blake3 {
                println!("  BLAKE3:    {digest}");
            }
            let checksum = match report.checksum {
                ChecksumState::NotConfigured => "not configured (set model.blake3 to pin)",
                ChecksumState::Verified => "verified",
                ChecksumState::Mismatch => "MISMATCH (the model will fail to load)",
                ChecksumState::Unreadable => "model missing or unreadable",
            };
            println!("  Checksum:  {checksum}");
            let mode = match report.mode {
                ClassifierMode::Trained => "trained model",
                ClassifierMode::UntrainedFallback => {
                    "UNTRAINED fallback (predictions are not meaningful)"
                }
                ClassifierMode::Unavailable if report.installed => {
                    "unavailable (checksum verification fails)"
                }
                ClassifierMode::Unavailable => "unavailable (require_trained is set)",
            };
            println!("  Mode:      {mode}");
        }

        ModelCommand::Path => {
            println!("{}", config.model_path().display());
        }
    }

    Ok(())
}
