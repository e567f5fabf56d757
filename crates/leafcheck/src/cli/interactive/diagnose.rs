//! Guided diagnosis flow: photo path → classifier load → report → repeat.

use std::path::PathBuf;

use console::Style;
use dialoguer::{Confirm, Input};
use leafcheck_core::Diagnoser;

use super::theme::leafcheck_theme;
use crate::cli::diagnose::with_spinner;
use crate::cli::report;

/// Prompt for leaf photos and print a report for each until the user stops.
pub async fn guided_diagnose(diagnoser: &Diagnoser) -> anyhow::Result<()> {
    let theme = leafcheck_theme();
    let warn = Style::new().for_stderr().yellow();

    if diagnoser.model_status().is_none() {
        let status = with_spinner("Loading classifier...", diagnoser.warm_up()).await?;
        if !status.is_trained() {
            eprintln!("{}\n", report::degraded_banner(&status));
        }
    }

    loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Path to leaf photo (JPEG or PNG)")
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        let path = PathBuf::from(shellexpand::tilde(raw_path.trim()).into_owned());
        if !path.is_file() {
            eprintln!(
                "  {}",
                warn.apply_to(format!("File not found: {}", path.display()))
            );
            continue;
        }

        let message = format!("Analyzing {}...", path.display());
        let diagnosis = with_spinner(message, diagnoser.diagnose_file(&path)).await?;
        println!("{}", report::render_diagnosis(&diagnosis));

        let again = Confirm::with_theme(&theme)
            .with_prompt("Diagnose another photo?")
            .default(true)
            .interact_opt()?;
        if !matches!(again, Some(true)) {
            return Ok(());
        }
    }
}
