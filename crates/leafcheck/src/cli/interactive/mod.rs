//! Interactive mode for bare `leafcheck` invocation on a terminal.
//!
//! A menu loop over the same core operations as the subcommands. A failed
//! request is printed and the menu comes back; only prompt I/O errors end
//! the session.

pub mod diagnose;
pub mod theme;

use console::Style;
use dialoguer::Select;
use leafcheck_core::ranking::display_name;
use leafcheck_core::{Config, Diagnoser};

use crate::cli::report;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Diagnose a leaf photo",
    "Look up a disease",
    "List supported classes",
    "Show configuration",
    "Exit",
];

/// Entry point for interactive mode.
pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::leafcheck_theme();
    let diagnoser = Diagnoser::new(config)?;
    let err_style = Style::new().for_stderr().red();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        let result = match selection {
            Some(0) => diagnose::guided_diagnose(&diagnoser).await,
            Some(1) => guided_lookup(&diagnoser),
            Some(2) => {
                list_classes(&diagnoser);
                Ok(())
            }
            Some(3) => show_config(diagnoser.config()),
            _ => break,
        };

        if let Err(e) = result {
            eprintln!("  {} {e:#}", err_style.apply_to("✗"));
            eprintln!();
        }
    }

    Ok(())
}

/// Pick a category from the registry and print its disease record.
fn guided_lookup(diagnoser: &Diagnoser) -> anyhow::Result<()> {
    let theme = theme::leafcheck_theme();
    let registry = diagnoser.registry();
    let items: Vec<String> = registry.labels().iter().map(|l| display_name(l)).collect();

    let selection = Select::with_theme(&theme)
        .with_prompt("Which category?")
        .items(&items)
        .default(0)
        .max_length(12)
        .interact_opt()?;

    if let Some(label) = selection.and_then(|i| registry.label(i)) {
        let info = diagnoser.knowledge().lookup(label);
        println!("\n{}", report::render_disease(label, &info));
    }
    Ok(())
}

fn list_classes(diagnoser: &Diagnoser) {
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    for (i, label) in diagnoser.registry().iter() {
        eprintln!(
            "  {:>2}  {:<40} {}",
            i,
            display_name(label),
            dim.apply_to(label)
        );
    }
    eprintln!();
}

/// Summary of current settings, with an option to dump the full TOML.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::leafcheck_theme();
    let dim = Style::new().for_stderr().dim();
    let green = Style::new().for_stderr().green();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", green.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };
        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );

        let model_path = config.model_path();
        let model_note = if model_path.exists() {
            "(installed)"
        } else if config.model.require_trained {
            "(missing, required)"
        } else {
            "(missing, untrained fallback)"
        };
        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Model:"),
            model_path.display(),
            dim.apply_to(model_note)
        );
        eprintln!(
            "    {:<20} {}px, {:?} resize",
            label.apply_to("Input size:"),
            config.model.image_size,
            config.model.resize_filter
        );
        eprintln!(
            "    {:<20} top {} (high ≥ {:.2}, medium ≥ {:.2})",
            label.apply_to("Ranking:"),
            config.ranking.top_k,
            config.ranking.high_confidence,
            config.ranking.medium_confidence
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Knowledge file:"),
            config
                .knowledge_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in only".to_string())
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];
        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => {
                let toml = config.to_toml()?;
                eprintln!();
                eprintln!("{}", dim.apply_to("─".repeat(50)));
                eprintln!("{toml}");
                eprintln!("{}", dim.apply_to("─".repeat(50)));
                eprintln!();
            }
            Some(1) => {
                eprintln!();
                eprintln!("  {}", config_path.display());
                eprintln!();
            }
            _ => break,
        }
    }

    Ok(())
}
