//! The `leafcheck lookup` command.

use clap::Args;
use leafcheck_core::{Config, Diagnoser};

use super::report;

/// Arguments for the `lookup` command.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Category label, e.g. "Tomato___Late_blight"
    pub label: String,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the lookup command.
pub fn execute(args: LookupArgs, config: Config) -> anyhow::Result<()> {
    // Loads the knowledge base only; the classifier stays unloaded.
    let diagnoser = Diagnoser::new(config)?;
    let label = args.label.trim();
    let info = diagnoser.knowledge().lookup(label);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    if diagnoser.registry().index_of(label).is_none() {
        eprintln!(
            "  {}",
            console::style(format!(
                "\"{label}\" is not a supported category; see `leafcheck labels`."
            ))
            .yellow()
        );
    }
    println!("\n{}", report::render_disease(label, &info));
    Ok(())
}
