//! The `leafcheck labels` command.

use clap::Args;
use leafcheck_core::ranking::display_name;
use leafcheck_core::ClassRegistry;

/// Arguments for the `labels` command.
#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Print the labels as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Execute the labels command.
pub fn execute(args: LabelsArgs) -> anyhow::Result<()> {
    let registry = ClassRegistry::plant_village();

    if args.json {
        println!("{}", serde_json::to_string_pretty(registry.labels())?);
        return Ok(());
    }

    println!("Supported categories ({}):\n", registry.len());
    for line in table_lines(&registry) {
        println!("{line}");
    }
    Ok(())
}

fn table_lines(registry: &ClassRegistry) -> Vec<String> {
    registry
        .iter()
        .map(|(i, label)| format!("  {:>2}  {:<52} {}", i, label, display_name(label)))
        .collect()
}
