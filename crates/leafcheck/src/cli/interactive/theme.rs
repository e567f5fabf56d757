//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with green accents: `?` prompts, `▸` cursor, `✓`/`✗` results.
pub fn leafcheck_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().green(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().green(),
        active_item_style: Style::new().for_stderr().green(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the version banner to stderr.
pub fn print_banner() {
    let version_line = format!("Leafcheck v{}", leafcheck_core::VERSION);
    let tagline = "Plant disease diagnosis from leaf photos";
    let inner_width = tagline.chars().count() + 4;

    let green = Style::new().for_stderr().green();

    eprintln!();
    eprintln!("{}", green.apply_to(format!("  ╔{:═<inner_width$}╗", "")));
    eprintln!("{}", green.apply_to(format!("  ║{version_line:^inner_width$}║")));
    eprintln!("{}", green.apply_to(format!("  ║{tagline:^inner_width$}║")));
    eprintln!("{}", green.apply_to(format!("  ╚{:═<inner_width$}╝", "")));
    eprintln!();
}
