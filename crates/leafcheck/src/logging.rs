//! Logging initialization.
//!
//! Log output goes to stderr so stdout stays clean for reports and JSON.
//! `RUST_LOG` overrides the configured level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the default filter directive for a level.
///
/// ONNX Runtime logs at info level on every session build, so it is capped
/// at warn unless the user asks for trace.
fn filter_directive(level: &str, verbose: bool) -> String {
    let level = match (verbose, level) {
        (_, "trace") => "trace",
        (true, _) => "debug",
        (false, other) => other,
    };
    if level == "trace" {
        level.to_string()
    } else {
        format!("{level},ort=warn")
    }
}

/// Initialize the logging subsystem.
pub fn init(level: &str, verbose: bool, json_format: bool) {
    let directive = filter_directive(level, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(console::colors_enabled_stderr()),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section with CLI overrides.
pub fn init_from_config(
    config: &leafcheck_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let json_format = json_logs_override || config.logging.format == "json";
    init(&config.logging.level, verbose_override, json_format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_levels() {
        assert_eq!(filter_directive("info", false), "info,ort=warn");
        assert_eq!(filter_directive("warn", false), "warn,ort=warn");
        assert_eq!(filter_directive("info", true), "debug,ort=warn");
        assert_eq!(filter_directive("trace", false), "trace");
        assert_eq!(filter_directive("trace", true), "trace");
    }
}
