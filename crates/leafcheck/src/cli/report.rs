//! Human-readable rendering of diagnoses and disease records.

use console::{style, Style, StyledObject};
use leafcheck_core::ranking::display_name;
use leafcheck_core::{format_confidence, ConfidenceTier, Diagnosis, DiseaseInfo, ModelStatus};

pub const DISCLAIMER: &str = "Disclaimer: This AI tool provides guidance only. For serious \
infections or uncertainty, consult with local agricultural experts or extension services.";

pub const SERIOUS_WARNING: &str =
    "This is a serious disease. Consider consulting an agricultural expert.";

fn tier_marker(tier: ConfidenceTier) -> StyledObject<&'static str> {
    match tier {
        ConfidenceTier::High => style("●").green(),
        ConfidenceTier::Medium => style("●").yellow(),
        ConfidenceTier::Low => style("●").red(),
    }
}

/// Warning printed whenever predictions come from the untrained fallback.
pub fn degraded_banner(status: &ModelStatus) -> String {
    let warn = Style::new().yellow().bold();
    format!(
        "{}\n  {}\n  {}",
        warn.apply_to("  ! UNTRAINED MODEL: predictions below are NOT real diagnoses."),
        style(format!("Using {}.", status.source)).dim(),
        style("Install a trained model (see `leafcheck model path`) for meaningful results.")
            .dim()
    )
}

/// Full text report for one diagnosis.
pub fn render_diagnosis(diagnosis: &Diagnosis) -> String {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let mut out = String::new();

    let format = diagnosis.format.as_deref().unwrap_or("image");
    out.push_str(&format!(
        "\n  {}  {}\n",
        bold.apply_to(&diagnosis.source_name),
        dim.apply_to(format!(
            "{}×{} {}",
            diagnosis.width, diagnosis.height, format
        ))
    ));

    if diagnosis.is_degraded() {
        out.push_str(&format!("\n{}\n", degraded_banner(&diagnosis.model)));
    }

    out.push_str(&format!("\n  {}\n", bold.apply_to("Top predictions")));
    for (rank, p) in diagnosis.predictions.iter().enumerate() {
        let prediction = &p.prediction;
        out.push_str(&format!(
            "  {:>2}. {} {:<45} {:>7}  {}\n",
            rank + 1,
            tier_marker(prediction.tier),
            prediction.display_name,
            format_confidence(prediction.confidence),
            dim.apply_to(prediction.tier)
        ));
    }

    if let Some(top) = diagnosis.top() {
        out.push('\n');
        out.push_str(&render_disease(&top.prediction.label, &top.info));
    }

    out.push_str(&format!("\n  {}\n", dim.apply_to(DISCLAIMER)));
    out.push_str(&format!(
        "  {}\n",
        dim.apply_to(format!("Diagnosed in {} ms", diagnosis.elapsed_ms))
    ));
    out
}

/// Description, symptoms, treatment and prevention for one category.
pub fn render_disease(label: &str, info: &DiseaseInfo) -> String {
    let bold = Style::new().bold();
    let cyan = Style::new().cyan();
    let mut out = String::new();

    out.push_str(&format!(
        "  {}  {}\n",
        bold.apply_to(display_name(label)),
        style(format!("(severity: {})", info.severity)).dim()
    ));
    out.push_str(&format!("  {}\n", info.description));

    for (heading, items) in [
        ("Symptoms", &info.symptoms),
        ("Treatment", &info.treatment),
        ("Prevention", &info.prevention),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("\n  {}\n", cyan.apply_to(heading)));
        for item in items {
            out.push_str(&format!("    - {item}\n"));
        }
    }

    if info.is_serious() {
        out.push_str(&format!(
            "\n  {}\n",
            style(format!("! {SERIOUS_WARNING}")).red().bold()
        ));
    }
    out
}
