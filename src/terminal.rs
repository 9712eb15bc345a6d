//! Terminal summary of a comparison, for the command-line host.

use colored::*;

use crate::model::{ComparisonResult, Slot};
use crate::render::{
    difference_percentage, format_percentage, humanize_feature, to_fixed, SimilarityLevel,
};
use crate::sanitize::strip_control;

const RULE_WIDTH: usize = 50;

fn paint_score(score: f64, color: bool) -> String {
    let text = format_percentage(score);
    if !color {
        return text;
    }
    match SimilarityLevel::from_score(score) {
        SimilarityLevel::Low => text.bright_red().bold().to_string(),
        SimilarityLevel::Medium => text.bright_yellow().bold().to_string(),
        SimilarityLevel::High => text.bright_green().bold().to_string(),
    }
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bright_cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

fn label(text: &str, color: bool) -> String {
    if color {
        text.bright_yellow().to_string()
    } else {
        text.to_string()
    }
}

fn rule(color: bool) -> String {
    let line = "=".repeat(RULE_WIDTH);
    if color {
        line.bright_blue().to_string()
    } else {
        line
    }
}

/// Multi-line summary. Absent scores print as `--`. Text from the service is
/// stripped of control characters.
pub fn format_summary(result: &ComparisonResult, color: bool) -> String {
    let mut out = Vec::new();
    out.push(rule(color));
    out.push(heading("PDF SIMILARITY", color));
    out.push(rule(color));

    let scores = [
        ("Text similarity", result.text_similarity),
        ("Handwriting similarity", result.handwriting_similarity),
        ("Similarity index", result.similarity_index),
    ];
    for (name, score) in scores {
        let value = score
            .map(|s| paint_score(s, color))
            .unwrap_or_else(|| "--".to_string());
        out.push(format!("{}: {}", label(name, color), value));
    }

    if let Some(features) = result.feature_scores.as_ref().filter(|f| !f.is_empty()) {
        out.push(String::new());
        out.push(heading("Feature scores", color));
        for (name, score) in features {
            let name = strip_control(&humanize_feature(name));
            out.push(format!("  {}: {}", name, paint_score(*score, color)));
        }
    }

    for slot in Slot::ALL {
        out.push(String::new());
        out.push(heading(&format!("Document {}", slot.number()), color));

        let variations = result.variations_for(slot);
        if variations.is_empty() {
            out.push("  No significant variations detected".to_string());
        }
        for v in variations {
            out.push(format!("  {} {} → {}", label("Pages", color), v.from_page, v.to_page));
            for change in &v.changes {
                out.push(format!("    • {}", strip_control(&change.description)));
            }
        }

        let inconsistencies = result.inconsistencies_for(slot);
        if inconsistencies.is_empty() {
            out.push("  No significant semantic inconsistencies detected".to_string());
        }
        for inc in inconsistencies {
            out.push(format!(
                "  {} {}: {} ({}% different from next line)",
                label("Line", color),
                inc.line_number,
                strip_control(inc.segment_text.trim()),
                difference_percentage(inc.similarity_score)
            ));
        }

        for anomaly in result.anomalies_for(slot) {
            let metrics: Vec<String> = anomaly
                .metrics()
                .into_iter()
                .map(|(name, m)| format!("{name} {}σ", to_fixed(m.deviation, 1)))
                .collect();
            out.push(format!(
                "  {} page {}, paragraph {}: {}",
                label("Anomaly", color),
                anomaly.page_number,
                anomaly.paragraph_number(),
                metrics.join(", ")
            ));
        }
    }

    if let Some(url) = result.report_url() {
        out.push(String::new());
        out.push(format!("{}: {}", label("Server report", color), strip_control(url)));
    }
    out.push(rule(color));
    out.join("\n")
}

pub fn print_summary(result: &ComparisonResult, color: bool) {
    println!("{}", format_summary(result, color));
}

/// Print an alert message to stderr.
pub fn print_alert(message: &str, color: bool) {
    let message = strip_control(message);
    if color {
        eprintln!("{} {}", "error:".bright_red().bold(), message);
    } else {
        eprintln!("error: {message}");
    }
}
