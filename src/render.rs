//! Turns a [`ComparisonResult`] into display-ready markup.
//!
//! Rendering is pure: [`render`] returns a [`ResultsPatch`] describing what
//! each results slot should contain, and the view layer decides how to apply
//! it. All service-provided text passes through [`crate::sanitize`] before it
//! is embedded.

use std::collections::BTreeMap;

use crate::model::{Anomaly, ComparisonResult, Inconsistency, Slot, Variation};
use crate::sanitize::{escape_html, escape_math, is_math_segment};

pub const NO_VARIATIONS_HTML: &str =
    r#"<div class="no-variations">No significant variations detected</div>"#;

pub const NO_INCONSISTENCIES_HTML: &str =
    r#"<div class="no-inconsistencies">No significant semantic inconsistencies detected</div>"#;

pub const NO_ANOMALIES_HTML: &str =
    r#"<div class="no-anomalies">No handwriting anomalies detected</div>"#;

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// Desired content of every results slot after one render.
///
/// `None` score fields mean "leave the slot as it is". Panel arrays are
/// indexed by [`Slot::index`] and are always written.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPatch {
    pub text_similarity: Option<String>,
    pub handwriting_similarity: Option<String>,
    pub similarity_index: Option<String>,
    pub feature_scores: Option<String>,
    pub variations: [String; 2],
    pub semantics: [String; 2],
    pub anomalies: [String; 2],
    /// `Some` reveals the report link with this href, `None` hides it.
    pub report_href: Option<String>,
    /// Math content was inserted and should be re-typeset.
    pub typeset: bool,
}

/// Render a full comparison result.
pub fn render(result: &ComparisonResult) -> ResultsPatch {
    let mut typeset = false;
    let semantics = Slot::ALL.map(|slot| {
        let items = result.inconsistencies_for(slot);
        typeset |= !items.is_empty();
        render_inconsistencies(items)
    });

    ResultsPatch {
        text_similarity: result.text_similarity.map(format_percentage),
        handwriting_similarity: result.handwriting_similarity.map(format_percentage),
        similarity_index: result.similarity_index.map(format_percentage),
        feature_scores: result.feature_scores.as_ref().and_then(render_feature_scores),
        variations: Slot::ALL.map(|slot| render_variations(result.variations_for(slot))),
        semantics,
        anomalies: Slot::ALL.map(|slot| render_anomalies(result.anomalies_for(slot))),
        report_href: result.report_url().map(str::to_string),
        typeset,
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Format `value` with exactly `digits` decimals, rounding half up on the
/// exact decimal value of the double (`1.25` → `1.3`, `1.45` → `1.4`,
/// because the double nearest 1.45 lies just below it).
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", to_fixed(-value, digits));
    }
    // Normalizes -0.0, which would otherwise print a sign.
    let value = if value == 0.0 { 0.0 } else { value };

    // Enough extra precision that the printed expansion is exact for any
    // double that could sit on a rounding tie.
    let exact = format!("{:.*}", digits + 60, value);
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac_part.as_bytes();

    let mut kept: Vec<u8> = int_part.bytes().chain(frac[..digits].iter().copied()).collect();
    if frac.get(digits).is_some_and(|d| *d >= b'5') {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let mut out = String::from_utf8(kept).unwrap_or_default();
    if digits > 0 {
        out.insert(out.len() - digits, '.');
    }
    out
}

/// `0.8123` → `"81.2%"`.
pub fn format_percentage(score: f64) -> String {
    format!("{}%", to_fixed(score * 100.0, 1))
}

/// How different a line is from its successor, as `"N.N"` (no `%`).
pub fn difference_percentage(similarity_score: f64) -> String {
    to_fixed((1.0 - similarity_score) * 100.0, 1)
}

/// Coarse bucket for a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityLevel {
    Low,
    Medium,
    High,
}

impl SimilarityLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            SimilarityLevel::Low
        } else if score < 0.7 {
            SimilarityLevel::Medium
        } else {
            SimilarityLevel::High
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            SimilarityLevel::Low => "similarity-low",
            SimilarityLevel::Medium => "similarity-medium",
            SimilarityLevel::High => "similarity-high",
        }
    }
}

/// Bucket a similarity score into a CSS class.
pub fn similarity_class(score: f64) -> &'static str {
    SimilarityLevel::from_score(score).as_css()
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

pub fn render_variations(variations: &[Variation]) -> String {
    if variations.is_empty() {
        return NO_VARIATIONS_HTML.to_string();
    }

    let mut html = String::new();
    for variation in variations {
        html.push_str(r#"<div class="variation-item">"#);
        html.push_str(&format!(
            r#"<div class="variation-pages">Pages {} → {}</div>"#,
            variation.from_page, variation.to_page
        ));
        for change in &variation.changes {
            html.push_str(&format!(
                r#"<div class="variation-change">• {}</div>"#,
                escape_html(&change.description)
            ));
        }
        html.push_str("</div>");
    }
    html
}

pub fn render_inconsistencies(inconsistencies: &[Inconsistency]) -> String {
    if inconsistencies.is_empty() {
        return NO_INCONSISTENCIES_HTML.to_string();
    }

    let mut html = String::new();
    for inc in inconsistencies {
        html.push_str(r#"<div class="inconsistency-item">"#);
        html.push_str(&format!(
            r#"<div class="line-info">Line {}</div>"#,
            inc.line_number
        ));
        html.push_str(r#"<div class="segment-text">"#);
        html.push_str(&render_segment(&inc.segment_text));
        html.push_str("</div>");
        html.push_str(&format!(
            r#"<div class="similarity-indicator similarity-low">{}% different from next line</div>"#,
            difference_percentage(inc.similarity_score)
        ));
        html.push_str("</div>");
    }
    html
}

/// Trim a segment and pick the math or plain-text branch for it.
///
/// The math branch is HTML-encoded after math escaping. The browser decodes
/// the entities again, so the typesetter still reads the math-escaped text,
/// but a segment like `x_1 <img onerror=...>` cannot inject markup.
pub fn render_segment(segment_text: &str) -> String {
    let text = segment_text.trim();
    if is_math_segment(text) {
        format!(
            r#"<div class="latex-content">${}$</div>"#,
            escape_html(&escape_math(text))
        )
    } else {
        format!(r#"<div class="raw-text">{}</div>"#, escape_html(text))
    }
}

/// `None` for an empty map, so the slot keeps whatever it showed before.
pub fn render_feature_scores(scores: &BTreeMap<String, f64>) -> Option<String> {
    if scores.is_empty() {
        return None;
    }

    let mut html = String::new();
    for (name, score) in scores {
        html.push_str(&format!(
            r#"<div class="feature-score {}"><span class="feature-name">{}</span><span class="feature-value">{}</span></div>"#,
            similarity_class(*score),
            escape_html(&humanize_feature(name)),
            format_percentage(*score)
        ));
    }
    Some(html)
}

pub fn render_anomalies(anomalies: &[Anomaly]) -> String {
    if anomalies.is_empty() {
        return NO_ANOMALIES_HTML.to_string();
    }

    let mut html = String::new();
    for anomaly in anomalies {
        html.push_str(r#"<div class="anomaly-item">"#);
        html.push_str(&format!(
            r#"<div class="anomaly-location">Page {}, paragraph {}</div>"#,
            anomaly.page_number,
            anomaly.paragraph_number()
        ));
        for (name, metric) in anomaly.metrics() {
            html.push_str(&format!(
                r#"<div class="anomaly-metric">{}: {} vs. page mean {} ({}σ)</div>"#,
                name,
                to_fixed(metric.value, 2),
                to_fixed(metric.mean, 2),
                to_fixed(metric.deviation, 1)
            ));
        }
        html.push_str("</div>");
    }
    html
}

/// `"line_break_similarity"` → `"Line break similarity"`.
pub fn humanize_feature(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
