//! Standalone HTML report built from the results region.
//!
//! The page is an embedded template with `{{slot}}` placeholders; slot
//! contents come from a [`ResultsView`] and are already sanitized markup.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::error::CompareError;
use crate::model::Slot;
use crate::sanitize::escape_html;
use crate::view::ResultsView;

pub const MATHJAX_SCRIPT: &str = r#"<script>window.MathJax={tex:{inlineMath:[['$','$']]}};</script>
<script async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>"#;

const EMPTY_SCORE: &str = "--";

pub const REPORT_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>PDF Similarity Report</title>
<style>
:root{--accent-color:#4f46e5}
*{margin:0;padding:0;box-sizing:border-box}
body{background:#f7f7f8;color:#1f2933;font-family:-apple-system,'Segoe UI',Roboto,sans-serif;line-height:1.5;padding:32px}
h1{font-size:1.4rem;margin-bottom:20px;color:var(--accent-color)}
h2{font-size:1rem;margin:24px 0 10px;text-transform:uppercase;letter-spacing:.5px;color:#52606d}
h3{font-size:.85rem;margin-bottom:8px;color:#7b8794}
.scores{display:grid;grid-template-columns:repeat(3,1fr);gap:12px}
.score-card{background:#fff;border:1px solid #e4e7eb;border-radius:8px;padding:16px}
.score-label{font-size:.75rem;color:#7b8794;text-transform:uppercase}
.score-value{font-size:1.6rem;font-weight:600}
.columns{display:grid;grid-template-columns:1fr 1fr;gap:16px}
.panel{background:#fff;border:1px solid #e4e7eb;border-radius:8px;padding:14px;min-height:48px}
.variation-item,.inconsistency-item,.anomaly-item{border-bottom:1px solid #f0f0f0;padding:8px 0}
.variation-pages,.line-info,.anomaly-location{font-weight:600;font-size:.85rem}
.variation-change,.anomaly-metric{font-size:.85rem;color:#52606d}
.segment-text{margin:4px 0;font-family:'Fira Code',monospace;font-size:.85rem;white-space:pre-wrap}
.feature-score{display:flex;justify-content:space-between;padding:4px 0}
.similarity-low{color:#c81e1e}.similarity-medium{color:#b7791f}.similarity-high{color:#057a55}
.no-variations,.no-inconsistencies,.no-anomalies{color:#9aa5b1;font-style:italic}
#report-link{display:inline-block;margin-top:24px;color:var(--accent-color)}
</style>
{{mathjax}}
</head>
<body>
<h1>PDF Similarity Report</h1>
<div class="scores">
<div class="score-card"><div class="score-label">Text similarity</div><div class="score-value" id="text-similarity">{{text_similarity}}</div></div>
<div class="score-card"><div class="score-label">Handwriting similarity</div><div class="score-value" id="handwriting-similarity">{{handwriting_similarity}}</div></div>
<div class="score-card"><div class="score-label">Similarity index</div><div class="score-value" id="similarity-index">{{similarity_index}}</div></div>
</div>
{{feature_scores}}
<h2>Page variations</h2>
<div class="columns">
<div><h3>Document 1</h3><div class="panel" id="variations-doc1">{{variations_doc1}}</div></div>
<div><h3>Document 2</h3><div class="panel" id="variations-doc2">{{variations_doc2}}</div></div>
</div>
<h2>Semantic consistency</h2>
<div class="columns">
<div><h3>Document 1</h3><div class="panel" id="semantics-doc1">{{semantics_doc1}}</div></div>
<div><h3>Document 2</h3><div class="panel" id="semantics-doc2">{{semantics_doc2}}</div></div>
</div>
<h2>Handwriting anomalies</h2>
<div class="columns">
<div><h3>Document 1</h3><div class="panel" id="anomalies-doc1">{{anomalies_doc1}}</div></div>
<div><h3>Document 2</h3><div class="panel" id="anomalies-doc2">{{anomalies_doc2}}</div></div>
</div>
{{report_link}}
</body>
</html>
"##;

/// Render the report page. `typeset` says whether the results contain math
/// that wants MathJax; `mathjax` is the user's switch for loading it at all.
pub fn render_report(results: &ResultsView, typeset: bool, mathjax: bool) -> String {
    let score = |s: &Option<String>| {
        s.as_deref()
            .map(escape_html)
            .unwrap_or_else(|| EMPTY_SCORE.to_string())
    };
    let panel = |p: Option<&str>| p.unwrap_or_default().to_string();

    let feature_scores = results
        .feature_scores
        .as_deref()
        .map(|html| {
            format!("<h2>Feature scores</h2>\n<div class=\"panel\" id=\"feature-scores\">{html}</div>")
        })
        .unwrap_or_default();

    let report_link = match (&results.report_link.href, results.report_link.visible) {
        (Some(href), true) => format!(
            "<a id=\"report-link\" href=\"{}\" target=\"_blank\">Download PDF report</a>",
            escape_html(href)
        ),
        _ => String::new(),
    };

    let script = if typeset && mathjax { MATHJAX_SCRIPT } else { "" };

    let slots: [(&str, String); 12] = [
        ("{{mathjax}}", script.to_string()),
        ("{{text_similarity}}", score(&results.text_similarity)),
        ("{{handwriting_similarity}}", score(&results.handwriting_similarity)),
        ("{{similarity_index}}", score(&results.similarity_index)),
        ("{{feature_scores}}", feature_scores),
        ("{{variations_doc1}}", panel(results.variations_for(Slot::First))),
        ("{{variations_doc2}}", panel(results.variations_for(Slot::Second))),
        ("{{semantics_doc1}}", panel(results.semantics_for(Slot::First))),
        ("{{semantics_doc2}}", panel(results.semantics_for(Slot::Second))),
        ("{{anomalies_doc1}}", panel(results.anomalies_for(Slot::First))),
        ("{{anomalies_doc2}}", panel(results.anomalies_for(Slot::Second))),
        ("{{report_link}}", report_link),
    ];

    fill_template(REPORT_HTML, &slots)
}

/// Substitute placeholders in one left-to-right scan, so slot contents are
/// never themselves searched for placeholders.
fn fill_template(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 4096);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match slots.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `{dir}/similarity-report-{unix seconds}.html`.
pub fn default_report_path(dir: &Path) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    dir.join(format!("similarity-report-{secs}.html"))
}

/// Write `html` to `path`, creating parent directories as needed.
pub fn write_report(path: &Path, html: &str) -> Result<(), CompareError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CompareError::io(format!("creating {}", parent.display()), e))?;
    }
    std::fs::write(path, html)
        .map_err(|e| CompareError::io(format!("writing report {}", path.display()), e))?;
    info!(path = %path.display(), bytes = html.len(), "report written");
    Ok(())
}
