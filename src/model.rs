//! Wire types for the comparison service's `/compare` response.
//!
//! Every collection is optional on the wire. A JSON `null` deserializes the
//! same as a missing field; the accessors hand back empty slices for both.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One of the two compared documents. Upload boxes, variation panels and
/// inconsistency panels are all indexed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::First, Slot::Second];

    /// Zero-based index, for arrays of per-document state.
    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }

    /// One-based number used in form field names and element ids.
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document {}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Response payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handwriting_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<Variations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_consistency: Option<TextConsistency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    /// Per-feature handwriting similarity, e.g. `line_break_similarity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_scores: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Anomalies>,
}

impl ComparisonResult {
    pub fn variations_for(&self, slot: Slot) -> &[Variation] {
        self.variations
            .as_ref()
            .map(|v| v.for_slot(slot))
            .unwrap_or(&[])
    }

    pub fn inconsistencies_for(&self, slot: Slot) -> &[Inconsistency] {
        self.text_consistency
            .as_ref()
            .map(|c| c.for_slot(slot))
            .unwrap_or(&[])
    }

    pub fn anomalies_for(&self, slot: Slot) -> &[Anomaly] {
        self.anomalies
            .as_ref()
            .map(|a| a.for_slot(slot))
            .unwrap_or(&[])
    }

    /// The report link, treating an empty string as absent.
    pub fn report_url(&self) -> Option<&str> {
        self.report_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variations {
    #[serde(default)]
    pub document1: Option<Vec<Variation>>,
    #[serde(default)]
    pub document2: Option<Vec<Variation>>,
}

impl Variations {
    pub fn for_slot(&self, slot: Slot) -> &[Variation] {
        let list = match slot {
            Slot::First => &self.document1,
            Slot::Second => &self.document2,
        };
        list.as_deref().unwrap_or(&[])
    }
}

/// A structural difference between two consecutive pages of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub from_page: i64,
    pub to_page: i64,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub description: String,
    /// Which page metric moved (`confidence`, `symbol_density`, `line_breaks`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextConsistency {
    #[serde(default)]
    pub doc1: Option<Vec<Inconsistency>>,
    #[serde(default)]
    pub doc2: Option<Vec<Inconsistency>>,
}

impl TextConsistency {
    pub fn for_slot(&self, slot: Slot) -> &[Inconsistency] {
        let list = match slot {
            Slot::First => &self.doc1,
            Slot::Second => &self.doc2,
        };
        list.as_deref().unwrap_or(&[])
    }
}

/// A line flagged as semantically unrelated to the line after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub line_number: i64,
    pub segment_text: String,
    /// Similarity to the *next* line, in [0, 1].
    pub similarity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_segment_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anomalies {
    #[serde(default)]
    pub document1: Option<Vec<Anomaly>>,
    #[serde(default)]
    pub document2: Option<Vec<Anomaly>>,
}

impl Anomalies {
    pub fn for_slot(&self, slot: Slot) -> &[Anomaly] {
        let list = match slot {
            Slot::First => &self.document1,
            Slot::Second => &self.document2,
        };
        list.as_deref().unwrap_or(&[])
    }
}

/// A paragraph whose handwriting metrics stray from its page's mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub page_number: i64,
    pub paragraph_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<MetricDeviation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_density: Option<MetricDeviation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_breaks: Option<MetricDeviation>,
}

impl Anomaly {
    /// One-based paragraph number for display; saturates at `i64::MAX`.
    pub fn paragraph_number(&self) -> i64 {
        self.paragraph_index.saturating_add(1)
    }

    /// Present metrics in a fixed order, paired with their display names.
    pub fn metrics(&self) -> Vec<(&'static str, &MetricDeviation)> {
        [
            ("confidence", &self.confidence),
            ("symbol density", &self.symbol_density),
            ("line breaks", &self.line_breaks),
        ]
        .into_iter()
        .filter_map(|(name, m)| m.as_ref().map(|m| (name, m)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDeviation {
    pub value: f64,
    pub mean: f64,
    /// Distance from the mean in standard deviations.
    pub deviation: f64,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
