//! Explicit view state for the comparison page.
//!
//! Instead of mutating a document in place, the controller owns a
//! [`PageView`] and hands out [`Effect`]s for the things a host must do
//! outside of it (alerts, scrolling, math typesetting).

use crate::model::Slot;
use crate::render::ResultsPatch;

pub const DEFAULT_UPLOAD_LABEL: &str = "Drag & drop a PDF or click to browse";
pub const SUBMIT_LABEL: &str = "Compare Documents";
pub const SUBMIT_BUSY_LABEL: &str = "Analyzing...";
pub const DEFAULT_WEIGHT: f64 = 0.5;

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Side effects the host performs after a controller call.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show a blocking, user-facing alert with this message.
    Alert(String),
    /// Bring the results region into view.
    ScrollIntoView { smooth: bool },
    /// Ask the math typesetter, if the host has one, to reprocess the
    /// results region. Never awaited by the controller.
    Typeset,
}

// ---------------------------------------------------------------------------
// Upload boxes, button, slider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct UploadBoxView {
    pub label: String,
    pub drag_over: bool,
}

impl Default for UploadBoxView {
    fn default() -> Self {
        UploadBoxView {
            label: DEFAULT_UPLOAD_LABEL.to_string(),
            drag_over: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

impl Default for SubmitButton {
    fn default() -> Self {
        SubmitButton {
            label: SUBMIT_LABEL.to_string(),
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderView {
    pub value: f64,
    /// CSS `background` value whose fill tracks `value`.
    pub background: String,
}

impl SliderView {
    pub fn new(value: f64) -> Self {
        SliderView {
            value,
            background: slider_background(value),
        }
    }
}

impl Default for SliderView {
    fn default() -> Self {
        SliderView::new(DEFAULT_WEIGHT)
    }
}

/// Gradient for a slider at `value` in [0, 1]; the filled share is
/// `value * 100` percent, printed as the shortest decimal.
pub fn slider_background(value: f64) -> String {
    let progress = value * 100.0;
    format!(
        "linear-gradient(to right, var(--accent-color) {progress}%, #e5e5e5 {progress}%)"
    )
}

// ---------------------------------------------------------------------------
// Results region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLink {
    pub href: Option<String>,
    pub visible: bool,
}

/// Contents of the results region. Slots that have never been written are
/// `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsView {
    pub visible: bool,
    pub text_similarity: Option<String>,
    pub handwriting_similarity: Option<String>,
    pub similarity_index: Option<String>,
    pub feature_scores: Option<String>,
    pub variations: [Option<String>; 2],
    pub semantics: [Option<String>; 2],
    pub anomalies: [Option<String>; 2],
    pub report_link: ReportLink,
}

impl ResultsView {
    /// Overwrite the slots the patch carries. Absent score fields keep their
    /// previous text; panels are replaced wholesale.
    pub fn apply(&mut self, patch: ResultsPatch) {
        if let Some(text) = patch.text_similarity {
            self.text_similarity = Some(text);
        }
        if let Some(text) = patch.handwriting_similarity {
            self.handwriting_similarity = Some(text);
        }
        if let Some(text) = patch.similarity_index {
            self.similarity_index = Some(text);
        }
        if let Some(html) = patch.feature_scores {
            self.feature_scores = Some(html);
        }
        self.variations = patch.variations.map(Some);
        self.semantics = patch.semantics.map(Some);
        self.anomalies = patch.anomalies.map(Some);
        self.report_link = match patch.report_href {
            Some(href) => ReportLink {
                href: Some(href),
                visible: true,
            },
            None => ReportLink::default(),
        };
    }

    pub fn variations_for(&self, slot: Slot) -> Option<&str> {
        self.variations[slot.index()].as_deref()
    }

    pub fn semantics_for(&self, slot: Slot) -> Option<&str> {
        self.semantics[slot.index()].as_deref()
    }

    pub fn anomalies_for(&self, slot: Slot) -> Option<&str> {
        self.anomalies[slot.index()].as_deref()
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    pub upload_boxes: [UploadBoxView; 2],
    pub submit: SubmitButton,
    pub slider: SliderView,
    pub results: ResultsView,
}

impl PageView {
    pub fn upload_box(&self, slot: Slot) -> &UploadBoxView {
        &self.upload_boxes[slot.index()]
    }

    pub fn upload_box_mut(&mut self, slot: Slot) -> &mut UploadBoxView {
        &mut self.upload_boxes[slot.index()]
    }
}
