//! Upload form controller: two file slots, a weighting slider and the
//! submit cycle.
//!
//! Input arrives as [`UiEvent`]s through [`UploadController::dispatch`].
//! Submitting is a two-step affair, [`UploadController::begin_submit`] and
//! [`UploadController::finish_submit`], joined by
//! [`UploadController::submit`] for callers that just want to await one
//! [`CompareService`] call.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::client::{CompareForm, CompareService};
use crate::error::CompareError;
use crate::model::{ComparisonResult, Slot};
use crate::render;
use crate::view::{Effect, PageView, SliderView, SUBMIT_BUSY_LABEL};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// A file held by an upload slot.
#[derive(Clone, PartialEq)]
pub struct PdfFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PdfFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PdfFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        PdfFile {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk. The media type comes from the extension only,
    /// the way a browser labels a picked file.
    pub fn from_path(path: &Path) -> Result<Self, CompareError> {
        let bytes = std::fs::read(path)
            .map_err(|e| CompareError::io(format!("reading {}", path.display()), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(PdfFile::new(name, media_type_for(path), bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

pub fn media_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
        _ => FALLBACK_MEDIA_TYPE,
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    DragOver(Slot),
    DragLeave(Slot),
    /// A file dropped onto an upload box. Only `application/pdf` is taken.
    Drop(Slot, PdfFile),
    /// A file chosen through the file picker. Not type-checked.
    Pick(Slot, PdfFile),
    /// New slider position, in [0, 1].
    WeightInput(f64),
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// Identifies one submission. Tokens increase monotonically per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubmissionToken(u64);

#[derive(Debug, Clone)]
pub struct Submission {
    pub token: SubmissionToken,
    pub form: CompareForm,
}

/// What a finished submission produced.
#[derive(Debug, Default)]
pub struct SubmitOutcome {
    pub effects: Vec<Effect>,
    /// The rendered result, handed back to the caller once the view has been
    /// updated from it.
    pub result: Option<ComparisonResult>,
}

impl SubmitOutcome {
    pub fn alert(&self) -> Option<&str> {
        self.effects.iter().find_map(|e| match e {
            Effect::Alert(msg) => Some(msg.as_str()),
            _ => None,
        })
    }
}

struct InFlight {
    token: SubmissionToken,
    original_label: String,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct UploadController {
    page: PageView,
    files: [Option<PdfFile>; 2],
    last_token: u64,
    in_flight: Option<InFlight>,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a slider position other than the default.
    pub fn with_weight(weight: f64) -> Self {
        let mut controller = Self::default();
        controller.page.slider = SliderView::new(weight);
        controller
    }

    pub fn page(&self) -> &PageView {
        &self.page
    }

    pub fn file(&self, slot: Slot) -> Option<&PdfFile> {
        self.files[slot.index()].as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::DragOver(slot) => self.page.upload_box_mut(slot).drag_over = true,
            UiEvent::DragLeave(slot) => self.page.upload_box_mut(slot).drag_over = false,
            UiEvent::Drop(slot, file) => {
                self.page.upload_box_mut(slot).drag_over = false;
                if file.is_pdf() {
                    self.accept(slot, file);
                } else {
                    debug!(%slot, media_type = %file.media_type, "ignoring non-PDF drop");
                }
            }
            UiEvent::Pick(slot, file) => self.accept(slot, file),
            UiEvent::WeightInput(value) => self.page.slider = SliderView::new(value),
        }
    }

    fn accept(&mut self, slot: Slot, file: PdfFile) {
        debug!(%slot, name = %file.name, bytes = file.bytes.len(), "file selected");
        self.page.upload_box_mut(slot).label = file.name.clone();
        self.files[slot.index()] = Some(file);
    }

    /// Disable the button and snapshot the form. Returns `None` while another
    /// submission is still in flight.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.in_flight.is_some() || self.page.submit.disabled {
            debug!("submit ignored: a comparison is already running");
            return None;
        }

        self.last_token += 1;
        let token = SubmissionToken(self.last_token);
        let original_label = std::mem::replace(
            &mut self.page.submit.label,
            SUBMIT_BUSY_LABEL.to_string(),
        );
        self.page.submit.disabled = true;
        self.in_flight = Some(InFlight {
            token,
            original_label,
        });

        info!(token = token.0, "submitting documents for comparison");
        Some(Submission {
            token,
            form: CompareForm {
                files: self.files.clone(),
                weight_text: self.page.slider.value,
            },
        })
    }

    /// Apply the outcome of a submission. Outcomes for anything but the
    /// latest token are dropped without touching the page.
    pub fn finish_submit(
        &mut self,
        token: SubmissionToken,
        outcome: Result<ComparisonResult, CompareError>,
    ) -> SubmitOutcome {
        if token.0 != self.last_token {
            warn!(token = token.0, latest = self.last_token, "discarding stale comparison result");
            return SubmitOutcome::default();
        }

        let mut effects = Vec::new();
        let result = match outcome {
            Ok(result) => {
                let patch = render::render(&result);
                let typeset = patch.typeset;
                self.page.results.apply(patch);
                self.page.results.visible = true;
                if typeset {
                    effects.push(Effect::Typeset);
                }
                effects.push(Effect::ScrollIntoView { smooth: true });
                info!(token = token.0, "comparison rendered");
                Some(result)
            }
            Err(e) => {
                warn!(token = token.0, error = %e, "comparison failed");
                effects.push(Effect::Alert(e.alert_message()));
                None
            }
        };

        if let Some(in_flight) = self.in_flight.take() {
            self.page.submit.label = in_flight.original_label;
        }
        self.page.submit.disabled = false;

        SubmitOutcome { effects, result }
    }

    /// Run a whole submission against `service`: exactly one `compare` call,
    /// and the button is restored whatever the outcome. Returns an empty
    /// outcome if a submission was already running.
    pub async fn submit<S: CompareService>(&mut self, service: &S) -> SubmitOutcome {
        let Some(submission) = self.begin_submit() else {
            return SubmitOutcome::default();
        };
        let outcome = service.compare(&submission.form).await;
        self.finish_submit(submission.token, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NO_VARIATIONS_HTML;
    use crate::view::{DEFAULT_UPLOAD_LABEL, SUBMIT_LABEL};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pdf(name: &str) -> PdfFile {
        PdfFile::new(name, PDF_MEDIA_TYPE, b"%PDF-1.7".to_vec())
    }

    fn png(name: &str) -> PdfFile {
        PdfFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    struct Canned {
        calls: AtomicUsize,
        reply: fn() -> Result<ComparisonResult, CompareError>,
    }

    impl Canned {
        fn new(reply: fn() -> Result<ComparisonResult, CompareError>) -> Self {
            Canned {
                calls: AtomicUsize::new(0),
                reply,
            }
        }
    }

    impl CompareService for Canned {
        async fn compare(&self, _form: &CompareForm) -> Result<ComparisonResult, CompareError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    // -- file acquisition --

    #[test]
    fn test_drop_pdf_sets_file_and_label() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::DragOver(Slot::First));
        assert!(c.page().upload_box(Slot::First).drag_over);
        c.dispatch(UiEvent::Drop(Slot::First, pdf("a.pdf")));
        assert_eq!(c.page().upload_box(Slot::First).label, "a.pdf");
        assert!(!c.page().upload_box(Slot::First).drag_over);
        assert_eq!(c.file(Slot::First).map(|f| f.name.as_str()), Some("a.pdf"));
        assert!(c.file(Slot::Second).is_none());
    }

    #[test]
    fn test_drop_png_is_silently_ignored() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::Pick(Slot::Second, pdf("before.pdf")));
        c.dispatch(UiEvent::DragOver(Slot::Second));
        c.dispatch(UiEvent::Drop(Slot::Second, png("photo.png")));
        assert_eq!(c.page().upload_box(Slot::Second).label, "before.pdf");
        assert_eq!(c.file(Slot::Second).map(|f| f.name.as_str()), Some("before.pdf"));
        assert!(!c.page().upload_box(Slot::Second).drag_over);
    }

    #[test]
    fn test_drop_png_on_empty_box_keeps_default_label() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::Drop(Slot::First, png("photo.png")));
        assert_eq!(c.page().upload_box(Slot::First).label, DEFAULT_UPLOAD_LABEL);
        assert!(c.file(Slot::First).is_none());
    }

    #[test]
    fn test_pick_is_not_type_checked() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::Pick(Slot::First, png("photo.png")));
        assert_eq!(c.page().upload_box(Slot::First).label, "photo.png");
        assert!(c.file(Slot::First).is_some());
    }

    #[test]
    fn test_new_file_replaces_previous() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::Pick(Slot::First, pdf("one.pdf")));
        c.dispatch(UiEvent::Drop(Slot::First, pdf("two.pdf")));
        assert_eq!(c.file(Slot::First).map(|f| f.name.as_str()), Some("two.pdf"));
        assert_eq!(c.page().upload_box(Slot::First).label, "two.pdf");
    }

    #[test]
    fn test_drag_leave_clears_highlight() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::DragOver(Slot::Second));
        c.dispatch(UiEvent::DragLeave(Slot::Second));
        assert!(!c.page().upload_box(Slot::Second).drag_over);
    }

    #[test]
    fn test_weight_input_updates_slider() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::WeightInput(0.25));
        assert_eq!(c.page().slider.value, 0.25);
        assert!(c.page().slider.background.contains("25%"));
    }

    #[test]
    fn test_media_type_for_extension() {
        assert_eq!(media_type_for(Path::new("a.pdf")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("A.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("a.png")), FALLBACK_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("noext")), FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.4 body").expect("write");
        let file = PdfFile::from_path(&path).expect("read");
        assert_eq!(file.name, "scan.pdf");
        assert!(file.is_pdf());
        assert_eq!(file.bytes, b"%PDF-1.4 body");
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = PdfFile::from_path(&dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(err, CompareError::Io { .. }));
    }

    #[test]
    fn test_debug_omits_bytes() {
        let s = format!("{:?}", pdf("a.pdf"));
        assert!(s.contains("len: 8"));
        assert!(!s.contains("37"));
    }

    // -- submission --

    #[test]
    fn test_begin_submit_disables_and_snapshots() {
        let mut c = UploadController::with_weight(0.3);
        c.dispatch(UiEvent::Pick(Slot::First, pdf("a.pdf")));
        c.dispatch(UiEvent::Pick(Slot::Second, pdf("b.pdf")));
        let s = c.begin_submit().expect("submission");
        assert!(c.page().submit.disabled);
        assert_eq!(c.page().submit.label, SUBMIT_BUSY_LABEL);
        assert_eq!(s.form.weight_text, 0.3);
        assert_eq!(s.form.file(Slot::Second).map(|f| f.name.as_str()), Some("b.pdf"));
    }

    #[test]
    fn test_second_begin_while_in_flight_is_ignored() {
        let mut c = UploadController::new();
        let first = c.begin_submit();
        assert!(first.is_some());
        assert!(c.begin_submit().is_none());
        assert!(c.is_submitting());
    }

    #[test]
    fn test_success_restores_button_and_reveals_results() {
        let mut c = UploadController::new();
        let s = c.begin_submit().expect("submission");
        let out = c.finish_submit(
            s.token,
            Ok(ComparisonResult {
                text_similarity: Some(0.9),
                ..Default::default()
            }),
        );
        assert_eq!(c.page().submit.label, SUBMIT_LABEL);
        assert!(!c.page().submit.disabled);
        assert!(c.page().results.visible);
        assert_eq!(c.page().results.text_similarity.as_deref(), Some("90.0%"));
        assert_eq!(c.page().results.variations_for(Slot::First), Some(NO_VARIATIONS_HTML));
        assert_eq!(out.effects, vec![Effect::ScrollIntoView { smooth: true }]);
        assert!(out.result.is_some());
        assert!(!c.is_submitting());
    }

    #[test]
    fn test_failure_restores_button_and_alerts() {
        let mut c = UploadController::new();
        let s = c.begin_submit().expect("submission");
        let out = c.finish_submit(
            s.token,
            Err(CompareError::Server {
                status: 500,
                message: "bad pdf".to_string(),
            }),
        );
        assert_eq!(out.alert(), Some("bad pdf"));
        assert_eq!(out.effects.len(), 1);
        assert_eq!(c.page().submit.label, SUBMIT_LABEL);
        assert!(!c.page().submit.disabled);
        assert!(!c.page().results.visible);
    }

    #[test]
    fn test_stale_token_does_not_touch_page() {
        let mut c = UploadController::new();
        let first = c.begin_submit().expect("first");
        c.finish_submit(first.token, Err(CompareError::Transport("down".to_string())));
        let second = c.begin_submit().expect("second");

        let before = c.page().clone();
        let out = c.finish_submit(
            first.token,
            Ok(ComparisonResult {
                similarity_index: Some(0.1),
                ..Default::default()
            }),
        );
        assert!(out.effects.is_empty());
        assert!(out.result.is_none());
        assert_eq!(c.page(), &before);
        assert!(c.is_submitting());

        c.finish_submit(second.token, Ok(ComparisonResult::default()));
        assert!(!c.is_submitting());
        assert!(second.token > first.token);
    }

    #[test]
    fn test_typeset_requested_for_inconsistencies() {
        let mut c = UploadController::new();
        let s = c.begin_submit().expect("submission");
        let result: ComparisonResult = serde_json::from_str(
            r#"{"text_consistency": {"doc1": [{"line_number": 2, "segment_text": "x^2",
                "similarity_score": 0.02}], "doc2": []}}"#,
        )
        .expect("deser");
        let out = c.finish_submit(s.token, Ok(result));
        assert_eq!(
            out.effects,
            vec![Effect::Typeset, Effect::ScrollIntoView { smooth: true }]
        );
    }

    #[test]
    fn test_later_render_overwrites_earlier() {
        let mut c = UploadController::new();
        let s = c.begin_submit().expect("first");
        let first: ComparisonResult = serde_json::from_str(
            r#"{"variations": {"document1": [{"from_page": 1, "to_page": 2, "changes": []}]},
                "report_url": "/r1.pdf", "similarity_index": 0.4}"#,
        )
        .expect("deser");
        c.finish_submit(s.token, Ok(first));
        assert!(c.page().results.variations_for(Slot::First).unwrap().contains("Pages 1 → 2"));

        let s = c.begin_submit().expect("second");
        c.finish_submit(s.token, Ok(ComparisonResult::default()));
        assert_eq!(c.page().results.variations_for(Slot::First), Some(NO_VARIATIONS_HTML));
        assert!(!c.page().results.report_link.visible);
        // Scores absent from the second payload keep their earlier text.
        assert_eq!(c.page().results.similarity_index.as_deref(), Some("40.0%"));
    }

    #[test]
    fn test_submit_makes_exactly_one_call() {
        let mut c = UploadController::new();
        c.dispatch(UiEvent::Pick(Slot::First, pdf("a.pdf")));
        c.dispatch(UiEvent::Pick(Slot::Second, pdf("b.pdf")));
        let service = Canned::new(|| Ok(ComparisonResult::default()));
        let out = tokio_test::block_on(c.submit(&service));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(out.alert().is_none());
        assert!(!c.page().submit.disabled);
    }

    #[tokio::test]
    async fn test_submit_error_path_restores_button() {
        let mut c = UploadController::new();
        let service = Canned::new(|| Err(CompareError::Transport(String::new())));
        let out = c.submit(&service).await;
        assert_eq!(out.alert(), Some(crate::error::ALERT_FALLBACK_MESSAGE));
        assert_eq!(c.page().submit.label, SUBMIT_LABEL);
        assert!(!c.page().submit.disabled);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}
