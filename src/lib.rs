//! Client for a PDF similarity analysis service.
//!
//! Two documents are uploaded to `POST /compare` together with a
//! text-vs-handwriting weight; the service answers with similarity scores,
//! per-page variations, semantic inconsistencies and handwriting anomalies.
//!
//! - [`upload`] owns the form state and the submit cycle.
//! - [`client`] speaks the multipart/JSON protocol.
//! - [`render`] and [`sanitize`] turn a result into safe markup.
//! - [`view`] is the explicit page state the controller mutates.
//! - [`report`] and [`terminal`] present a result outside a browser.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod report;
pub mod sanitize;
pub mod terminal;
pub mod upload;
pub mod view;

pub use client::{CompareForm, CompareService, HttpCompareClient};
pub use config::Config;
pub use error::CompareError;
pub use model::{ComparisonResult, Slot};
pub use upload::{PdfFile, SubmitOutcome, UiEvent, UploadController};
pub use view::{Effect, PageView};
