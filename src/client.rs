//! HTTP contract with the comparison service.
//!
//! `POST {server_url}/compare` with a multipart body:
//!
//! | part          | content                                   |
//! |---------------|-------------------------------------------|
//! | `file1`       | first document (omitted when slot empty)  |
//! | `file2`       | second document (omitted when slot empty) |
//! | `weight_text` | text-vs-handwriting weight, decimal text  |
//!
//! A 2xx reply carries a [`ComparisonResult`]; anything else carries
//! `{ "error": "..." }`.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{CompareError, SERVER_FALLBACK_MESSAGE};
use crate::model::{ComparisonResult, ErrorBody, Slot};
use crate::upload::PdfFile;

/// Snapshot of the upload form at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareForm {
    pub files: [Option<PdfFile>; 2],
    pub weight_text: f64,
}

impl CompareForm {
    pub fn file(&self, slot: Slot) -> Option<&PdfFile> {
        self.files[slot.index()].as_ref()
    }

    /// Build the multipart body. Each call copies the file bytes.
    pub fn to_multipart(&self) -> Result<Form, CompareError> {
        let mut form = Form::new();
        for slot in Slot::ALL {
            if let Some(file) = self.file(slot) {
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.name.clone())
                    .mime_str(&file.media_type)
                    .map_err(|e| CompareError::Transport(e.to_string()))?;
                form = form.part(format!("file{}", slot.number()), part);
            }
        }
        Ok(form.text("weight_text", self.weight_text.to_string()))
    }
}

/// Something that can run a comparison. The controller is generic over it so
/// tests can substitute a canned service.
pub trait CompareService {
    fn compare(
        &self,
        form: &CompareForm,
    ) -> impl Future<Output = Result<ComparisonResult, CompareError>> + Send;
}

// ---------------------------------------------------------------------------
// reqwest implementation
// ---------------------------------------------------------------------------

pub struct HttpCompareClient {
    client: Client,
    endpoint: String,
}

impl HttpCompareClient {
    /// `server_url` is the service root; `/compare` is appended.
    pub fn new(server_url: &str, timeout: Option<Duration>) -> Result<Self, CompareError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CompareError::Transport(e.to_string()))?;
        Ok(HttpCompareClient {
            client,
            endpoint: compare_endpoint(server_url),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CompareError> {
        Self::new(
            &config.server_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompareService for HttpCompareClient {
    async fn compare(&self, form: &CompareForm) -> Result<ComparisonResult, CompareError> {
        let body = form.to_multipart()?;
        debug!(
            endpoint = %self.endpoint,
            file1 = form.file(Slot::First).map(|f| f.name.as_str()),
            file2 = form.file(Slot::Second).map(|f| f.name.as_str()),
            weight_text = form.weight_text,
            "posting comparison request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let parsed: ErrorBody = serde_json::from_slice(&bytes)?;
            let message = parsed
                .error
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| SERVER_FALLBACK_MESSAGE.to_string());
            warn!(status = status.as_u16(), %message, "comparison service returned an error");
            return Err(CompareError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let result: ComparisonResult = serde_json::from_slice(&bytes)?;
        debug!(status = status.as_u16(), "comparison result decoded");
        Ok(result)
    }
}

/// Join the service root and `/compare`, tolerating a trailing slash.
pub fn compare_endpoint(server_url: &str) -> String {
    format!("{}/compare", server_url.trim_end_matches('/'))
}

/// Resolve a report link from the service against its root URL. Absolute
/// links pass through unchanged.
pub fn resolve_report_url(server_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!(
            "{}/{}",
            server_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}
