//! Publish outcomes and reporting.

use std::{cell::RefCell, fmt};

use serde::Serialize;
use tracing::{error, info, warn};

/// Outcome of publishing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishResult {
    /// Uploaded to remote storage.
    Uploaded,
    /// No remote storage configured; the staged file is served locally.
    LocalFallback { url: String },
    /// Upload (or staging) failed; the staged file, if any, is kept.
    UploadFailed { reason: String },
}

impl PublishResult {
    /// Whether the artifact is reachable by consumers.
    #[must_use]
    pub fn is_published(&self) -> bool {
        !matches!(self, Self::UploadFailed { .. })
    }
}

impl fmt::Display for PublishResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploaded => f.write_str("uploaded"),
            Self::LocalFallback { url } => write!(f, "published locally at {url}"),
            Self::UploadFailed { reason } => write!(f, "upload failed: {reason}"),
        }
    }
}

/// One published artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedFile {
    /// Artifact file name, e.g. `staging-pages.json`.
    pub file_name: String,

    /// Remote object key the artifact was (or would have been) uploaded to.
    pub destination: String,

    /// Outcome.
    pub result: PublishResult,
}

/// Outcome of the webhook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    /// No webhook configured for the environment.
    Skipped,
    /// Request completed with an HTTP status.
    Delivered(u16),
    /// Request could not be sent.
    Failed,
}

/// Summary of a publish run.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// Environment name.
    pub environment: String,

    /// Every artifact in publish order, sitemap last.
    pub files: Vec<PublishedFile>,

    /// Number of `<url>` entries in the sitemap.
    pub sitemap_entries: usize,

    /// Webhook outcome.
    pub webhook: WebhookStatus,

    /// Run duration in milliseconds.
    pub duration_ms: u64,
}

impl PublishReport {
    /// Number of artifacts uploaded remotely.
    #[must_use]
    pub fn uploaded(&self) -> usize {
        self.count(|r| matches!(r, PublishResult::Uploaded))
    }

    /// Number of artifacts left for local serving.
    #[must_use]
    pub fn local(&self) -> usize {
        self.count(|r| matches!(r, PublishResult::LocalFallback { .. }))
    }

    /// Number of artifacts that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, PublishResult::UploadFailed { .. }))
    }

    /// Look up a file's result by name.
    #[must_use]
    pub fn result_for(&self, file_name: &str) -> Option<&PublishResult> {
        self.files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| &f.result)
    }

    fn count(&self, predicate: impl Fn(&PublishResult) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.result)).count()
    }
}

/// Receives each artifact outcome as soon as it is known.
pub trait Reporter {
    fn report(&self, file: &PublishedFile);
}

/// Reporter writing outcomes to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, file: &PublishedFile) {
        match &file.result {
            PublishResult::Uploaded => {
                info!(file = %file.file_name, destination = %file.destination, "uploaded");
            }
            PublishResult::LocalFallback { url } => {
                warn!(
                    file = %file.file_name,
                    %url,
                    "remote storage not configured, published locally"
                );
            }
            PublishResult::UploadFailed { reason } => {
                error!(file = %file.file_name, %reason, "upload failed");
            }
        }
    }
}

/// Reporter collecting outcomes in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    files: RefCell<Vec<PublishedFile>>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes reported so far.
    #[must_use]
    pub fn files(&self) -> Vec<PublishedFile> {
        self.files.borrow().clone()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, file: &PublishedFile) {
        self.files.borrow_mut().push(file.clone());
    }
}
