//! Publish orchestration.
//!
//! A run moves through `Init → PerGroup(i) → Sitemap → Webhook → Done` and
//! never steps back. Individual artifact failures are recorded as
//! [`PublishResult`]s; they never stop the run.

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use headless_core::{ContentGroupSpec, ContentStore, Environment, PublishConfig, Shortcodes};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    report::{LogReporter, PublishReport, PublishResult, PublishedFile, Reporter, WebhookStatus},
    serializer::{ExpandDepth, ItemSerializer},
    sitemap::{SitemapBuilder, SitemapEntry, published_entries},
    stager::FileStager,
    upload::{UploadKind, Uploader, object_key},
    webhook::WebhookNotifier,
};

/// Publish errors.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Another publish for the environment holds the lock.
    #[error("another {environment} publish is in progress (remove {path} if it is stale)")]
    Locked {
        environment: Environment,
        path: PathBuf,
    },

    /// Lock file could not be created.
    #[error("failed to create lock file {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Lock file serializing publishes of one environment.
///
/// The file lives next to the staging directory so that removing an empty
/// staging directory is unaffected. It is removed on drop.
#[derive(Debug)]
pub struct PublishLock {
    path: PathBuf,
}

impl PublishLock {
    /// Take the lock for `environment`.
    pub fn acquire(staging_dir: &Path, environment: Environment) -> Result<Self> {
        let path = lock_path(staging_dir, environment);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PublishError::Lock {
                path: path.clone(),
                source,
            })?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                if let Err(e) = writeln!(file, "{}", std::process::id()) {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to record pid in publish lock"
                    );
                }
                debug!(path = %path.display(), "acquired publish lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(PublishError::Locked { environment, path })
            }
            Err(source) => Err(PublishError::Lock { path, source }),
        }
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PublishLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove publish lock");
        }
    }
}

/// Lock file path for an environment: `.{staging-dir-name}.{env}.lock`.
#[must_use]
pub fn lock_path(staging_dir: &Path, environment: Environment) -> PathBuf {
    let name = staging_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("headless");
    staging_dir.with_file_name(format!(".{name}.{environment}.lock"))
}

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublishState {
    Init,
    PerGroup(usize),
    Sitemap,
    Webhook,
    Done,
}

/// Accumulated results of a run.
#[derive(Debug, Default)]
struct RunState {
    files: Vec<PublishedFile>,
    entries: Vec<SitemapEntry>,
    sitemap_entries: usize,
    webhook: Option<WebhookStatus>,
}

/// Publishes configured content for one environment.
pub struct Publisher<'a> {
    config: PublishConfig,
    store: &'a dyn ContentStore,
    uploader: &'a dyn Uploader,
    reporter: &'a dyn Reporter,
    shortcodes: Shortcodes,
    notifier: WebhookNotifier,
}

impl<'a> Publisher<'a> {
    /// Create a publisher.
    #[must_use]
    pub fn new(
        config: PublishConfig,
        store: &'a dyn ContentStore,
        uploader: &'a dyn Uploader,
    ) -> Self {
        Self {
            config,
            store,
            uploader,
            reporter: &LogReporter,
            shortcodes: Shortcodes::new(),
            notifier: WebhookNotifier::new(),
        }
    }

    /// Report artifact outcomes to `reporter` instead of the log.
    #[must_use]
    pub fn with_reporter(mut self, reporter: &'a dyn Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Expand these shortcodes in exported text.
    #[must_use]
    pub fn with_shortcodes(mut self, shortcodes: Shortcodes) -> Self {
        self.shortcodes = shortcodes;
        self
    }

    /// Use a specific webhook notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: WebhookNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Execute a full publish run.
    ///
    /// Only failing to take the environment lock is an error; every other
    /// failure is reported per artifact.
    pub fn publish(&self) -> Result<PublishReport> {
        let start = Instant::now();
        let environment = self.config.environment;
        let _lock = PublishLock::acquire(&self.config.staging_dir, environment)?;

        let stager = FileStager::new(&self.config.staging_dir);
        let mut run = RunState::default();
        let mut state = PublishState::Init;

        while state != PublishState::Done {
            debug!(?state, "publish state");
            state = match state {
                PublishState::Init => {
                    info!(
                        %environment,
                        groups = self.config.content_groups.len(),
                        staging = %self.config.staging_dir.display(),
                        destination = %self.config.destination_prefix,
                        "starting publish"
                    );
                    if self.config.content_groups.is_empty() {
                        PublishState::Sitemap
                    } else {
                        PublishState::PerGroup(0)
                    }
                }
                PublishState::PerGroup(index) => match self.config.content_groups.get(index) {
                    Some(group) => {
                        self.publish_group(&stager, group, &mut run);
                        PublishState::PerGroup(index + 1)
                    }
                    None => PublishState::Sitemap,
                },
                PublishState::Sitemap => {
                    self.publish_sitemap(&stager, &mut run);
                    PublishState::Webhook
                }
                PublishState::Webhook => {
                    run.webhook = Some(self.notifier.notify(self.config.webhook_url.as_deref()));
                    PublishState::Done
                }
                PublishState::Done => PublishState::Done,
            };
        }

        let report = PublishReport {
            environment: environment.to_string(),
            files: run.files,
            sitemap_entries: run.sitemap_entries,
            webhook: run.webhook.unwrap_or(WebhookStatus::Skipped),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            %environment,
            uploaded = report.uploaded(),
            local = report.local(),
            failed = report.failed(),
            sitemap_entries = report.sitemap_entries,
            duration_ms = report.duration_ms,
            "publish complete"
        );

        Ok(report)
    }

    /// Serialize, stage and deliver one content group.
    fn publish_group(&self, stager: &FileStager, group: &ContentGroupSpec, run: &mut RunState) {
        let file_name = self.config.environment.json_file_name(&group.file_base_name);
        let serializer = ItemSerializer::new(self.store, &self.shortcodes);
        let home_url = self.store.home_url();

        let mut items = Vec::with_capacity(group.items.len());
        for id in &group.items {
            let Some(item) = self.store.item(*id) else {
                warn!(%id, file = %file_name, "content item not found, skipping");
                continue;
            };
            items.push(Value::Object(serializer.serialize(item, ExpandDepth::One)));
            run.entries.push(SitemapEntry::for_item(item, home_url));
        }

        info!(file = %file_name, items = items.len(), "exporting content group");

        match serde_json::to_string(&items) {
            Ok(content) => self.deliver(stager, &file_name, &content, UploadKind::Json, run),
            Err(e) => self.record(
                &file_name,
                PublishResult::UploadFailed {
                    reason: format!("failed to encode JSON: {e}"),
                },
                run,
            ),
        }
    }

    /// Build and deliver the sitemap from collected and store-wide entries.
    fn publish_sitemap(&self, stager: &FileStager, run: &mut RunState) {
        let mut entries = std::mem::take(&mut run.entries);
        entries.extend(published_entries(self.store));
        run.sitemap_entries = entries.len();

        let xml = SitemapBuilder::new(&self.config.sitemap_domain).build(&entries);
        let file_name = self.config.environment.sitemap_file_name();

        info!(file = %file_name, entries = entries.len(), "generated sitemap");
        self.deliver(stager, &file_name, &xml, UploadKind::Xml, run);
    }

    /// Stage an artifact, upload it or fall back to local, then settle the
    /// staged file and report.
    fn deliver(
        &self,
        stager: &FileStager,
        file_name: &str,
        content: &str,
        kind: UploadKind,
        run: &mut RunState,
    ) {
        let result = match stager.stage(file_name, content) {
            Ok(staged) => {
                let result = if self.uploader.can_upload() {
                    match self.uploader.upload(
                        file_name,
                        &staged,
                        &self.config.destination_prefix,
                        kind,
                    ) {
                        Ok(()) => PublishResult::Uploaded,
                        Err(e) => PublishResult::UploadFailed {
                            reason: e.to_string(),
                        },
                    }
                } else {
                    PublishResult::LocalFallback {
                        url: self.config.local_url(file_name),
                    }
                };
                stager.commit(&staged, &result);
                result
            }
            Err(e) => PublishResult::UploadFailed {
                reason: e.to_string(),
            },
        };

        self.record(file_name, result, run);
    }

    fn record(&self, file_name: &str, result: PublishResult, run: &mut RunState) {
        let file = PublishedFile {
            file_name: file_name.to_string(),
            destination: object_key(&self.config.destination_prefix, file_name),
            result,
        };
        self.reporter.report(&file);
        run.files.push(file);
    }
}
