//! Headless Publisher Library
//!
//! Publish pipeline exporting CMS content as JSON and sitemap artifacts.
//!
//! # Modules
//!
//! - [`serializer`] - Content item serialization with one level of reference expansion
//! - [`stager`] - Artifact staging in a local working directory
//! - [`upload`] - Remote storage upload
//! - [`sitemap`] - XML sitemap generation
//! - [`webhook`] - Post-publish webhook notification
//! - [`report`] - Per-artifact outcomes and reporting
//! - [`publish`] - Publish orchestration

pub mod publish;
pub mod report;
pub mod serializer;
pub mod sitemap;
pub mod stager;
pub mod upload;
pub mod webhook;

#[cfg(test)]
mod test_support;

pub use publish::{PublishError, PublishLock, Publisher};
pub use report::{
    LogReporter, MemoryReporter, PublishReport, PublishResult, PublishedFile, Reporter,
    WebhookStatus,
};
pub use serializer::{ExpandDepth, ItemSerializer, SerializedItem};
pub use sitemap::{SitemapBuilder, SitemapEntry};
pub use stager::FileStager;
pub use upload::{HttpUploader, UploadError, UploadKind, Uploader};
pub use webhook::WebhookNotifier;
