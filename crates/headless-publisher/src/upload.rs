//! Remote storage upload.
//!
//! [`Uploader`] is the boundary to remote object storage. [`HttpUploader`]
//! implements it for storage services accepting authenticated `PUT`s of
//! `{endpoint}/{bucket}/{key}`.

use std::{fmt, fs, path::Path};

use headless_core::config::StorageConfig;
use reqwest::{
    blocking::Client,
    header::{CONTENT_TYPE, HeaderValue},
};
use thiserror::Error;
use tracing::debug;

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Remote storage is not configured.
    #[error("remote storage is not configured")]
    NotConfigured,

    /// Staged file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage rejected the object.
    #[error("storage responded {status} for {key}")]
    Status { status: u16, key: String },
}

/// Result type for upload operations.
pub type Result<T> = std::result::Result<T, UploadError>;

/// Kind of artifact being uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadKind {
    #[default]
    Json,
    Xml,
}

impl UploadKind {
    /// MIME type sent with the object.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Xml => "xml",
        })
    }
}

/// Remote storage target.
pub trait Uploader {
    /// Whether remote upload is configured. Must not have side effects.
    fn can_upload(&self) -> bool;

    /// Upload a staged file to `{destination_prefix}{file_name}`.
    fn upload(
        &self,
        file_name: &str,
        staged: &Path,
        destination_prefix: &str,
        kind: UploadKind,
    ) -> Result<()>;
}

/// Object key for a file under a normalized destination prefix.
#[must_use]
pub fn object_key(destination_prefix: &str, file_name: &str) -> String {
    format!("{destination_prefix}{file_name}")
}

/// Uploader issuing authenticated HTTP `PUT` requests.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    config: StorageConfig,
}

impl HttpUploader {
    /// Create an uploader for a storage configuration.
    pub fn new(config: StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("headless/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Full URL of an object key.
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket.trim_matches('/'),
            key.trim_start_matches('/')
        )
    }
}

impl Uploader for HttpUploader {
    fn can_upload(&self) -> bool {
        self.config.is_configured()
    }

    fn upload(
        &self,
        file_name: &str,
        staged: &Path,
        destination_prefix: &str,
        kind: UploadKind,
    ) -> Result<()> {
        if !self.can_upload() {
            return Err(UploadError::NotConfigured);
        }

        let key = object_key(destination_prefix, file_name);
        let url = self.object_url(&key);
        let body = fs::read(staged)?;
        debug!(%url, %kind, bytes = body.len(), "uploading");

        let mut request = self
            .client
            .put(&url)
            .bearer_auth(&self.config.access_token)
            .header(CONTENT_TYPE, HeaderValue::from_static(kind.content_type()))
            .body(body);
        if self.config.public_read {
            request = request.header("x-amz-acl", "public-read");
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                key,
            });
        }

        Ok(())
    }
}
