//! Publish configuration management.
//!
//! [`Config`] mirrors the settings file. [`PublishConfig`] is the immutable
//! value resolved from it for a single publish run in one [`Environment`].

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    content::ItemId,
    error::{CoreError, Result},
};

/// Destination used when none is configured.
pub const DEFAULT_DESTINATION: &str = "wp-headless-data/";

/// Main configuration structure, as read from `headless.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Publish targets and notifications.
    #[serde(default)]
    pub publish: PublishSettings,

    /// Remote object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Shortcode name to replacement template.
    #[serde(default)]
    pub shortcodes: IndexMap<String, String>,

    /// Content groups, one output file each.
    #[serde(default)]
    pub content: Vec<ContentGroupConfig>,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site base URL stripped from permalinks. Overrides the content export's
    /// own value when non-empty.
    #[serde(default)]
    pub home_url: String,

    /// Base URL under which the staging directory is served locally.
    #[serde(default)]
    pub assets_url: String,

    /// Working directory for staged artifacts.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Content store export file.
    #[serde(default = "default_content_file")]
    pub content_file: PathBuf,
}

/// Publish settings shared by both environments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishSettings {
    /// Raw destination prefix in remote storage.
    #[serde(default)]
    pub destination: String,

    /// Domain prepended to every sitemap URI.
    #[serde(default)]
    pub sitemap_domain: String,

    /// Webhook called after a staging publish.
    #[serde(default)]
    pub webhook_staging: String,

    /// Webhook called after a production publish.
    #[serde(default)]
    pub webhook_production: String,
}

/// Remote object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage service endpoint (e.g., "https://storage.example.com").
    #[serde(default)]
    pub endpoint: String,

    /// Bucket name.
    #[serde(default)]
    pub bucket: String,

    /// Bearer token used for uploads.
    #[serde(default)]
    pub access_token: String,

    /// Whether uploaded objects are made publicly readable.
    #[serde(default = "default_true")]
    pub public_read: bool,
}

/// A configured content group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentGroupConfig {
    /// Base name of the output file, without environment or extension.
    pub file_name: String,

    /// Item ids exported into this file, in order.
    #[serde(default)]
    pub items: Vec<ItemId>,
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_content_file() -> PathBuf {
    PathBuf::from("content.json")
}

fn default_true() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_url: String::new(),
            assets_url: String::new(),
            staging_dir: default_staging_dir(),
            content_file: default_content_file(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            access_token: String::new(),
            public_read: true,
        }
    }
}

impl StorageConfig {
    /// Whether enough is configured to attempt a remote upload.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
            && !self.bucket.trim().is_empty()
            && !self.access_token.trim().is_empty()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })
    }

    /// Load configuration layered with `HEADLESS__SECTION__KEY` environment
    /// variables.
    ///
    /// `config` lowercases every key, so shortcode names keep the case they
    /// have in the file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let file = Self::load(path)?;

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("HEADLESS").separator("__"))
            .build()?;
        let mut layered: Self = settings.try_deserialize()?;

        layered.shortcodes = restore_key_case(file.shortcodes, layered.shortcodes);
        Ok(layered)
    }

    /// Non-fatal problems worth surfacing to an operator.
    ///
    /// Missing values never stop a publish; they only produce empty output.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.content.is_empty() {
            warnings.push("no content groups configured".to_string());
        }
        for group in &self.content {
            if group.file_name.trim().is_empty() {
                warnings.push("content group with an empty file_name".to_string());
            }
            if group.items.is_empty() {
                warnings.push(format!("content group '{}' has no items", group.file_name));
            }
        }
        if self.publish.sitemap_domain.is_empty() {
            warnings.push(
                "publish.sitemap_domain is empty, sitemap URLs will be relative".to_string(),
            );
        }
        if !self.storage.is_configured() {
            warnings.push(
                "storage is not configured, files will be published locally".to_string(),
            );
        }
        if self.site.assets_url.is_empty() {
            warnings.push(
                "site.assets_url is empty, local fallback URLs will be relative".to_string(),
            );
        }
        for env in [Environment::Staging, Environment::Production] {
            if self.webhook_for(env).is_none() {
                warnings.push(format!("no {env} webhook configured"));
            }
        }

        warnings
    }

    /// Webhook URL configured for an environment, if any.
    #[must_use]
    pub fn webhook_for(&self, env: Environment) -> Option<String> {
        let raw = match env {
            Environment::Staging => &self.publish.webhook_staging,
            Environment::Production => &self.publish.webhook_production,
        };
        let url = raw.trim();
        (!url.is_empty()).then(|| url.to_string())
    }
}

/// Publish environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    /// Lowercase name used in file names.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Output file name for a content group: `{env}-{base}.json`.
    #[must_use]
    pub fn json_file_name(&self, file_base_name: &str) -> String {
        format!("{}-{file_base_name}.json", self.as_str())
    }

    /// Output file name for the sitemap: `{env}-sitemap.xml`.
    #[must_use]
    pub fn sitemap_file_name(&self) -> String {
        format!("{}-sitemap.xml", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(CoreError::Environment(other.to_string())),
        }
    }
}

/// One content group of a publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentGroupSpec {
    /// Base name of the output file.
    pub file_base_name: String,

    /// Items to export, in order.
    pub items: Vec<ItemId>,
}

/// Immutable configuration for a single publish run.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub name: String,
    pub version: String,
    pub homepage_link: String,
    pub environment: Environment,
    pub content_groups: Vec<ContentGroupSpec>,
    pub staging_dir: PathBuf,
    /// Never starts with a slash, always ends with exactly one.
    pub destination_prefix: String,
    pub sitemap_domain: String,
    /// `None` when no webhook is configured; never an empty string.
    pub webhook_url: Option<String>,
    pub assets_url: String,
}

impl PublishConfig {
    /// Resolve the run configuration for an environment.
    #[must_use]
    pub fn resolve(config: &Config, environment: Environment) -> Self {
        let content_groups = config
            .content
            .iter()
            .map(|group| ContentGroupSpec {
                file_base_name: group.file_name.clone(),
                items: group.items.clone(),
            })
            .collect();

        Self {
            name: "headless".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            homepage_link: env!("CARGO_PKG_HOMEPAGE").to_string(),
            environment,
            content_groups,
            staging_dir: config.site.staging_dir.clone(),
            destination_prefix: normalize_destination(&config.publish.destination),
            sitemap_domain: config.publish.sitemap_domain.clone(),
            webhook_url: config.webhook_for(environment),
            assets_url: config.site.assets_url.clone(),
        }
    }

    /// URL of an artifact left in the staging directory.
    #[must_use]
    pub fn local_url(&self, file_name: &str) -> String {
        format!("{}/data/{file_name}", self.assets_url.trim_end_matches('/'))
    }
}

/// Merge `layered` entries into `original`, matching keys case-insensitively
/// so that an overridden entry keeps its original name.
fn restore_key_case(
    mut original: IndexMap<String, String>,
    layered: IndexMap<String, String>,
) -> IndexMap<String, String> {
    for (key, value) in layered {
        let name = original
            .keys()
            .find(|existing| existing.eq_ignore_ascii_case(&key))
            .cloned()
            .unwrap_or(key);
        original.insert(name, value);
    }
    original
}

/// Normalize a destination prefix to `segment/.../`.
///
/// Leading and trailing slashes are stripped and exactly one trailing slash is
/// appended. An empty result falls back to [`DEFAULT_DESTINATION`].
#[must_use]
pub fn normalize_destination(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_DESTINATION.to_string();
    }
    format!("{trimmed}/")
}
