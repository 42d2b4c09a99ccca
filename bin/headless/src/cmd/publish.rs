//! Publish command - exports content for one environment

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr, bail};
use headless_core::{Config, Environment, JsonContentStore, PublishConfig, Shortcodes};
use headless_publisher::{
    HttpUploader, PublishResult, PublishedFile, Publisher, Reporter, WebhookStatus,
};

/// Reporter printing each artifact outcome to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, file: &PublishedFile) {
        match &file.result {
            PublishResult::Uploaded => {
                println!("  ✓ {} uploaded to {}", file.file_name, file.destination);
            }
            PublishResult::LocalFallback { url } => {
                println!(
                    "  ⚠ {} published locally at {url} (remote storage not configured)",
                    file.file_name
                );
            }
            PublishResult::UploadFailed { reason } => {
                println!("  ✗ {} failed: {reason}", file.file_name);
            }
        }
    }
}

/// Run the publish command.
///
/// Exports every configured content group plus the sitemap for
/// `environment`, then calls the environment's webhook.
pub fn run(config_path: &Path, environment: Environment) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, %environment, "Starting publish");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;

    let mut store = JsonContentStore::load(&config.site.content_file)
        .wrap_err("Failed to load content store")?;
    if !config.site.home_url.is_empty() {
        store = store.with_home_url(config.site.home_url.clone());
    }

    let uploader =
        HttpUploader::new(config.storage.clone()).wrap_err("Failed to create storage client")?;
    let publish_config = PublishConfig::resolve(&config, environment);
    tracing::debug!(?publish_config, "Resolved publish configuration");

    println!("Publishing {environment} content...");
    let report = Publisher::new(publish_config, &store, &uploader)
        .with_shortcodes(Shortcodes::from_config(&config.shortcodes))
        .with_reporter(&ConsoleReporter)
        .publish()
        .wrap_err("Publish failed")?;

    let webhook = match report.webhook {
        WebhookStatus::Skipped => "not configured".to_string(),
        WebhookStatus::Delivered(status) => format!("called (HTTP {status})"),
        WebhookStatus::Failed => "failed".to_string(),
    };

    println!();
    println!("  Uploaded:        {}", report.uploaded());
    println!("  Local:           {}", report.local());
    println!("  Failed:          {}", report.failed());
    println!("  Sitemap entries: {}", report.sitemap_entries);
    println!("  Webhook:         {webhook}");
    println!();
    println!("  Duration:        {:.2}s", start.elapsed().as_secs_f64());
    println!();

    if report.failed() > 0 {
        bail!(
            "{} file(s) failed to upload, staged copies were kept",
            report.failed()
        );
    }

    tracing::info!(duration_ms = report.duration_ms, "Publish completed");

    Ok(())
}
