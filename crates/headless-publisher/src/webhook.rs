//! Post-publish webhook notification.

use reqwest::{blocking::Client, header::CONTENT_LENGTH};
use tracing::{info, warn};

use crate::report::WebhookStatus;

/// Fires an empty `POST` at a configured URL.
///
/// Delivery is fire-and-forget: the response is ignored and failures are
/// logged, never returned.
#[derive(Debug, Clone, Default)]
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    /// Create a notifier with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notifier with a preconfigured client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Notify `url`, if one is configured.
    pub fn notify(&self, url: Option<&str>) -> WebhookStatus {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return WebhookStatus::Skipped;
        };

        match self.client.post(url).header(CONTENT_LENGTH, "0").send() {
            Ok(response) => {
                let status = response.status().as_u16();
                info!(%url, status, "webhook called");
                WebhookStatus::Delivered(status)
            }
            Err(e) => {
                warn!(%url, error = %e, "webhook call failed");
                WebhookStatus::Failed
            }
        }
    }
}
