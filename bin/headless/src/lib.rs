//! Headless CLI Library
//!
//! This library provides the command implementations behind the `headless`
//! binary, which publishes CMS content as JSON and sitemap artifacts.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (publish, check, about)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use headless::{Environment, cmd};
//!
//! // Publish staging content
//! cmd::publish::run(Path::new("headless.toml"), Environment::Staging).unwrap();
//! ```

pub mod cmd;

// Re-export core types for convenience
pub use headless_core::{Config, Environment, PublishConfig};
pub use headless_publisher::{PublishReport, Publisher};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
