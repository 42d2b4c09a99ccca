//! Headless Core Library
//!
//! Configuration, content model and error handling for headless publishing.

pub mod config;
pub mod content;
pub mod error;
pub mod shortcode;

pub use config::{Config, ContentGroupSpec, Environment, PublishConfig, normalize_destination};
pub use content::{
    ContentItem, ContentStore, FieldKind, FieldValue, ItemId, ItemRef, JsonContentStore,
    MODIFIED_FORMAT,
};
pub use error::{CoreError, Result};
pub use shortcode::Shortcodes;
