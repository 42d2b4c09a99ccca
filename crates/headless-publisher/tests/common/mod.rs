//! Shared fixtures for integration tests.

use std::{fs, path::Path};

#[allow(dead_code)]
#[path = "../../src/test_support.rs"]
mod test_support;

pub use test_support::TestServer;

/// Content export with two pages, two posts and a draft.
pub const CONTENT_EXPORT: &str = r#"{
  "home_url": "https://cms.example.com",
  "fields": {
    "related": { "type": "relationship" },
    "featured": { "type": "post_object" },
    "tagline": { "type": "text" }
  },
  "items": [
    {
      "id": 10,
      "post_type": "page",
      "permalink": "https://cms.example.com/",
      "modified": "2026-03-01 09:30:00",
      "fields": { "post_title": "Home", "post_content": "Welcome to [site]" },
      "custom_fields": {
        "tagline": "Built by [site]",
        "featured": { "$ref": 20 }
      }
    },
    {
      "id": 11,
      "post_type": "page",
      "permalink": "https://cms.example.com/about/",
      "modified": "2026-03-02 10:00:00",
      "fields": { "post_title": "About" }
    },
    {
      "id": 20,
      "permalink": "https://cms.example.com/hello-world/",
      "modified": "2026-02-14 08:05:09",
      "fields": { "post_title": "Hello World" },
      "custom_fields": {
        "related": [{ "$ref": 21 }]
      }
    },
    {
      "id": 21,
      "permalink": "https://cms.example.com/second/",
      "modified": "2026-02-20 18:00:00",
      "fields": { "post_title": "Second [site]" }
    },
    {
      "id": 22,
      "status": "draft",
      "permalink": "https://cms.example.com/draft/",
      "modified": "2026-02-21 18:00:00",
      "fields": { "post_title": "Draft" }
    }
  ]
}"#;

/// Write a settings file and content export into `root`.
///
/// `publish` is added to the `[publish]` table, `tables` is appended verbatim.
pub fn write_site(root: &Path, publish: &str, tables: &str) -> std::path::PathBuf {
    let content_file = root.join("content.json");
    fs::write(&content_file, CONTENT_EXPORT).expect("write content export");

    let config = format!(
        r#"
[site]
assets_url = "https://cms.example.com/wp-content/themes/headless"
staging_dir = "{staging}"
content_file = "{content}"

[publish]
destination = "/site/data/"
sitemap_domain = "https://www.example.com"
{publish}

[shortcodes]
site = "Example Co"

[[content]]
file_name = "pages"
items = [10, 11]

{tables}
"#,
        staging = root.join("data").display(),
        content = content_file.display(),
    );

    let path = root.join("headless.toml");
    fs::write(&path, config).expect("write settings");
    path
}
