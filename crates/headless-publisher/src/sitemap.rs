//! Sitemap generation.
//!
//! Builds a `urlset` sitemap from exported content plus every published post
//! in the content store.

use headless_core::{ContentItem, ContentStore};
use tracing::debug;

/// Content type whose published items are always listed in the sitemap.
pub const SITEMAP_POST_TYPE: &str = "post";

const URLSET_OPEN: &str = concat!(
    r#"<urlset xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
    r#" xmlns:image="http://www.google.com/schemas/sitemap-image/1.1""#,
    r#" xsi:schemaLocation="http://www.sitemaps.org/schemas/sitemap/0.9"#,
    r#" http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd"#,
    r#" http://www.google.com/schemas/sitemap-image/1.1"#,
    r#" http://www.google.com/schemas/sitemap-image/1.1/sitemap-image.xsd""#,
    r#" xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
);

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Site-relative URI.
    pub uri: String,

    /// Last modification time, written verbatim.
    pub last_modified: String,
}

impl SitemapEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(uri: impl Into<String>, last_modified: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            last_modified: last_modified.into(),
        }
    }

    /// Entry for a content item.
    #[must_use]
    pub fn for_item(item: &ContentItem, home_url: &str) -> Self {
        Self::new(item.relative_permalink(home_url), item.modified_string())
    }
}

/// Entries for every published post in the store, in store order.
#[must_use]
pub fn published_entries(store: &dyn ContentStore) -> Vec<SitemapEntry> {
    store
        .published(SITEMAP_POST_TYPE)
        .into_iter()
        .map(|item| SitemapEntry::for_item(item, store.home_url()))
        .collect()
}

/// Sitemap generator.
#[derive(Debug, Clone)]
pub struct SitemapBuilder {
    domain: String,
}

impl SitemapBuilder {
    /// Create a builder prefixing every URI with `domain`.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Generate sitemap XML. Entries are neither sorted nor de-duplicated.
    #[must_use]
    pub fn build(&self, entries: &[SitemapEntry]) -> String {
        debug!(count = entries.len(), "generating sitemap");

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(URLSET_OPEN);
        xml.push('\n');

        for entry in entries {
            xml.push_str(&self.url_to_xml(entry));
        }

        xml.push_str("</urlset>\n");
        xml
    }

    fn url_to_xml(&self, entry: &SitemapEntry) -> String {
        let loc = format!("{}{}", self.domain, entry.uri);
        format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            escape_xml(&loc),
            escape_xml(&entry.last_modified)
        )
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use headless_core::JsonContentStore;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_generate_sitemap() {
        let builder = SitemapBuilder::new("https://www.example.com");
        let entries = vec![
            SitemapEntry::new("/", "2026-03-01 09:30:00"),
            SitemapEntry::new("/about/", "2026-03-02 10:00:00"),
        ];

        let xml = builder.build(&entries);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"xmlns="http://www.sitemaps.org/schemas/sitemap/0.9""#));
        assert!(xml.contains(r#"xmlns:image="http://www.google.com/schemas/sitemap-image/1.1""#));
        assert!(xml.contains("http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd"));
        assert!(xml.contains("<loc>https://www.example.com/about/</loc>"));
        assert!(xml.contains("<lastmod>2026-03-02 10:00:00</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_entries_keep_order_and_duplicates() {
        let builder = SitemapBuilder::new("");
        let entries = vec![
            SitemapEntry::new("/b/", "2"),
            SitemapEntry::new("/a/", "1"),
            SitemapEntry::new("/b/", "2"),
        ];

        let xml = builder.build(&entries);

        assert_eq!(xml.matches("<loc>/b/</loc>").count(), 2);
        let first_b = xml.find("<loc>/b/</loc>").unwrap();
        let a = xml.find("<loc>/a/</loc>").unwrap();
        assert!(first_b < a);
    }

    #[test]
    fn test_empty_sitemap() {
        let xml = SitemapBuilder::new("https://www.example.com").build(&[]);
        assert!(!xml.contains("<url>"));
        assert!(xml.contains("</urlset>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");

        let xml =
            SitemapBuilder::new("https://x.com").build(&[SitemapEntry::new("/?a=1&b=2", "t")]);
        assert!(xml.contains("<loc>https://x.com/?a=1&amp;b=2</loc>"));
    }

    #[test]
    fn test_published_entries() {
        let store = JsonContentStore::from_value(json!({
            "home_url": "https://cms.example.com",
            "items": [
                {
                    "id": 1,
                    "post_type": "page",
                    "permalink": "https://cms.example.com/",
                    "modified": "2026-01-01 00:00:00"
                },
                {
                    "id": 2,
                    "permalink": "https://cms.example.com/first/",
                    "modified": "2026-01-02 08:00:00"
                },
                {
                    "id": 3,
                    "status": "draft",
                    "permalink": "https://cms.example.com/wip/",
                    "modified": "2026-01-03 00:00:00"
                },
                {
                    "id": 4,
                    "permalink": "https://cms.example.com/second/",
                    "modified": "2026-01-04 17:45:00"
                }
            ]
        }))
        .unwrap();

        let entries = published_entries(&store);

        assert_eq!(
            entries,
            vec![
                SitemapEntry::new("/first/", "2026-01-02 08:00:00"),
                SitemapEntry::new("/second/", "2026-01-04 17:45:00"),
            ]
        );
    }
}
