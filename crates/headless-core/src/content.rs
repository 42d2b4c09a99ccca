//! Content items, field metadata and the content store boundary.

use std::{collections::HashMap, fmt, path::Path};

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Format used for modification timestamps, e.g. `2026-03-01 09:30:00`.
pub const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stable identifier of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to another item inside a custom field, written `{"$ref": 12}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemRef {
    #[serde(rename = "$ref")]
    pub id: ItemId,
}

/// Value of a custom field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Handle to another item in the store.
    Item(ItemRef),
    /// Ordered sequence of handles and/or scalars.
    List(Vec<FieldValue>),
    /// Any other JSON value, passed through as-is.
    Scalar(serde_json::Value),
}

impl FieldValue {
    /// Convenience constructor for an item handle.
    #[must_use]
    pub fn item(id: u64) -> Self {
        Self::Item(ItemRef { id: ItemId(id) })
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Scalar(value)
    }
}

/// Declared kind of a custom field, resolved from its metadata classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text-like field with no special handling.
    Plain,
    /// Ordered list of related items.
    Relationship,
    /// At most one related item.
    SingleReference,
    /// Unknown or missing classifier.
    Other,
}

impl FieldKind {
    /// Classify a field from its metadata type string.
    ///
    /// A missing lookup is not an error; it classifies as [`FieldKind::Other`].
    #[must_use]
    pub fn classify(classifier: Option<&str>) -> Self {
        match classifier.map(str::trim) {
            Some("relationship") => Self::Relationship,
            Some("post_object") => Self::SingleReference,
            Some(
                "text" | "textarea" | "wysiwyg" | "number" | "email" | "url" | "password"
                | "true_false" | "select" | "radio" | "date_picker" | "color_picker",
            ) => Self::Plain,
            _ => Self::Other,
        }
    }
}

/// One entry of the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable identifier.
    pub id: ItemId,

    /// Content type (e.g., "post", "page").
    #[serde(default = "default_post_type")]
    pub post_type: String,

    /// Publication status (e.g., "publish", "draft").
    #[serde(default = "default_status")]
    pub status: String,

    /// Absolute rendered permalink.
    #[serde(default)]
    pub permalink: String,

    /// Last modification time.
    #[serde(with = "modified_format")]
    pub modified: NaiveDateTime,

    /// Base fields, in store order.
    #[serde(default)]
    pub fields: IndexMap<String, String>,

    /// Custom fields, in store order.
    #[serde(default)]
    pub custom_fields: IndexMap<String, FieldValue>,
}

impl ContentItem {
    /// Whether the item is published.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == "publish"
    }

    /// Modification time formatted with [`MODIFIED_FORMAT`].
    #[must_use]
    pub fn modified_string(&self) -> String {
        self.modified.format(MODIFIED_FORMAT).to_string()
    }

    /// Permalink relative to the site's base URL.
    #[must_use]
    pub fn relative_permalink(&self, home_url: &str) -> String {
        site_relative(&self.permalink, home_url)
    }
}

/// Strip the site base URL from an absolute URL.
///
/// URLs outside of the site are returned unchanged.
#[must_use]
pub fn site_relative(url: &str, home_url: &str) -> String {
    let home = home_url.trim_end_matches('/');
    if home.is_empty() {
        return url.to_string();
    }
    url.strip_prefix(home).unwrap_or(url).to_string()
}

fn default_post_type() -> String {
    "post".to_string()
}

fn default_status() -> String {
    "publish".to_string()
}

mod modified_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MODIFIED_FORMAT;

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(MODIFIED_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, MODIFIED_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Read access to the external content store.
pub trait ContentStore {
    /// Site base URL used to make permalinks site-relative.
    fn home_url(&self) -> &str;

    /// Look up an item by id.
    fn item(&self, id: ItemId) -> Option<&ContentItem>;

    /// Metadata classifier of a custom field on an item, if known.
    fn field_type(&self, item: ItemId, key: &str) -> Option<&str>;

    /// Every published item of a content type, in store order.
    fn published(&self, post_type: &str) -> Vec<&ContentItem>;
}

/// Field metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Classifier string, e.g. "relationship" or "post_object".
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentExport {
    #[serde(default)]
    home_url: String,
    #[serde(default)]
    fields: HashMap<String, FieldMeta>,
    #[serde(default)]
    items: Vec<ContentItem>,
}

/// Content store backed by a JSON export of the CMS.
#[derive(Debug, Clone, Default)]
pub struct JsonContentStore {
    home_url: String,
    fields: HashMap<String, FieldMeta>,
    items: Vec<ContentItem>,
    index: HashMap<ItemId, usize>,
}

impl JsonContentStore {
    /// Load a store from an export file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::content(path, "content export not found"));
        }

        let raw = std::fs::read_to_string(path)?;
        let store = Self::from_json(&raw).map_err(|e| CoreError::content(path, e.to_string()))?;

        debug!(path = %path.display(), items = store.items.len(), "loaded content store");
        Ok(store)
    }

    /// Parse a store from export JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let export: ContentExport = serde_json::from_str(raw)?;
        Ok(Self::from_export(export))
    }

    /// Build a store from an export JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let export: ContentExport = serde_json::from_value(value)?;
        Ok(Self::from_export(export))
    }

    fn from_export(export: ContentExport) -> Self {
        let index = export
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id, pos))
            .collect();

        Self {
            home_url: export.home_url,
            fields: export.fields,
            items: export.items,
            index,
        }
    }

    /// Override the site base URL.
    #[must_use]
    pub fn with_home_url(mut self, home_url: impl Into<String>) -> Self {
        self.home_url = home_url.into();
        self
    }

    /// Number of items in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ContentStore for JsonContentStore {
    fn home_url(&self) -> &str {
        &self.home_url
    }

    fn item(&self, id: ItemId) -> Option<&ContentItem> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    fn field_type(&self, _item: ItemId, key: &str) -> Option<&str> {
        self.fields.get(key).map(|meta| meta.kind.as_str())
    }

    fn published(&self, post_type: &str) -> Vec<&ContentItem> {
        self.items
            .iter()
            .filter(|item| item.post_type == post_type && item.is_published())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_store() -> JsonContentStore {
        JsonContentStore::from_value(json!({
            "home_url": "https://cms.example.com",
            "fields": {
                "related": { "type": "relationship" },
                "author": { "type": "post_object" },
                "subtitle": { "type": "text" }
            },
            "items": [
                {
                    "id": 1,
                    "post_type": "page",
                    "permalink": "https://cms.example.com/",
                    "modified": "2026-03-01 09:30:00",
                    "fields": { "post_title": "Home" },
                    "custom_fields": {
                        "related": [{ "$ref": 3 }, 42],
                        "author": { "$ref": 2 },
                        "meta": { "color": "red" }
                    }
                },
                {
                    "id": 2,
                    "status": "draft",
                    "permalink": "https://cms.example.com/draft/",
                    "modified": "2026-03-02T10:00:00"
                },
                {
                    "id": 3,
                    "permalink": "https://cms.example.com/hello/",
                    "modified": "2026-03-03 08:00:00"
                }
            ]
        }))
        .expect("valid export")
    }

    #[test]
    fn test_field_kind_classify() {
        assert_eq!(FieldKind::classify(Some("relationship")), FieldKind::Relationship);
        assert_eq!(FieldKind::classify(Some("post_object")), FieldKind::SingleReference);
        assert_eq!(FieldKind::classify(Some("wysiwyg")), FieldKind::Plain);
        assert_eq!(FieldKind::classify(Some("gallery")), FieldKind::Other);
        assert_eq!(FieldKind::classify(None), FieldKind::Other);
    }

    #[test]
    fn test_field_value_parsing() {
        let store = sample_store();
        let home = store.item(ItemId(1)).expect("item 1");

        assert_eq!(
            home.custom_fields["related"],
            FieldValue::List(vec![FieldValue::item(3), FieldValue::Scalar(json!(42))])
        );
        assert_eq!(home.custom_fields["author"], FieldValue::item(2));
        assert_eq!(
            home.custom_fields["meta"],
            FieldValue::Scalar(json!({ "color": "red" }))
        );
    }

    #[test]
    fn test_item_defaults() {
        let store = sample_store();
        let item = store.item(ItemId(3)).expect("item 3");

        assert_eq!(item.post_type, "post");
        assert!(item.is_published());
        assert!(item.fields.is_empty());
        assert_eq!(item.modified_string(), "2026-03-03 08:00:00");
    }

    #[test]
    fn test_modified_accepts_iso_separator() {
        let store = sample_store();
        let draft = store.item(ItemId(2)).expect("item 2");
        assert_eq!(draft.modified_string(), "2026-03-02 10:00:00");
    }

    #[test]
    fn test_published_filters_type_and_status() {
        let store = sample_store();
        let posts: Vec<_> = store.published("post").iter().map(|i| i.id).collect();

        assert_eq!(posts, vec![ItemId(3)]);
        assert_eq!(store.published("page").len(), 1);
    }

    #[test]
    fn test_field_type_lookup() {
        let store = sample_store();
        assert_eq!(store.field_type(ItemId(1), "related"), Some("relationship"));
        assert_eq!(store.field_type(ItemId(1), "meta"), None);
    }

    #[test]
    fn test_relative_permalink() {
        let store = sample_store();
        let item = store.item(ItemId(3)).expect("item 3");

        assert_eq!(item.relative_permalink(store.home_url()), "/hello/");
        assert_eq!(
            site_relative("https://other.com/x", "https://cms.example.com"),
            "https://other.com/x"
        );
        assert_eq!(
            site_relative("https://cms.example.com/a", ""),
            "https://cms.example.com/a"
        );
        assert_eq!(
            site_relative("https://cms.example.com/a", "https://cms.example.com/"),
            "/a"
        );
    }

    #[test]
    fn test_with_home_url_override() {
        let store = sample_store().with_home_url("https://cms.example.com/blog");
        assert_eq!(store.home_url(), "https://cms.example.com/blog");
    }

    #[test]
    fn test_load_missing_file() {
        let result = JsonContentStore::load(Path::new("/nonexistent/content.json"));
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("content.json");
        std::fs::write(&path, r#"{ "items": [] }"#).expect("write");

        let store = JsonContentStore::load(&path).expect("load");
        assert!(store.is_empty());
    }
}
