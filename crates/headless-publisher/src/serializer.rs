//! Content item serialization.
//!
//! Turns a [`ContentItem`] into a plain JSON object. Relationship and
//! single-reference fields are expanded into nested objects, but only one
//! level deep: a nested item's own reference fields are copied raw.

use headless_core::{
    ContentItem, ContentStore, CoreError, FieldKind, FieldValue, ItemId, Shortcodes,
};
use serde_json::{Map, Value};
use tracing::{trace, warn};

/// Serialized form of one content item.
pub type SerializedItem = Map<String, Value>;

/// Synthesized field holding the site-relative permalink.
pub const URI_FIELD: &str = "uri";

/// Synthesized field holding the modification timestamp.
pub const MODIFIED_FIELD: &str = "post_modified";

/// How many levels of references may still be expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExpandDepth {
    /// Reference fields are copied raw.
    Zero = 0,
    /// Reference fields are expanded into depth-zero items.
    One = 1,
}

impl ExpandDepth {
    /// Depth used for items referenced from this level.
    #[must_use]
    pub fn decrement(self) -> Self {
        Self::Zero
    }

    /// Whether reference fields are expanded at this depth.
    #[must_use]
    pub fn expands(self) -> bool {
        self == Self::One
    }
}

impl TryFrom<u8> for ExpandDepth {
    type Error = CoreError;

    fn try_from(depth: u8) -> Result<Self, Self::Error> {
        match depth {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            other => Err(CoreError::Depth(other)),
        }
    }
}

/// Serializes items against a content store.
pub struct ItemSerializer<'a> {
    store: &'a dyn ContentStore,
    shortcodes: &'a Shortcodes,
}

impl<'a> ItemSerializer<'a> {
    /// Create a serializer.
    #[must_use]
    pub fn new(store: &'a dyn ContentStore, shortcodes: &'a Shortcodes) -> Self {
        Self { store, shortcodes }
    }

    /// Serialize an item: base fields, then custom fields, then `uri` and
    /// `post_modified`.
    #[must_use]
    pub fn serialize(&self, item: &ContentItem, depth: ExpandDepth) -> SerializedItem {
        trace!(id = %item.id, ?depth, "serializing item");
        let mut out = Map::new();

        for (key, value) in &item.fields {
            out.insert(key.clone(), Value::String(self.shortcodes.expand(value)));
        }

        for (key, value) in &item.custom_fields {
            let kind = FieldKind::classify(self.store.field_type(item.id, key));
            if let Some(value) = self.custom_field(kind, value, depth) {
                out.insert(key.clone(), value);
            }
        }

        out.insert(
            URI_FIELD.to_string(),
            Value::String(item.relative_permalink(self.store.home_url())),
        );
        out.insert(
            MODIFIED_FIELD.to_string(),
            Value::String(item.modified_string()),
        );

        out
    }

    /// Serialized value of a custom field. Relationship fields that do not
    /// hold a list (an empty or unset relationship) are left out.
    fn custom_field(
        &self,
        kind: FieldKind,
        value: &FieldValue,
        depth: ExpandDepth,
    ) -> Option<Value> {
        let value = match (kind, value) {
            (FieldKind::Relationship, FieldValue::Item(_) | FieldValue::Scalar(_)) => {
                return None;
            }
            (FieldKind::Relationship | FieldKind::SingleReference, _) if !depth.expands() => {
                self.raw(value)
            }
            (FieldKind::Relationship, FieldValue::List(elements)) => Value::Array(
                elements
                    .iter()
                    .map(|element| match element {
                        FieldValue::Item(handle) => self.reference(handle.id, depth.decrement()),
                        scalar => self.raw(scalar),
                    })
                    .collect(),
            ),
            (FieldKind::SingleReference, FieldValue::Item(handle)) => {
                self.reference(handle.id, depth.decrement())
            }
            (_, FieldValue::Scalar(Value::String(text))) => {
                Value::String(self.shortcodes.expand(text))
            }
            (_, other) => self.raw(other),
        };
        Some(value)
    }

    fn reference(&self, id: ItemId, depth: ExpandDepth) -> Value {
        match self.store.item(id) {
            Some(item) => Value::Object(self.serialize(item, depth)),
            None => {
                warn!(%id, "referenced item not found in content store");
                Value::from(id.0)
            }
        }
    }

    /// Copy a field value without expansion. Item handles become the
    /// referenced item's base fields, verbatim.
    fn raw(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::Item(handle) => match self.store.item(handle.id) {
                Some(item) => Value::Object(
                    item.fields
                        .iter()
                        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                        .collect(),
                ),
                None => Value::from(handle.id.0),
            },
            FieldValue::List(elements) => {
                Value::Array(elements.iter().map(|element| self.raw(element)).collect())
            }
            FieldValue::Scalar(scalar) => scalar.clone(),
        }
    }
}
