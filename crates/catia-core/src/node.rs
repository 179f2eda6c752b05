//! Snapshots of DOM nodes as delivered by the host adapter.
//!
//! A snapshot is everything the capture pipeline needs to know about an
//! event target: its tag, its parent's tag, its attributes in document
//! order, and the few properties used to decide editability and focus.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tags whose contents can be typed into.
const EDITABLE_TAGS: &[&str] = &["input", "textarea"];

/// Tags that take part in sequential focus navigation by default.
const FOCUSABLE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

/// Element attributes in insertion order.
///
/// Serialized as a JSON object. Deserialization keeps the order keys appear
/// in the document, which the selector builder relies on when it picks the
/// first non-empty attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute. Replacing an existing name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to string values")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Attributes, M::Error> {
                let mut attrs = Attributes::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    attrs.insert(name, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// A read-only view of an event target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    /// Node name as reported by the host (`BUTTON`, `div`, ...).
    pub name: String,
    /// Parent node name, empty for detached or root nodes.
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub class_list: Vec<String>,
    /// Value of the `contentEditable` property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_editable: Option<String>,
    /// Explicit `tabIndex`. When absent the tag's default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

impl NodeSnapshot {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = parent.into();
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    #[must_use]
    pub fn with_content_editable(mut self, value: impl Into<String>) -> Self {
        self.content_editable = Some(value.into());
        self
    }

    /// Lower-cased tag name.
    pub fn tag(&self) -> String {
        self.name.to_lowercase()
    }

    /// Lower-cased parent tag name.
    pub fn parent_tag(&self) -> String {
        self.parent_name.to_lowercase()
    }

    /// The `class` attribute, or the class list joined by spaces when the
    /// host only reported the list.
    pub fn class_value(&self) -> Option<String> {
        match self.attributes.get("class") {
            Some(class) => Some(class.to_string()),
            None if !self.class_list.is_empty() => Some(self.class_list.join(" ")),
            None => None,
        }
    }

    /// The `type` of an input element, lower-cased.
    pub fn input_type(&self) -> Option<String> {
        if self.tag() != "input" {
            return None;
        }
        Some(
            self.attributes
                .get("type")
                .filter(|t| !t.is_empty())
                .map_or_else(|| "text".to_string(), str::to_lowercase),
        )
    }

    pub fn is_password(&self) -> bool {
        self.input_type().as_deref() == Some("password")
    }

    pub fn is_editable(&self) -> bool {
        let tag = self.tag();
        EDITABLE_TAGS.contains(&tag.as_str()) || self.content_editable.as_deref() == Some("true")
    }

    pub fn is_focusable(&self) -> bool {
        let tab_index = self.tab_index.unwrap_or_else(|| {
            if FOCUSABLE_TAGS.contains(&self.tag().as_str()) {
                0
            } else {
                -1
            }
        });
        tab_index >= 0
    }

    /// First non-empty of `value`, `innerHTML`, `textContent`.
    pub fn text_value(&self) -> Option<&str> {
        [&self.value, &self.inner_html, &self.text_content]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }
}
