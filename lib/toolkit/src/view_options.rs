//! Presentation hints for definition forms.
//!
//! The core stores these alongside a definition and hands them to the UI
//! unchanged. Nothing in validation or execution reads them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A labelled group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewGroup {
    /// Group heading.
    pub label: String,
    /// Field keys shown in this group, in order.
    pub keys: Vec<String>,
}

/// Opaque presentation metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Preferred field order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
    /// Field groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ViewGroup>,
    /// Any other renderer-specific keys, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ViewOptions {
    /// Creates empty view options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the preferred field order.
    #[must_use]
    pub fn with_order<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a field group.
    #[must_use]
    pub fn with_group<I, S>(mut self, label: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(ViewGroup {
            label: label.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sets a renderer-specific key.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
