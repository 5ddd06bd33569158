// ── Tag model ──
//
// NetBox serializes tags as `{"id": .., "name": "wifi", "slug": ..}`,
// while snapshots and hand-written payloads may carry bare strings.
// Both collapse into a `Tag` once, before any set logic runs.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single tag, remembering which representation it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Structured object carrying a `name` field.
    Named(String),
    /// Anything else, converted to its direct string form.
    Raw(String),
}

impl Tag {
    /// Normalize any JSON tag representation. Total: never fails.
    ///
    /// Objects yield their `name` (empty when absent or null, JSON text
    /// when not a string). Strings yield themselves; other values yield
    /// their JSON text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Named(match map.get("name") {
                Some(Value::String(name)) => name.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }),
            Value::String(raw) => Self::Raw(raw.clone()),
            other => Self::Raw(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Raw(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Self::Named(name) | Self::Raw(name) => name,
        }
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extract the comparable name from any tag representation.
pub fn extract_name(value: &Value) -> String {
    Tag::from_value(value).into_name()
}

/// Device-facing VLAN name: every space becomes an underscore.
///
/// Only used for the string sent to switches, never for tag comparison.
pub fn normalize_vlan_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// What to do with tags whose extracted name is empty.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmptyTagPolicy {
    /// Empty names participate in set operations like any other name.
    Keep,
    /// Empty names are dropped while building a [`TagSet`].
    #[default]
    Discard,
}

/// An ordered set of tag names.
///
/// Ordered so that log output and reports are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from normalized tags, applying the empty-name policy.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>, policy: EmptyTagPolicy) -> Self {
        Self(
            tags.into_iter()
                .map(Tag::into_name)
                .filter(|name| policy == EmptyTagPolicy::Keep || !name.is_empty())
                .collect(),
        )
    }

    /// Build from raw JSON tag representations.
    pub fn from_values<'a>(
        values: impl IntoIterator<Item = &'a Value>,
        policy: EmptyTagPolicy,
    ) -> Self {
        Self::from_tags(values.into_iter().map(Tag::from_value), policy)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Non-empty intersection.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    /// Names in `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name:?}")?;
        }
        f.write_str("}")
    }
}
