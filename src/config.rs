//! The shared configuration document.
//!
//! A [`Config`] is an immutable snapshot: category name to word list, an
//! optional display order, and informational size/line hints. A config with a
//! non-empty `error` stands for a failed resolution and carries no categories.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use derive_getters::Getters;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::bingo::{GRID_SIZE, REQUIRED_LINES};

/// Legacy document keys and the canonical key each one stands for.
const KEY_ALIASES: [(&str, &str); 3] = [
    ("cats", "categories"),
    ("ord", "order"),
    ("lines", "requiredLines"),
];

/// Category name to word pool, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories(Vec<(String, Vec<String>)>);

impl Categories {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a category. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, words: Vec<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = words,
            None => self.0.push((name, words)),
        }
    }

    /// Word pool for `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, words)| words.as_slice())
    }

    /// Whether `name` is a category.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Category names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    /// Iterates `(name, words)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(n, w)| (n.as_str(), w.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no categories.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<String>)> for Categories {
    fn from_iter<I: IntoIterator<Item = (N, Vec<String>)>>(iter: I) -> Self {
        let mut categories = Self::new();
        for (name, words) in iter {
            categories.insert(name, words);
        }
        categories
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, words) in &self.0 {
            map.serialize_entry(name, words)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to a list of words")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Categories, A::Error> {
                let mut categories = Categories::new();
                while let Some((name, pool)) = access.next_entry::<String, Value>()? {
                    categories.insert(name, pool_words(pool));
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// Reads a word pool loosely: numbers and booleans become words, nulls and
/// nested values are skipped, and a pool that is not a list is empty.
fn pool_words(pool: Value) -> Vec<String> {
    let Value::Array(items) = pool else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(word) => Some(word),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

/// A resolved configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Category name to word pool.
    #[serde(alias = "cats")]
    categories: Categories,

    /// Grid size hint. Informational; cards are always [`GRID_SIZE`].
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    size: Option<u32>,

    /// Required lines hint. Informational; bingo is always [`REQUIRED_LINES`].
    #[serde(
        default,
        alias = "lines",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    required_lines: Option<u32>,

    /// Preferred display order of categories.
    #[serde(
        default,
        alias = "ord",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    order: Option<Vec<String>>,

    /// ISO-8601 publish time.
    #[getter(skip)]
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,

    /// Failure reason; set only on failed resolutions or error payloads.
    #[getter(skip)]
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Keeps optional fields that have the wrong JSON type from failing the
/// whole document; they read as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl Config {
    /// Creates a config holding `categories` and nothing else.
    pub fn new(categories: Categories) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    /// Sets the display order.
    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the publish timestamp.
    pub fn with_updated_at(mut self, updated_at: impl Into<String>) -> Self {
        self.updated_at = Some(updated_at.into());
        self
    }

    /// A terminal resolution failure: no categories, default hints, and `reason`.
    #[instrument(skip(reason))]
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(reason = %reason, "Building failed config");
        Self {
            categories: Categories::new(),
            size: Some(GRID_SIZE as u32),
            required_lines: Some(REQUIRED_LINES as u32),
            order: None,
            updated_at: None,
            error: Some(reason),
        }
    }

    /// Parses a JSON value, accepting the legacy `cats`/`ord`/`lines` keys.
    ///
    /// When both spellings are present the canonical key wins.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(map) = &mut value {
            canonicalize_keys(map);
        }
        serde_json::from_value(value)
    }

    /// Failure reason, if any. An empty string does not count.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Whether this snapshot represents a failed resolution.
    pub fn is_failed(&self) -> bool {
        self.error().is_some()
    }

    /// Raw publish timestamp.
    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    /// Publish timestamp, when it parses as RFC 3339.
    pub fn updated_at_parsed(&self) -> Option<DateTime<FixedOffset>> {
        self.updated_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    /// Word pool for a category.
    pub fn words(&self, name: &str) -> Option<&[String]> {
        self.categories.get(name)
    }

    /// Categories to display, in order.
    ///
    /// `order` filtered to names that exist (first occurrence only); when that
    /// leaves nothing, every category in document order.
    pub fn category_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        if let Some(order) = &self.order {
            for name in order {
                if self.categories.contains(name) && !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        if names.is_empty() {
            names = self.categories.names().collect();
        }
        names
    }
}

/// Renames legacy keys to their canonical spelling, dropping the legacy
/// value when the canonical key is already present.
fn canonicalize_keys(map: &mut Map<String, Value>) {
    for (legacy, canonical) in KEY_ALIASES {
        if let Some(value) = map.remove(legacy) {
            if !map.contains_key(canonical) {
                map.insert(canonical.to_string(), value);
            }
        }
    }
}
