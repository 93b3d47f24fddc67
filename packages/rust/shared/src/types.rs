//! Core domain types for rule fragments and their category buckets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sort key used when a fragment declares no `order`.
///
/// A fragment that explicitly declares `order: 999` sorts identically.
pub const DEFAULT_ORDER: i64 = 999;

/// Category label for fragments without a `category`.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// File extension (without the dot) that marks a fragment file.
pub const FRAGMENT_EXTENSION: &str = "md";

/// File name of the aggregated output document.
pub const OUTPUT_FILE_NAME: &str = ".clinerules";

/// Preferred display order of known categories in the selector.
pub const DEFAULT_CATEGORY_ORDER: &[&str] = &[
    "development",
    "documentation",
    "frontend",
    "api",
    DEFAULT_CATEGORY,
];

// ---------------------------------------------------------------------------
// FragmentRef
// ---------------------------------------------------------------------------

/// Stable reference to a fragment: its position in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentRef(pub usize);

impl std::fmt::Display for FragmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// FragmentMeta
// ---------------------------------------------------------------------------

/// Normalized metadata of one fragment, with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentMeta {
    /// Display title (declared, or the file stem).
    pub title: String,
    /// Free-text description shown next to the title in the selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category label (declared, or [`DEFAULT_CATEGORY`]).
    pub category: String,
    /// Ordering hint within the category (declared, or [`DEFAULT_ORDER`]).
    pub order: i64,
    /// Keys the pipeline does not interpret.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl FragmentMeta {
    /// Normalize a raw front-matter mapping for the fragment named `file`.
    ///
    /// Missing, empty, or unusable values fall back to their defaults; this
    /// never fails.
    pub fn from_data(file: &str, extension: &str, data: &Map<String, Value>) -> Self {
        let title = data
            .get("title")
            .and_then(scalar_text)
            .unwrap_or_else(|| file_stem(file, extension).to_string());

        let description = data.get("description").and_then(scalar_text);

        let category = data
            .get("category")
            .and_then(scalar_text)
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let order = data.get("order").and_then(order_value).unwrap_or(DEFAULT_ORDER);

        let extra = data
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "title" | "description" | "category" | "order"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            title,
            description,
            category,
            order,
            extra,
        }
    }

    /// Metadata for a fragment that has no (usable) metadata block.
    pub fn defaults_for(file: &str, extension: &str) -> Self {
        Self::from_data(file, extension, &Map::new())
    }

    /// Selector label: `<title>` or `<title> - <description>`.
    pub fn label(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} - {desc}", self.title),
            None => self.title.clone(),
        }
    }
}

/// Strip `.<extension>` from the end of a file name, if present.
pub fn file_stem<'a>(file: &'a str, extension: &str) -> &'a str {
    file.strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(file)
}

/// Text form of a scalar value; `None` for empty strings and non-scalars.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn order_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// One discovered rule file: identity, normalized metadata, and body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Position in discovery order.
    pub id: FragmentRef,
    /// File name, unique within the source directory.
    pub file: String,
    /// Normalized metadata.
    pub meta: FragmentMeta,
    /// Document text with the metadata block removed.
    pub body: String,
}

impl Fragment {
    /// Category label, defaults applied.
    pub fn category(&self) -> &str {
        &self.meta.category
    }

    /// Effective sort key, defaults applied.
    pub fn order(&self) -> i64 {
        self.meta.order
    }
}

// ---------------------------------------------------------------------------
// CategoryBucket
// ---------------------------------------------------------------------------

/// Fragments sharing one category label, in bucket order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBucket<'a> {
    /// Category label as declared (lowercase form is not enforced).
    pub category: String,
    /// Member fragments.
    pub fragments: Vec<&'a Fragment>,
}

impl CategoryBucket<'_> {
    /// Heading form of the label: first character upper-cased.
    pub fn heading(&self) -> String {
        capitalize(&self.category)
    }
}

/// Upper-case the first character of `s`, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            format!("{upper}{}", chars.as_str())
        }
        None => String::new(),
    }
}
