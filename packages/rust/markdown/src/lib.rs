//! Front-matter parsing and Markdown outline helpers.
//!
//! A fragment may start with a `---` delimited metadata block. The
//! [`FrontMatterParser`] capability splits such a document into a key/value
//! mapping and the remaining body; [`YamlFrontMatter`] and
//! [`MinimalFrontMatter`] are the two shipped syntaxes.

mod minimal;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use clinerules_shared::{ClineRulesError, FrontMatterKind, Result};

pub use minimal::MinimalFrontMatter;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A document split into its metadata mapping and body text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    /// Raw key/value metadata. Empty when the document has no block.
    pub data: Map<String, Value>,
    /// Everything after the metadata block, unmodified.
    pub body: String,
}

/// Capability: split a document into `(data, body)`.
///
/// Implementations decide the metadata syntax; the delimiter handling is
/// shared through [`split_front_matter`].
pub trait FrontMatterParser: Send + Sync {
    /// Parse `text`. Errors only for a present but malformed block.
    fn parse(&self, text: &str) -> Result<ParsedDocument>;
}

/// Build the parser selected in configuration.
pub fn parser_for(kind: FrontMatterKind) -> Box<dyn FrontMatterParser> {
    match kind {
        FrontMatterKind::Yaml => Box::new(YamlFrontMatter),
        FrontMatterKind::Minimal => Box::new(MinimalFrontMatter),
    }
}

// ---------------------------------------------------------------------------
// Delimiters
// ---------------------------------------------------------------------------

/// Raw split of a document: `(block, body)`, or `None` without a block.
///
/// The block opens only when the first line is exactly `---` (a leading BOM
/// and trailing whitespace are tolerated) and closes at the next `---` line.
/// Without a closing line, the whole remainder is metadata and the body is
/// empty.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = strip_bom(text);

    let (first, rest) = match text.find('\n') {
        Some(idx) => (&text[..idx], &text[idx + 1..]),
        None => (text, ""),
    };
    if !is_delimiter(first) {
        return None;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_delimiter(line) {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Some((rest, ""))
}

/// `text` without a leading UTF-8 byte order mark.
pub(crate) fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

// ---------------------------------------------------------------------------
// YAML
// ---------------------------------------------------------------------------

/// YAML metadata blocks, parsed with `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontMatter;

impl FrontMatterParser for YamlFrontMatter {
    #[instrument(level = "trace", skip_all)]
    fn parse(&self, text: &str) -> Result<ParsedDocument> {
        let Some((block, body)) = split_front_matter(text) else {
            return Ok(ParsedDocument {
                data: Map::new(),
                body: strip_bom(text).to_string(),
            });
        };

        let data = if block.trim().is_empty() {
            Map::new()
        } else {
            yaml_mapping(block)?
        };

        debug!(keys = data.len(), body_len = body.len(), "parsed YAML front matter");

        Ok(ParsedDocument {
            data,
            body: body.to_string(),
        })
    }
}

fn yaml_mapping(block: &str) -> Result<Map<String, Value>> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(block)
        .map_err(|e| ClineRulesError::front_matter(format!("invalid YAML: {e}")))?;

    match yaml {
        serde_yaml::Value::Null => Ok(Map::new()),
        serde_yaml::Value::Mapping(_) => {
            let json = serde_json::to_value(&yaml).map_err(|e| {
                ClineRulesError::front_matter(format!("unsupported metadata value: {e}"))
            })?;
            match json {
                Value::Object(map) => Ok(map),
                _ => Err(ClineRulesError::front_matter("metadata block is not a mapping")),
            }
        }
        _ => Err(ClineRulesError::front_matter("metadata block is not a mapping")),
    }
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// Level-2 heading labels of a document, in order, skipping fenced code.
pub fn category_headings(md: &str) -> Vec<String> {
    static H2_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^## (.+?)\s*$").expect("valid regex"));

    let mut in_fence = false;
    let mut headings = Vec::new();

    for line in md.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = H2_RE.captures(line) {
            headings.push(caps[1].to_string());
        }
    }

    headings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
