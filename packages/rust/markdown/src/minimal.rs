//! Line-based `key: value` front matter, for fragments that only use flat
//! scalar metadata.

use serde_json::{Map, Value};
use tracing::debug;

use clinerules_shared::Result;

use crate::{FrontMatterParser, ParsedDocument, split_front_matter, strip_bom};

/// Flat `key: value` metadata without a YAML dependency at parse time.
///
/// Quotes around values are stripped, integers and `true`/`false` are typed,
/// blank lines and `#` comments are skipped. Lines without a colon are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalFrontMatter;

impl FrontMatterParser for MinimalFrontMatter {
    fn parse(&self, text: &str) -> Result<ParsedDocument> {
        let Some((block, body)) = split_front_matter(text) else {
            return Ok(ParsedDocument {
                data: Map::new(),
                body: strip_bom(text).to_string(),
            });
        };

        let mut data = Map::new();
        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                debug!(line, "skipping metadata line without a key");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            data.insert(key.to_string(), typed_value(value.trim()));
        }

        Ok(ParsedDocument {
            data,
            body: body.to_string(),
        })
    }
}

fn typed_value(raw: &str) -> Value {
    if let Some(quoted) = unquote(raw) {
        return Value::String(quoted.to_string());
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn unquote(raw: &str) -> Option<&str> {
    ['"', '\''].iter().find_map(|q| {
        raw.strip_prefix(*q)
            .and_then(|rest| rest.strip_suffix(*q))
    })
}
