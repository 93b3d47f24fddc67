//! Aggregated document assembler.
//!
//! Takes the selected fragments, re-groups them by category in selection
//! order, sorts each bucket by `order`, and renders one Markdown document:
//!
//! ```text
//! # <document title>
//!
//! ## <Category>
//!
//! <body>
//!
//! <body>
//!
//! ## <Next category>
//! ...
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use clinerules_shared::Fragment;

use crate::group::{group_by_category, sort_buckets};

/// Number of characters of the document shown before confirmation.
pub const PREVIEW_CHARS: usize = 500;

/// One `## Category` section of an assembled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    /// Category label as declared.
    pub category: String,
    /// Rendered heading text.
    pub heading: String,
    /// Number of fragments in the section.
    pub count: usize,
}

/// Output of [`assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    /// Full document text.
    pub content: String,
    /// Sections in output order.
    pub sections: Vec<SectionSummary>,
}

/// Render the selected fragments into one document.
///
/// Categories appear in the order they are first seen in `selected` (not the
/// selector's display order). Bodies are concatenated verbatim, each followed
/// by a blank line.
#[instrument(skip_all, fields(selected = selected.len()))]
pub fn assemble(selected: &[&Fragment], title: &str) -> AssembledDocument {
    let mut buckets = group_by_category(selected.iter().copied());
    sort_buckets(&mut buckets);

    let mut content = format!("# {title}\n\n");
    let mut sections = Vec::with_capacity(buckets.len());

    for bucket in &buckets {
        let heading = bucket.heading();
        content.push_str(&format!("## {heading}\n\n"));
        for fragment in &bucket.fragments {
            content.push_str(&fragment.body);
            content.push_str("\n\n");
        }
        sections.push(SectionSummary {
            category: bucket.category.clone(),
            heading,
            count: bucket.fragments.len(),
        });
    }

    debug!(
        sections = sections.len(),
        len = content.len(),
        "document assembled"
    );

    AssembledDocument { content, sections }
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// What the operator sees before confirming the write.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    /// Titles of the selected fragments, in selection order.
    pub titles: Vec<String>,
    /// The first [`PREVIEW_CHARS`] characters of the document.
    pub excerpt: String,
    /// Whether `excerpt` is shorter than the document.
    pub truncated: bool,
    /// Category structure of the document.
    pub sections: Vec<SectionSummary>,
    /// Where the document would be written.
    pub destination: PathBuf,
}

impl Preview {
    pub fn new(selected: &[&Fragment], document: &AssembledDocument, destination: &Path) -> Self {
        let (excerpt, truncated) = excerpt(&document.content, PREVIEW_CHARS);
        Self {
            titles: selected.iter().map(|f| f.meta.title.clone()).collect(),
            excerpt,
            truncated,
            sections: document.sections.clone(),
            destination: destination.to_path_buf(),
        }
    }
}

/// First `max_chars` characters of `text`, and whether it was cut.
fn excerpt(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (text[..cut].to_string(), true),
        None => (text.to_string(), false),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use clinerules_markdown::category_headings;
    use serde_json::json;

    use super::*;
    use crate::group::tests::fragment;

    fn scenario() -> Vec<Fragment> {
        vec![
            fragment(0, "a.md", json!({ "category": "api", "order": 2, "title": "A" }), "Alpha"),
            fragment(1, "b.md", json!({ "category": "api", "order": 1, "title": "B" }), "Beta"),
            fragment(2, "c.md", json!({}), "Gamma"),
        ]
    }

    #[test]
    fn scenario_api_then_uncategorized_with_b_before_a() {
        let frags = scenario();
        let selected: Vec<&Fragment> = frags.iter().collect();

        let doc = assemble(&selected, "Project Guidelines");
        assert_eq!(
            doc.content,
            "# Project Guidelines\n\n## Api\n\nBeta\n\nAlpha\n\n## Uncategorized\n\nGamma\n\n"
        );
        assert_eq!(
            doc.sections.iter().map(|s| s.category.as_str()).collect::<Vec<_>>(),
            vec!["api", "uncategorized"]
        );
        assert_eq!(doc.sections[0].count, 2);
    }

    #[test]
    fn output_follows_selection_order_not_display_order() {
        let frags = vec![
            fragment(0, "dev.md", json!({ "category": "development" }), "Dev"),
            fragment(1, "misc.md", json!({}), "Misc"),
        ];
        let selected = vec![&frags[1], &frags[0]];

        let doc = assemble(&selected, "T");
        assert_eq!(category_headings(&doc.content), vec!["Uncategorized", "Development"]);
    }

    #[test]
    fn every_body_appears_exactly_once() {
        let frags = scenario();
        let selected: Vec<&Fragment> = frags.iter().collect();
        let doc = assemble(&selected, "T");
        for body in ["Alpha", "Beta", "Gamma"] {
            assert_eq!(doc.content.matches(body).count(), 1, "{body}");
        }
    }

    #[test]
    fn headings_round_trip_to_first_seen_categories() {
        let frags = vec![
            fragment(0, "1.md", json!({ "category": "frontend" }), "one"),
            fragment(1, "2.md", json!({ "category": "api" }), "two"),
            fragment(2, "3.md", json!({ "category": "frontend" }), "three"),
            fragment(3, "4.md", json!({ "category": "testing" }), "four"),
        ];
        let selected = vec![&frags[1], &frags[0], &frags[3], &frags[2]];
        let doc = assemble(&selected, "T");

        let expected: Vec<String> = doc.sections.iter().map(|s| s.heading.clone()).collect();
        assert_eq!(expected, vec!["Api", "Frontend", "Testing"]);
        assert_eq!(category_headings(&doc.content), expected);
    }

    #[test]
    fn ties_keep_selection_order() {
        let frags = vec![
            fragment(0, "x.md", json!({ "category": "api" }), "X"),
            fragment(1, "y.md", json!({ "category": "api" }), "Y"),
        ];
        let doc = assemble(&[&frags[1], &frags[0]], "T");
        assert!(doc.content.find("Y").unwrap() < doc.content.find("X").unwrap());
    }

    #[test]
    fn bodies_are_not_trimmed() {
        let frags = vec![fragment(0, "s.md", json!({}), "\n  padded  \n")];
        let doc = assemble(&[&frags[0]], "T");
        assert!(doc.content.contains("## Uncategorized\n\n\n  padded  \n\n\n"));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(PREVIEW_CHARS + 10);
        let frags = vec![fragment(0, "long.md", json!({ "title": "Long" }), &long)];
        let selected = vec![&frags[0]];
        let doc = assemble(&selected, "T");

        let preview = Preview::new(&selected, &doc, Path::new("/p/.clinerules"));
        assert!(preview.truncated);
        assert_eq!(preview.excerpt.chars().count(), PREVIEW_CHARS);
        assert_eq!(preview.titles, vec!["Long"]);
    }

    #[test]
    fn short_document_is_not_truncated() {
        let frags = scenario();
        let selected: Vec<&Fragment> = frags.iter().collect();
        let doc = assemble(&selected, "T");
        let preview = Preview::new(&selected, &doc, Path::new(".clinerules"));
        assert!(!preview.truncated);
        assert_eq!(preview.excerpt, doc.content);
    }
}
