//! Operator selection of fragments.
//!
//! The selector builds a [`ChoiceSet`] grouped by category, hands it to a
//! [`Prompter`] (the interactive-input capability) and maps the references
//! it returns back to fragments.

use std::collections::HashSet;
use std::future::Future;

use tracing::{debug, info, instrument};

use clinerules_shared::{ClineRulesError, Fragment, FragmentRef, Result};

use crate::assembler::Preview;
use crate::group::{display_order, group_by_category};

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

/// One line of the selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Non-selectable marker: a category header or a blank spacer.
    Separator(String),
    /// Selectable fragment.
    Item {
        label: String,
        fragment: FragmentRef,
        checked: bool,
    },
}

impl Choice {
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Item { .. })
    }
}

/// Choices grouped by category, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceSet {
    pub choices: Vec<Choice>,
}

impl ChoiceSet {
    /// Build the grouped display for `fragments`.
    ///
    /// Each non-empty category contributes a `=== Category ===` header, one
    /// unchecked item per fragment, and a blank spacer.
    pub fn build(fragments: &[Fragment], category_order: &[String]) -> Self {
        let buckets = display_order(group_by_category(fragments), category_order);

        let mut choices = Vec::with_capacity(fragments.len() + buckets.len() * 2);
        for bucket in &buckets {
            choices.push(Choice::Separator(format!("=== {} ===", bucket.heading())));
            for fragment in &bucket.fragments {
                choices.push(Choice::Item {
                    label: fragment.meta.label(),
                    fragment: fragment.id,
                    checked: false,
                });
            }
            choices.push(Choice::Separator(" ".to_string()));
        }

        Self { choices }
    }

    /// Selectable items as `(label, reference)`, in display order.
    pub fn items(&self) -> impl Iterator<Item = (&str, FragmentRef)> {
        self.choices.iter().filter_map(|c| match c {
            Choice::Item {
                label, fragment, ..
            } => Some((label.as_str(), *fragment)),
            Choice::Separator(_) => None,
        })
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    pub fn contains(&self, fragment: FragmentRef) -> bool {
        self.items().any(|(_, r)| r == fragment)
    }

    /// Reference of the `n`th selectable item (0-based).
    pub fn nth_item(&self, n: usize) -> Option<FragmentRef> {
        self.items().nth(n).map(|(_, r)| r)
    }
}

// ---------------------------------------------------------------------------
// Prompter capability
// ---------------------------------------------------------------------------

/// Interactive-input capability driving the selector.
///
/// Both methods are suspension points: the pipeline waits, without timeout,
/// until the operator answers.
pub trait Prompter {
    /// Show `choices` and return the references the operator checked.
    fn present(
        &mut self,
        choices: &ChoiceSet,
    ) -> impl Future<Output = Result<Vec<FragmentRef>>> + Send;

    /// Show the preview and ask whether to write the document.
    fn confirm(&mut self, preview: &Preview) -> impl Future<Output = Result<bool>> + Send;
}

/// Parse a typed answer into 0-based item positions.
///
/// `all` (any case) selects every item. Otherwise the answer is a
/// comma-separated list of 1-based numbers; tokens that are not numbers or
/// are out of range are ignored, repeats are dropped.
pub fn parse_selection(answer: &str, item_count: usize) -> Vec<usize> {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("all") {
        return (0..item_count).collect();
    }

    let mut seen = HashSet::new();
    answer
        .split(',')
        .filter_map(|token| token.trim().parse::<usize>().ok())
        .filter(|n| (1..=item_count).contains(n))
        .map(|n| n - 1)
        .filter(|pos| seen.insert(*pos))
        .collect()
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Present `choices` through `prompter` and resolve the answer to fragments.
///
/// The result follows the order the prompter returned. References unknown to
/// the choice set are dropped, as are repeats.
#[instrument(skip_all, fields(items = choices.item_count()))]
pub async fn select<'a, P: Prompter>(
    fragments: &'a [Fragment],
    choices: &ChoiceSet,
    prompter: &mut P,
) -> Result<Vec<&'a Fragment>> {
    let refs = prompter.present(choices).await?;

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(refs.len());
    for r in refs {
        if !choices.contains(r) {
            debug!(fragment = %r, "ignoring reference outside the choice set");
            continue;
        }
        if !seen.insert(r) {
            continue;
        }
        let fragment = fragments
            .iter()
            .find(|f| f.id == r)
            .ok_or_else(|| ClineRulesError::validation(format!("unknown fragment {r}")))?;
        selected.push(fragment);
    }

    info!(selected = selected.len(), "selection received");
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::group::tests::fragment;
    use crate::prompt::ScriptedPrompter;

    fn order() -> Vec<String> {
        clinerules_shared::DEFAULT_CATEGORY_ORDER
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn sample() -> Vec<Fragment> {
        vec![
            fragment(0, "a.md", json!({ "category": "api", "title": "A", "description": "first" }), "A"),
            fragment(1, "b.md", json!({ "category": "development" }), "B"),
            fragment(2, "c.md", json!({}), "C"),
        ]
    }

    #[test]
    fn choice_set_groups_in_display_order() {
        let set = ChoiceSet::build(&sample(), &order());
        assert_eq!(
            set.choices,
            vec![
                Choice::Separator("=== Development ===".into()),
                Choice::Item { label: "b".into(), fragment: FragmentRef(1), checked: false },
                Choice::Separator(" ".into()),
                Choice::Separator("=== Api ===".into()),
                Choice::Item { label: "A - first".into(), fragment: FragmentRef(0), checked: false },
                Choice::Separator(" ".into()),
                Choice::Separator("=== Uncategorized ===".into()),
                Choice::Item { label: "c".into(), fragment: FragmentRef(2), checked: false },
                Choice::Separator(" ".into()),
            ]
        );
        assert_eq!(set.item_count(), 3);
        assert_eq!(set.nth_item(1), Some(FragmentRef(0)));
    }

    #[test]
    fn empty_fragment_list_has_no_choices() {
        let set = ChoiceSet::build(&[], &order());
        assert!(set.choices.is_empty());
    }

    #[test]
    fn parse_selection_rules() {
        assert_eq!(parse_selection("all", 3), vec![0, 1, 2]);
        assert_eq!(parse_selection("  ALL \n", 2), vec![0, 1]);
        assert_eq!(parse_selection("3, 1", 3), vec![2, 0]);
        assert_eq!(parse_selection("1,1,2", 3), vec![0, 1]);
        assert_eq!(parse_selection("0,4,x,-1, 2", 3), vec![1]);
        assert!(parse_selection("", 3).is_empty());
    }

    #[tokio::test]
    async fn select_maps_refs_in_prompter_order() {
        let frags = sample();
        let set = ChoiceSet::build(&frags, &order());
        let mut prompter =
            ScriptedPrompter::refs(vec![FragmentRef(2), FragmentRef(0), FragmentRef(2), FragmentRef(9)]);

        let selected = select(&frags, &set, &mut prompter).await.unwrap();
        let files: Vec<&str> = selected.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, vec!["c.md", "a.md"]);
    }

    #[tokio::test]
    async fn nothing_checked_is_empty() {
        let frags = sample();
        let set = ChoiceSet::build(&frags, &order());
        let mut prompter = ScriptedPrompter::refs(vec![]);
        assert!(select(&frags, &set, &mut prompter).await.unwrap().is_empty());
    }
}
