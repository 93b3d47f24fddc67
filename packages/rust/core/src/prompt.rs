//! Line-oriented and scripted [`Prompter`] implementations.
//!
//! [`TextPrompter`] is the numbered-list front end: it prints the grouped
//! choices and reads a typed answer (`all` or `1,3,5`). [`ScriptedPrompter`]
//! answers without a terminal, for tests and non-interactive runs.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use clinerules_shared::{ClineRulesError, FragmentRef, Result};

use crate::assembler::Preview;
use crate::selector::{Choice, ChoiceSet, Prompter, parse_selection};

// ---------------------------------------------------------------------------
// Text prompter
// ---------------------------------------------------------------------------

/// Numbered-list prompt over any async line reader and sync writer.
pub struct TextPrompter<R, W> {
    reader: R,
    writer: W,
}

impl TextPrompter<BufReader<tokio::io::Stdin>, std::io::Stdout> {
    /// Prompt on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
    }
}

impl<R, W> TextPrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer, e.g. to inspect what was printed.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| ClineRulesError::prompt(format!("could not write prompt: {e}")))
    }

    async fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(|e| ClineRulesError::prompt(format!("could not read answer: {e}")))?;
        if n == 0 {
            return Err(ClineRulesError::prompt("input closed before an answer was given"));
        }
        Ok(line)
    }
}

impl<R, W> Prompter for TextPrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn present(&mut self, choices: &ChoiceSet) -> Result<Vec<FragmentRef>> {
        self.print(&render_choices(choices))?;
        let answer = self.read_answer().await?;

        let positions = parse_selection(&answer, choices.item_count());
        debug!(answer = answer.trim(), picked = positions.len(), "typed selection");

        Ok(positions
            .into_iter()
            .filter_map(|pos| choices.nth_item(pos))
            .collect())
    }

    async fn confirm(&mut self, preview: &Preview) -> Result<bool> {
        self.print(&render_preview(preview))?;
        loop {
            self.print(&format!("Write {}? [Y/n] ", preview.destination.display()))?;
            let answer = self.read_answer().await?;
            match parse_confirm(&answer) {
                Some(yes) => return Ok(yes),
                None => self.print("Please answer y or n.\n")?,
            }
        }
    }
}

/// Render the grouped choices as a numbered list plus instructions.
pub fn render_choices(choices: &ChoiceSet) -> String {
    let mut out = String::from("Available rules:\n");
    let mut n = 0;
    for choice in &choices.choices {
        match choice {
            Choice::Separator(label) if label.trim().is_empty() => out.push('\n'),
            Choice::Separator(label) => {
                out.push_str(label);
                out.push('\n');
            }
            Choice::Item { label, .. } => {
                n += 1;
                out.push_str(&format!("{n:>3}. {label}\n"));
            }
        }
    }
    out.push_str("Type \"all\" to select every rule, or comma-separated numbers (e.g. 1,3,5).\n");
    out.push_str("Rules to include: ");
    out
}

/// Render the pre-write summary: chosen titles, excerpt, and category counts.
pub fn render_preview(preview: &Preview) -> String {
    let mut out = String::from("\nSelected rules:\n");
    for title in &preview.titles {
        out.push_str(&format!("- {title}\n"));
    }

    out.push_str(&format!(
        "\nPreview of {}:\n----------------------------------------\n",
        preview.destination.display()
    ));
    out.push_str(&preview.excerpt);
    if preview.truncated {
        out.push_str("...");
    }
    out.push('\n');

    out.push_str("\nCategory structure:\n");
    for section in &preview.sections {
        out.push_str(&format!("- {} ({} rules)\n", section.heading, section.count));
    }
    out
}

/// `y`/`yes`/empty → yes, `n`/`no` → no, anything else → ask again.
pub fn parse_confirm(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Scripted prompter
// ---------------------------------------------------------------------------

/// What a [`ScriptedPrompter`] answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    /// Every selectable item.
    All,
    /// A typed answer, interpreted like [`TextPrompter`] input.
    Typed(String),
    /// Exact references, returned as given.
    Refs(Vec<FragmentRef>),
}

/// Deterministic prompter: fixed answer, fixed confirmation.
///
/// Records every choice set and preview it was shown.
#[derive(Debug, Clone)]
pub struct ScriptedPrompter {
    answer: ScriptedAnswer,
    confirm: bool,
    pub presented: Vec<ChoiceSet>,
    pub previews: Vec<Preview>,
}

impl ScriptedPrompter {
    pub fn new(answer: ScriptedAnswer) -> Self {
        Self {
            answer,
            confirm: true,
            presented: Vec::new(),
            previews: Vec::new(),
        }
    }

    pub fn all() -> Self {
        Self::new(ScriptedAnswer::All)
    }

    pub fn refs(refs: Vec<FragmentRef>) -> Self {
        Self::new(ScriptedAnswer::Refs(refs))
    }

    /// Answer as if `answer` had been typed at the text prompt.
    pub fn typed(answer: impl Into<String>) -> Self {
        Self::new(ScriptedAnswer::Typed(answer.into()))
    }

    /// Set the confirmation answer (default: yes).
    pub fn with_confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }
}

impl Prompter for ScriptedPrompter {
    async fn present(&mut self, choices: &ChoiceSet) -> Result<Vec<FragmentRef>> {
        self.presented.push(choices.clone());
        let refs = match &self.answer {
            ScriptedAnswer::All => choices.items().map(|(_, r)| r).collect(),
            ScriptedAnswer::Typed(answer) => parse_selection(answer, choices.item_count())
                .into_iter()
                .filter_map(|pos| choices.nth_item(pos))
                .collect(),
            ScriptedAnswer::Refs(refs) => refs.clone(),
        };
        Ok(refs)
    }

    async fn confirm(&mut self, preview: &Preview) -> Result<bool> {
        self.previews.push(preview.clone());
        Ok(self.confirm)
    }
}
