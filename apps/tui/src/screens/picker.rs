//! Checkbox list over the grouped rule choices.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use clinerules_core::selector::{Choice, ChoiceSet};
use clinerules_shared::FragmentRef;

use super::{ScreenAction, ScreenId, is_interrupt};
use crate::widgets::status_bar;

/// Rows moved by PageUp/PageDown.
pub(crate) const PAGE_SIZE: usize = 20;

pub(crate) struct PickerScreen {
    choices: ChoiceSet,
    /// Index into `choices.choices`; always on an item when one exists.
    cursor: usize,
    list_state: ListState,
}

impl PickerScreen {
    pub(crate) fn new(choices: ChoiceSet) -> Self {
        let cursor = choices
            .choices
            .iter()
            .position(Choice::is_selectable)
            .unwrap_or(0);
        Self {
            choices,
            cursor,
            list_state: ListState::default().with_selected(Some(cursor)),
        }
    }

    /// Checked references, in display order.
    pub(crate) fn checked(&self) -> Vec<FragmentRef> {
        self.choices
            .choices
            .iter()
            .filter_map(|c| match c {
                Choice::Item {
                    fragment,
                    checked: true,
                    ..
                } => Some(*fragment),
                _ => None,
            })
            .collect()
    }

    fn checked_count(&self) -> usize {
        self.checked().len()
    }

    pub(crate) fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // List
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let items: Vec<ListItem> = self
            .choices
            .choices
            .iter()
            .map(|choice| match choice {
                Choice::Separator(label) => ListItem::new(label.clone()).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Choice::Item { label, checked, .. } => {
                    let mark = if *checked { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{mark} {label}"))
                }
            })
            .collect();

        let title = format!(
            " {} ({}/{} checked) ",
            ScreenId::Picker,
            self.checked_count(),
            self.choices.item_count()
        );
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        self.list_state.select(Some(self.cursor));
        f.render_stateful_widget(list, chunks[0], &mut self.list_state);

        f.render_widget(
            status_bar("↑/↓ move  space toggle  a all  enter submit  q quit"),
            chunks[1],
        );
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> ScreenAction<Vec<FragmentRef>> {
        if is_interrupt(code, modifiers) {
            return ScreenAction::Abort;
        }

        match code {
            KeyCode::Up | KeyCode::Char('k') => self.step_back(1),
            KeyCode::Down | KeyCode::Char('j') => self.step_forward(1),
            KeyCode::PageUp => self.step_back(PAGE_SIZE),
            KeyCode::PageDown => self.step_forward(PAGE_SIZE),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('a') => self.toggle_all(),
            KeyCode::Enter => return ScreenAction::Finish(self.checked()),
            KeyCode::Char('q') | KeyCode::Esc => return ScreenAction::Abort,
            _ => {}
        }
        ScreenAction::Continue
    }

    /// Move up by `steps` selectable items, stopping at the first.
    fn step_back(&mut self, steps: usize) {
        for _ in 0..steps {
            match (0..self.cursor)
                .rev()
                .find(|&i| self.choices.choices[i].is_selectable())
            {
                Some(prev) => self.cursor = prev,
                None => break,
            }
        }
    }

    /// Move down by `steps` selectable items, stopping at the last.
    fn step_forward(&mut self, steps: usize) {
        for _ in 0..steps {
            match (self.cursor + 1..self.choices.choices.len())
                .find(|&i| self.choices.choices[i].is_selectable())
            {
                Some(next) => self.cursor = next,
                None => break,
            }
        }
    }

    fn toggle_current(&mut self) {
        if let Some(Choice::Item { checked, .. }) = self.choices.choices.get_mut(self.cursor) {
            *checked = !*checked;
        }
    }

    /// Check everything, or clear everything when all are already checked.
    fn toggle_all(&mut self) {
        let target = self.checked_count() < self.choices.item_count();
        for choice in &mut self.choices.choices {
            if let Choice::Item { checked, .. } = choice {
                *checked = target;
            }
        }
    }
}
