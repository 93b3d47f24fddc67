//! Pre-write summary with a yes/no confirmation.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use clinerules_core::assembler::Preview;
use clinerules_core::prompt::render_preview;

use super::{ScreenAction, ScreenId, is_interrupt};
use crate::widgets::status_bar;

pub(crate) struct PreviewScreen {
    text: String,
    scroll: u16,
}

impl PreviewScreen {
    pub(crate) fn new(preview: &Preview) -> Self {
        Self {
            text: render_preview(preview).trim_start().to_string(),
            scroll: 0,
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Summary
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let body = Paragraph::new(self.text.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", ScreenId::Preview)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(body, chunks[0]);

        f.render_widget(
            status_bar("Write this file? y yes  n no  ↑/↓ scroll"),
            chunks[1],
        );
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> ScreenAction<bool> {
        if is_interrupt(code, modifiers) {
            return ScreenAction::Abort;
        }

        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ScreenAction::Finish(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                ScreenAction::Finish(false)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                ScreenAction::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                ScreenAction::Continue
            }
            _ => ScreenAction::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clinerules_core::assembler::SectionSummary;

    use super::*;

    fn preview() -> Preview {
        Preview {
            titles: vec!["Style".into()],
            excerpt: "# Project Guidelines\n\n## Development\n\nUse tabs.".into(),
            truncated: false,
            sections: vec![SectionSummary {
                category: "development".into(),
                heading: "Development".into(),
                count: 1,
            }],
            destination: PathBuf::from("/repo/.clinerules"),
        }
    }

    #[test]
    fn text_lists_titles_and_sections() {
        let screen = PreviewScreen::new(&preview());
        assert!(screen.text.starts_with("Selected rules:"));
        assert!(screen.text.contains("- Style"));
        assert!(screen.text.contains("- Development (1 rules)"));
    }

    #[test]
    fn answers() {
        let mut screen = PreviewScreen::new(&preview());
        assert_eq!(screen.handle_key(KeyCode::Char('y'), KeyModifiers::NONE), ScreenAction::Finish(true));
        assert_eq!(screen.handle_key(KeyCode::Enter, KeyModifiers::NONE), ScreenAction::Finish(true));
        assert_eq!(screen.handle_key(KeyCode::Char('n'), KeyModifiers::NONE), ScreenAction::Finish(false));
        assert_eq!(screen.handle_key(KeyCode::Esc, KeyModifiers::NONE), ScreenAction::Finish(false));
        assert_eq!(
            screen.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            ScreenAction::Abort
        );
    }

    #[test]
    fn scroll_never_goes_negative() {
        let mut screen = PreviewScreen::new(&preview());
        screen.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(screen.scroll, 0);
        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(screen.scroll, 1);
    }
}
