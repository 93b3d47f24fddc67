//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom key-hint bar.
pub(crate) fn status_bar(hint: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {hint}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}
