//! Terminal lifecycle, event loop, and the checkbox [`Prompter`].

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::debug;

use clinerules_core::assembler::Preview;
use clinerules_core::selector::{ChoiceSet, Prompter};
use clinerules_shared::{ClineRulesError, FragmentRef, Result};

use crate::screens::ScreenAction;
use crate::screens::picker::PickerScreen;
use crate::screens::preview::PreviewScreen;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Full-screen checkbox selector with a preview/confirm screen.
///
/// Each suspension point takes over the terminal on a blocking thread and
/// gives it back before returning.
#[derive(Debug, Default)]
pub(crate) struct CheckboxPrompter {
    /// Set when the operator quit the picker instead of submitting.
    pub aborted: bool,
}

impl Prompter for CheckboxPrompter {
    async fn present(&mut self, choices: &ChoiceSet) -> Result<Vec<FragmentRef>> {
        let choices = choices.clone();
        let action = tokio::task::spawn_blocking(move || run_picker(choices))
            .await
            .map_err(|e| ClineRulesError::prompt(format!("selector task failed: {e}")))?
            .map_err(|e| ClineRulesError::prompt(format!("terminal error: {e}")))?;

        match action {
            ScreenAction::Finish(refs) => {
                debug!(picked = refs.len(), "checkbox selection");
                Ok(refs)
            }
            ScreenAction::Abort | ScreenAction::Continue => {
                self.aborted = true;
                Ok(Vec::new())
            }
        }
    }

    async fn confirm(&mut self, preview: &Preview) -> Result<bool> {
        let screen = PreviewScreen::new(preview);
        let action = tokio::task::spawn_blocking(move || run_preview(screen))
            .await
            .map_err(|e| ClineRulesError::prompt(format!("preview task failed: {e}")))?
            .map_err(|e| ClineRulesError::prompt(format!("terminal error: {e}")))?;

        match action {
            ScreenAction::Finish(answer) => Ok(answer),
            ScreenAction::Abort | ScreenAction::Continue => {
                self.aborted = true;
                Ok(false)
            }
        }
    }
}

fn run_picker(choices: ChoiceSet) -> io::Result<ScreenAction<Vec<FragmentRef>>> {
    let mut screen = PickerScreen::new(choices);
    with_terminal(|terminal| {
        loop {
            terminal.draw(|f| {
                let area = f.area();
                screen.draw(f, area);
            })?;
            if let Some((code, modifiers)) = next_key()? {
                match screen.handle_key(code, modifiers) {
                    ScreenAction::Continue => {}
                    done => return Ok(done),
                }
            }
        }
    })
}

fn run_preview(mut screen: PreviewScreen) -> io::Result<ScreenAction<bool>> {
    with_terminal(|terminal| {
        loop {
            terminal.draw(|f| {
                let area = f.area();
                screen.draw(f, area);
            })?;
            if let Some((code, modifiers)) = next_key()? {
                match screen.handle_key(code, modifiers) {
                    ScreenAction::Continue => {}
                    done => return Ok(done),
                }
            }
        }
    })
}

/// Poll for a key press with a 100ms timeout for a responsive redraw.
fn next_key() -> io::Result<Option<(event::KeyCode, event::KeyModifiers)>> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some((key.code, key.modifiers)));
            }
        }
    }
    Ok(None)
}

/// Set up the terminal, run `body`, and restore the terminal even when
/// `body` fails.
fn with_terminal<T>(body: impl FnOnce(&mut Tui) -> io::Result<T>) -> io::Result<T> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    let result = Terminal::new(CrosstermBackend::new(stdout)).and_then(|mut terminal| {
        let outcome = body(&mut terminal);
        terminal.show_cursor()?;
        outcome
    });

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    result
}
