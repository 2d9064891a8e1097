//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions. Keys that need work outside
//! the UI thread (fetching feeds) are reported back as an [`Action`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Work the event loop must hand to the refresh worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Refresh,
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_channel(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.previous_channel(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_expanded(),
        KeyCode::Char('r') if app.begin_refresh() => return Some(Action::Refresh),
        _ => {}
    }
    None
}
