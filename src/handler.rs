use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{App, AppMode};
use crate::event::Event;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent, tx: &UnboundedSender<Event>) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Result { .. } => app.dismiss(),
        AppMode::Loading | AppMode::Executing => {
            if key.code == KeyCode::Char('q') {
                app.quit();
            }
        }
        AppMode::Browsing => handle_browsing_key(app, key, tx),
    }
}

fn handle_browsing_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<Event>) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Enter => app.execute(tx),
        _ => {
            let Some(session) = app.session.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => session.move_up(),
                KeyCode::Down | KeyCode::Char('j') => session.move_down(),
                KeyCode::Home | KeyCode::Char('g') => session.move_first(),
                KeyCode::End | KeyCode::Char('G') => session.move_last(),
                KeyCode::Right | KeyCode::Char('l') => session.expand_or_next(),
                KeyCode::Left | KeyCode::Char('h') => session.collapse_or_parent(),
                KeyCode::Char(' ') => session.toggle_current(),
                KeyCode::Char('a') => session.toggle_all(),
                _ => {}
            }
        }
    }
}

/// Handle a mouse event: the wheel moves the cursor, a left click picks a row.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode != AppMode::Browsing {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            if let Some(session) = app.session.as_mut() {
                session.move_up();
            }
        }
        MouseEventKind::ScrollDown => {
            if let Some(session) = app.session.as_mut() {
                session.move_down();
            }
        }
        MouseEventKind::Down(crossterm::event::MouseButton::Left) => app.click_row(mouse.row),
        _ => {}
    }
}
