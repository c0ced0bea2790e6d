use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::dialog::DialogWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;

const KEY_HINTS: &str =
    " ↑/↓ move • → expand • ← collapse/parent • Space select • a toggle all • Enter execute • q quit";

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    let (hint_area, tree_area, status_area) = (chunks[0], chunks[1], chunks[2]);

    let hints = Paragraph::new(Line::from(Span::styled(
        KEY_HINTS,
        Style::default()
            .fg(app.theme.dim_fg)
            .add_modifier(Modifier::DIM),
    )));
    frame.render_widget(hints, hint_area);

    // Update scroll offset to keep selected item visible
    let visible_height = tree_area.height.saturating_sub(2) as usize; // account for border
    app.tree_top = tree_area.y + 1;
    app.update_scroll(visible_height);

    let root_name = app
        .root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| app.root().display().to_string());
    let block = Block::default()
        .title(format!(" {root_name} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_fg));

    let cwd = app.root().display().to_string();
    match &app.session {
        Some(session) => {
            let tree_widget =
                TreeWidget::new(session, app.scroll_offset, &app.theme, app.use_icons).block(block);
            frame.render_widget(tree_widget, tree_area);

            let status = StatusBarWidget::new(
                session.selected_count(),
                session.total_selected_tokens(),
                session.available_tokens(),
                &cwd,
                &app.theme,
            )
            .position(session.cursor(), session.len());
            frame.render_widget(status, status_area);
        }
        None => {
            frame.render_widget(block, tree_area);
            frame.render_widget(StatusBarWidget::new(0, 0, 0, &cwd, &app.theme), status_area);
        }
    }

    if app.mode != AppMode::Browsing {
        frame.render_widget(DialogWidget::new(&app.mode, app.ticks, &app.theme), area);
    }
}
