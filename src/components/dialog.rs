use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::AppMode;
use crate::theme::ThemeColors;

/// Modal overlay for the loading, executing and result modes.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    ticks: usize,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, ticks: usize, theme: &'a ThemeColors) -> Self {
        Self { mode, ticks, theme }
    }

    /// Calculate a centered rectangle within the given area.
    fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let w = width.min(area.width);
        let h = height.min(area.height);
        Rect::new(x, y, w, h)
    }

    /// Draw the framed box and return its inner area, or `None` if nothing fits.
    fn frame(
        &self,
        title: &str,
        border_fg: Color,
        width: u16,
        area: Rect,
        buf: &mut Buffer,
    ) -> Option<Rect> {
        let dialog_width = width.min(area.width.saturating_sub(4));
        let rect = Self::centered_rect(dialog_width, 5, area);

        Clear.render(rect, buf);

        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_fg))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));

        let inner = block.inner(rect);
        block.render(rect, buf);

        (inner.height > 0 && inner.width > 0).then_some(inner)
    }
}

/// `base` followed by one to three dots, advancing every few ticks.
pub fn animated(base: &str, ticks: usize) -> String {
    let dots = (ticks / 3) % 3 + 1;
    format!("{base}{}", ".".repeat(dots))
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.mode {
            AppMode::Loading => {
                let Some(inner) =
                    self.frame("repopick", self.theme.dialog_border_fg, 40, area, buf)
                else {
                    return;
                };
                let line = Line::from(Span::styled(
                    animated("Counting tokens", self.ticks),
                    Style::default().fg(self.theme.accent_fg),
                ));
                buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
            }
            AppMode::Executing => {
                let Some(inner) = self.frame("Pack", self.theme.partial_fg, 40, area, buf) else {
                    return;
                };
                let line = Line::from(Span::styled(
                    "Processing...",
                    Style::default()
                        .fg(self.theme.partial_fg)
                        .add_modifier(Modifier::BOLD),
                ));
                buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
            }
            AppMode::Result { message, success } => {
                let (title, color) = if *success {
                    ("Done", self.theme.success_fg)
                } else {
                    ("Error", self.theme.error_fg)
                };
                let width = (message.chars().count() as u16 + 6).max(40);
                let Some(inner) = self.frame(title, color, width, area, buf) else {
                    return;
                };
                let msg_line = Line::from(Span::styled(message.as_str(), Style::default().fg(color)));
                buf.set_line(inner.x, inner.y, &msg_line, inner.width);

                let hint_style = Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM);
                let hint_line = Line::from(Span::styled("Press any key to continue...", hint_style));
                if inner.height > 1 {
                    buf.set_line(inner.x, inner.y + inner.height - 1, &hint_line, inner.width);
                }
            }
            AppMode::Browsing => {}
        }
    }
}
