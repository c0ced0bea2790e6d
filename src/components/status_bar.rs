use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::tree::format_tokens;
use crate::theme::ThemeColors;

/// Status bar: selection summary on the left, working directory on the right.
pub struct StatusBarWidget<'a> {
    selected_count: usize,
    selected_tokens: usize,
    available_tokens: usize,
    position: Option<(usize, usize)>,
    cwd: &'a str,
    theme: &'a ThemeColors,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(
        selected_count: usize,
        selected_tokens: usize,
        available_tokens: usize,
        cwd: &'a str,
        theme: &'a ThemeColors,
    ) -> Self {
        Self {
            selected_count,
            selected_tokens,
            available_tokens,
            position: None,
            cwd,
            theme,
        }
    }

    /// Cursor row (zero-based) and row count, shown as `row/len`.
    pub fn position(mut self, cursor: usize, len: usize) -> Self {
        if len > 0 {
            self.position = Some((cursor + 1, len));
        }
        self
    }

    fn summary(&self) -> String {
        let tokens = |n: usize| match format_tokens(n) {
            s if s.is_empty() => "0".to_string(),
            s => s,
        };
        let mut summary = format!(
            " {} selected • {}/{} tokens",
            self.selected_count,
            tokens(self.selected_tokens),
            tokens(self.available_tokens)
        );
        if let Some((row, len)) = self.position {
            summary.push_str(&format!(" • {row}/{len}"));
        }
        summary
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        let summary = self.summary();
        let summary_len = summary.chars().count();

        // The directory gets what the summary leaves, truncated from the left.
        let budget = width.saturating_sub(summary_len).saturating_sub(2);
        let cwd_len = self.cwd.chars().count();
        let cwd_display = if cwd_len <= budget {
            self.cwd.to_string()
        } else if budget > 3 {
            let tail: String = self.cwd.chars().skip(cwd_len - (budget - 3)).collect();
            format!("...{tail}")
        } else {
            String::new()
        };
        let gap = width
            .saturating_sub(summary_len)
            .saturating_sub(cwd_display.chars().count())
            .saturating_sub(1);

        let bar = Style::default().bg(self.theme.status_bg);
        let summary_style = bar
            .fg(if self.selected_count > 0 {
                self.theme.accent_fg
            } else {
                self.theme.status_fg
            })
            .add_modifier(Modifier::BOLD);
        let cwd_style = bar.fg(self.theme.dim_fg);

        buf.set_style(area, bar);
        let line = Line::from(vec![
            Span::styled(summary, summary_style),
            Span::styled(" ".repeat(gap), bar),
            Span::styled(cwd_display, cwd_style),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
