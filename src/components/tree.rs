use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::explorer::ExplorerSession;
use crate::fs::tree::{FlatItem, TreeNode};
use crate::theme::ThemeColors;

/// Compact token count: blank for zero, `950`, `1.2k`, `3.4m`.
pub fn format_tokens(count: usize) -> String {
    match count {
        0 => String::new(),
        1..=999 => count.to_string(),
        1_000..=999_999 => format!("{:.1}k", count as f64 / 1_000.0),
        _ => format!("{:.1}m", count as f64 / 1_000_000.0),
    }
}

/// Token label for a row: `selected/total` for partial directories, the
/// selected amount for selected directories, the total otherwise.
pub fn token_label(node: &TreeNode) -> String {
    if node.is_dir() && node.partially_selected {
        format!(
            "{}/{}",
            format_tokens(node.selected_token_count),
            format_tokens(node.token_count)
        )
    } else if node.is_dir() && node.selected {
        format_tokens(node.selected_token_count)
    } else {
        format_tokens(node.token_count)
    }
}

/// Tree widget that renders checkbox rows with box-drawing indentation.
pub struct TreeWidget<'a> {
    session: &'a ExplorerSession,
    scroll_offset: usize,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(
        session: &'a ExplorerSession,
        scroll_offset: usize,
        theme: &'a ThemeColors,
        use_icons: bool,
    ) -> Self {
        Self {
            session,
            scroll_offset,
            theme,
            use_icons,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    /// Build the indentation prefix, drawing continuation lines for ancestors
    /// that still have siblings below.
    fn build_prefix(&self, item: &FlatItem, items: &[FlatItem], item_index: usize) -> String {
        if item.depth == 0 {
            return String::new();
        }
        let (pipe, blank, tee, elbow) = if self.use_icons {
            ("│  ", "   ", "├─ ", "└─ ")
        } else {
            ("|  ", "   ", "|- ", "`- ")
        };

        let mut prefix = String::new();
        for d in 1..item.depth {
            // The nearest row above at depth d is this item's ancestor.
            let ancestor_is_last = items[..item_index]
                .iter()
                .rev()
                .take_while(|row| row.depth >= d)
                .find(|row| row.depth == d)
                .is_some_and(|row| row.is_last_sibling);
            prefix.push_str(if ancestor_is_last { blank } else { pipe });
        }
        prefix.push_str(if item.is_last_sibling { elbow } else { tee });
        prefix
    }

    fn checkbox(&self, node: &TreeNode) -> (&'static str, Style) {
        if node.selected {
            let mark = if self.use_icons { "[✓]" } else { "[x]" };
            (mark, Style::default().fg(self.theme.checked_fg))
        } else if node.partially_selected {
            let mark = if self.use_icons { "[◐]" } else { "[~]" };
            (mark, Style::default().fg(self.theme.partial_fg))
        } else {
            ("[ ]", Style::default().fg(self.theme.dim_fg))
        }
    }

    fn icon(&self, node: &TreeNode) -> &'static str {
        match (node.is_dir(), node.is_expanded, self.use_icons) {
            (true, true, true) => "▾",
            (true, false, true) => "▸",
            (false, _, true) => "·",
            (true, true, false) => "-",
            (true, false, false) => "+",
            (false, _, false) => " ",
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let items = self.session.flatten();
        let cursor = self.session.cursor();
        let visible_height = inner_area.height as usize;

        if items.is_empty() || visible_height == 0 {
            return;
        }

        let visible_items = items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible_height);

        for (i, (idx, item)) in visible_items.enumerate() {
            let y = inner_area.y + i as u16;
            let node = item.node;
            let is_cursor = idx == cursor;

            let base = if is_cursor {
                Style::default()
                    .bg(self.theme.cursor_bg)
                    .fg(self.theme.cursor_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let name_style = if node.is_dir() {
                base.fg(self.theme.dir_fg).add_modifier(Modifier::BOLD)
            } else if is_cursor {
                base
            } else {
                base.fg(self.theme.tree_fg)
            };
            let token_style = if node.selected || node.partially_selected {
                base.fg(self.theme.accent_fg)
            } else {
                base.fg(self.theme.token_fg)
            };

            let (checkbox, checkbox_style) = self.checkbox(node);
            let marker = match (is_cursor, self.use_icons) {
                (true, true) => "▍ ",
                (true, false) => "> ",
                _ => "  ",
            };

            let mut spans = vec![
                Span::styled(marker, base.fg(self.theme.accent_fg)),
                Span::styled(checkbox, base.patch(checkbox_style)),
                Span::styled(" ", base),
                Span::styled(self.build_prefix(item, &items, idx), base.fg(self.theme.border_fg)),
                Span::styled(format!("{} {}", self.icon(node), node.name), name_style),
            ];
            let label = token_label(node);
            if !label.is_empty() {
                spans.push(Span::styled(format!(" ({label})"), token_style));
            }

            if is_cursor {
                buf.set_style(Rect::new(inner_area.x, y, inner_area.width, 1), base);
            }
            buf.set_line(inner_area.x, y, &Line::from(spans), inner_area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::filter::PathFilter;
    use crate::fs::reader::DirectoryReader;
    use crate::fs::tree::test_support::{dir, file};
    use crate::theme;
    use crate::tokens::TokenTable;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn render_lines(session: &ExplorerSession, use_icons: bool, height: u16) -> Vec<String> {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 60, height);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(session, 0, &tc, use_icons).render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..60)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn session() -> (TempDir, ExplorerSession) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src").join("a.rs"), "").unwrap();
        fs::write(tmp.path().join("src").join("b.rs"), "").unwrap();
        fs::write(tmp.path().join("README.md"), "").unwrap();
        let entries: HashMap<String, usize> = [
            ("src/a.rs".to_string(), 400),
            ("src/b.rs".to_string(), 1_600),
            ("README.md".to_string(), 0),
        ]
        .into_iter()
        .collect();
        let table = TokenTable::new(tmp.path(), entries);
        let reader = DirectoryReader::new(tmp.path().to_path_buf(), PathFilter::allow_all());
        (tmp, ExplorerSession::new(reader, table))
    }

    #[test]
    fn format_tokens_thresholds() {
        assert_eq!(format_tokens(0), "");
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_000), "1.0k");
        assert_eq!(format_tokens(12_345), "12.3k");
        assert_eq!(format_tokens(2_500_000), "2.5m");
    }

    #[test]
    fn token_label_by_selection_state() {
        let root = PathBuf::from("/p");
        let mut d = dir(&root, "src", 0, None);
        d.token_count = 2_000;
        d.selected_token_count = 400;
        assert_eq!(token_label(&d), "2.0k");
        d.partially_selected = true;
        assert_eq!(token_label(&d), "400/2.0k");
        d.partially_selected = false;
        d.selected = true;
        assert_eq!(token_label(&d), "400");

        let mut f = file(&root, "a.rs", 0, 40);
        f.selected = true;
        assert_eq!(token_label(&f), "40");
    }

    #[test]
    fn renders_checkbox_icon_name_and_tokens() {
        let (_tmp, s) = session();
        let lines = render_lines(&s, true, 3);
        assert_eq!(lines[0], "▍ [ ] ▸ src (2.0k)");
        assert_eq!(lines[1], "  [ ] · README.md");
    }

    #[test]
    fn partial_directory_shows_selected_over_total() {
        let (tmp, mut s) = session();
        let src = tmp.path().join("src");
        s.expand(&src);
        s.toggle_selection(&src.join("a.rs"));
        let lines = render_lines(&s, true, 4);
        assert_eq!(lines[0], "▍ [◐] ▾ src (400/2.0k)");
        assert_eq!(lines[1], "  [✓] ├─ · a.rs (400)");
        assert_eq!(lines[2], "  [ ] └─ · b.rs (1.6k)");
    }

    #[test]
    fn ascii_mode_avoids_unicode() {
        let (tmp, mut s) = session();
        let src = tmp.path().join("src");
        s.expand(&src);
        s.toggle_selection(&src);
        let lines = render_lines(&s, false, 4);
        assert_eq!(lines[0], "> [x] - src (2.0k)");
        assert_eq!(lines[2], "  [x] `-   b.rs (1.6k)");
        assert!(lines.iter().all(|l| l.is_ascii()));
    }

    #[test]
    fn zero_height_does_not_panic() {
        let (_tmp, s) = session();
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 10, 0);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&s, 0, &tc, true).render(area, &mut buf);
    }
}
