use std::path::{Path, PathBuf};

use log::debug;

use super::selection::{self, SelectionSummary};
use super::tokens::{available_tokens, refresh_selected_token_counts, refresh_token_counts};
use crate::fs::reader::DirectoryReader;
use crate::fs::tree::{find_node, flatten, FlatItem, TreeNode};
use crate::tokens::TokenTable;

/// The tree, the cursor over its flattened rows and the selection aggregates.
///
/// This is the single mutation entry point used by the UI. Every mutation
/// leaves the tree and the aggregates consistent before it returns.
#[derive(Debug)]
pub struct ExplorerSession {
    roots: Vec<TreeNode>,
    cursor: usize,
    summary: SelectionSummary,
    table: TokenTable,
    reader: DirectoryReader,
}

impl ExplorerSession {
    /// Read the root level and seed token counts from `table`.
    pub fn new(reader: DirectoryReader, table: TokenTable) -> Self {
        let mut roots = reader.list(reader.root(), 0, &table);
        refresh_token_counts(&mut roots, &table);
        refresh_selected_token_counts(&mut roots, &table);
        debug!(
            "Session opened at {:?} with {} entries",
            reader.root(),
            roots.len()
        );
        Self {
            roots,
            cursor: 0,
            summary: SelectionSummary::default(),
            table,
            reader,
        }
    }

    pub fn root(&self) -> &Path {
        self.reader.root()
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_count(&self) -> usize {
        self.summary.selected_count
    }

    pub fn total_selected_tokens(&self) -> usize {
        self.summary.total_selected_tokens
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Visible rows, in display order.
    pub fn flatten(&self) -> Vec<FlatItem<'_>> {
        flatten(&self.roots)
    }

    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    /// The node under the cursor.
    pub fn current(&self) -> Option<&TreeNode> {
        self.flatten().get(self.cursor).map(|item| item.node)
    }

    pub fn find(&self, path: &Path) -> Option<&TreeNode> {
        find_node(&self.roots, path)
    }

    /// Tokens across the visible rows.
    pub fn available_tokens(&self) -> usize {
        available_tokens(&self.flatten())
    }

    /// Selected paths relative to the root, for the packer.
    pub fn selected_paths(&self) -> Vec<String> {
        selection::selected_paths(&self.roots, self.root())
    }

    pub fn expand(&mut self, path: &Path) -> bool {
        let changed = selection::expand(&mut self.roots, path, &self.reader, &self.table);
        if changed {
            self.recompute();
        }
        changed
    }

    pub fn collapse(&mut self, path: &Path) -> bool {
        let changed = selection::collapse(&mut self.roots, path);
        if changed {
            self.recompute();
        }
        changed
    }

    pub fn toggle_selection(&mut self, path: &Path) {
        self.summary = selection::toggle_one(&mut self.roots, path, &self.table);
    }

    pub fn toggle_all(&mut self) {
        self.summary = selection::toggle_all(&mut self.roots, &self.table);
    }

    /// Move the cursor by `delta` rows, stopping at either end.
    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor.saturating_add_signed(delta);
        self.cursor = target.min(len - 1);
    }

    pub fn move_up(&mut self) {
        self.move_cursor(-1);
    }

    pub fn move_down(&mut self) {
        self.move_cursor(1);
    }

    pub fn move_first(&mut self) {
        self.cursor = 0;
    }

    pub fn move_last(&mut self) {
        self.cursor = self.len().saturating_sub(1);
    }

    /// Place the cursor on `index`, clamped to the visible rows.
    pub fn navigate_to(&mut self, index: usize) {
        self.cursor = index.min(self.len().saturating_sub(1));
    }

    /// Move the cursor to the nearest row above it with a smaller depth.
    pub fn navigate_to_parent(&mut self) -> bool {
        let items = self.flatten();
        let Some(current) = items.get(self.cursor) else {
            return false;
        };
        let depth = current.depth;
        if depth == 0 {
            return false;
        }
        let parent = items[..self.cursor]
            .iter()
            .rposition(|item| item.depth < depth);
        match parent {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    /// Expand the current directory if collapsed, otherwise move down.
    pub fn expand_or_next(&mut self) {
        match self.current_dir_state() {
            Some((path, false)) => {
                self.expand(&path);
            }
            _ => self.move_down(),
        }
    }

    /// Collapse the current directory if expanded, otherwise go to its parent.
    pub fn collapse_or_parent(&mut self) {
        match self.current_dir_state() {
            Some((path, true)) => {
                self.collapse(&path);
            }
            _ => {
                self.navigate_to_parent();
            }
        }
    }

    /// Toggle the node under the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(path) = self.current().map(|node| node.path.clone()) {
            self.toggle_selection(&path);
        }
    }

    fn current_dir_state(&self) -> Option<(PathBuf, bool)> {
        self.current()
            .filter(|node| node.is_dir())
            .map(|node| (node.path.clone(), node.is_expanded))
    }

    fn recompute(&mut self) {
        self.summary = SelectionSummary::of(&self.roots, &self.table);
        let len = self.len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::filter::PathFilter;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn session(dir: &TempDir, entries: &[(&str, usize)]) -> ExplorerSession {
        let map: HashMap<String, usize> =
            entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let table = TokenTable::new(dir.path(), map);
        let reader = DirectoryReader::new(dir.path().to_path_buf(), PathFilter::allow_all());
        ExplorerSession::new(reader, table)
    }

    fn touch(dir: &TempDir, rel: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn selecting_single_file_counts_its_tokens() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.txt");
        touch(&dir, "b.txt");
        let mut s = session(&dir, &[("a.txt", 100), ("b.txt", 50)]);

        s.toggle_selection(&dir.path().join("a.txt"));
        assert_eq!(s.selected_count(), 1);
        assert_eq!(s.total_selected_tokens(), 100);
        assert_eq!(s.selected_paths(), vec!["a.txt"]);
    }

    #[test]
    fn unexpanded_directory_selection_uses_table_totals() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "lib/x.ts");
        touch(&dir, "lib/y.ts");
        let mut s = session(&dir, &[("lib/x.ts", 30), ("lib/y.ts", 70)]);
        let lib = dir.path().join("lib");

        assert_eq!(s.find(&lib).unwrap().token_count, 100);
        s.toggle_selection(&lib);
        let node = s.find(&lib).unwrap();
        assert!(!node.children.is_loaded());
        assert_eq!(node.selected_token_count, 100);
        assert_eq!(s.total_selected_tokens(), 100);
    }

    #[test]
    fn expanding_selected_directory_does_not_double_count() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "lib/x.ts");
        touch(&dir, "lib/y.ts");
        let mut s = session(&dir, &[("lib/x.ts", 30), ("lib/y.ts", 70)]);
        let lib = dir.path().join("lib");
        s.toggle_selection(&lib);

        assert!(s.expand(&lib));
        assert!(s.find(&lib.join("x.ts")).unwrap().selected);
        assert!(s.find(&lib.join("y.ts")).unwrap().selected);
        assert_eq!(s.total_selected_tokens(), 100);
        assert_eq!(s.find(&lib).unwrap().selected_token_count, 100);
        assert_eq!(s.selected_count(), 2);
    }

    #[test]
    fn ignored_files_never_reach_directory_totals() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/a.rs");
        touch(&dir, "src/b.snap");
        let filter = PathFilter::new(|p| p.ends_with(".snap"));
        let map: HashMap<String, usize> =
            [("src/a.rs".to_string(), 40), ("src/b.snap".to_string(), 500)]
                .into_iter()
                .collect();
        let table = TokenTable::filtered(dir.path(), map, &filter);
        let reader = DirectoryReader::new(dir.path().to_path_buf(), filter);
        let mut s = ExplorerSession::new(reader, table);
        let src = dir.path().join("src");

        s.toggle_selection(&src);
        assert_eq!(s.total_selected_tokens(), 40);
        assert!(s.expand(&src));
        assert_eq!(s.total_selected_tokens(), 40);

        let node = s.find(&src).unwrap();
        let children_sum: usize = node.children.as_slice().iter().map(|c| c.token_count).sum();
        assert_eq!(node.children.as_slice().len(), 1);
        assert_eq!(node.token_count, children_sum);
    }

    #[test]
    fn backslash_keys_count_the_same_before_and_after_expand() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "lib/x.ts");
        touch(&dir, "lib/y.ts");
        let mut s = session(&dir, &[("lib\\x.ts", 30), ("lib/y.ts", 70)]);
        let lib = dir.path().join("lib");

        s.toggle_selection(&lib);
        assert_eq!(s.total_selected_tokens(), 100);
        assert!(s.expand(&lib));
        assert_eq!(s.total_selected_tokens(), 100);

        let node = s.find(&lib).unwrap();
        let children_sum: usize = node.children.as_slice().iter().map(|c| c.token_count).sum();
        assert_eq!(children_sum, 100);
        assert_eq!(node.token_count, children_sum);
    }

    #[test]
    fn partially_selected_folder_reports_partial_tokens() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/a.rs");
        touch(&dir, "src/b.rs");
        let mut s = session(&dir, &[("src/a.rs", 40), ("src/b.rs", 60)]);
        let src = dir.path().join("src");
        s.expand(&src);
        s.toggle_selection(&src.join("a.rs"));

        let node = s.find(&src).unwrap();
        assert!(node.partially_selected);
        assert!(!node.selected);
        assert_eq!(node.selected_token_count, 40);
        assert_eq!(node.token_count, 100);
    }

    #[test]
    fn empty_directory_can_be_selected_directly() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let mut s = session(&dir, &[]);
        let empty = dir.path().join("empty");
        s.expand(&empty);
        s.toggle_selection(&empty);

        let node = s.find(&empty).unwrap();
        assert!(node.children.is_loaded());
        assert!(node.selected);
        assert!(!node.partially_selected);
        assert_eq!(node.selected_token_count, 0);
        assert_eq!(s.selected_paths(), vec!["empty"]);
    }

    #[test]
    fn cursor_clamps_without_wrapping() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.txt");
        touch(&dir, "b.txt");
        touch(&dir, "c.txt");
        let mut s = session(&dir, &[]);

        s.move_up();
        assert_eq!(s.cursor(), 0);
        s.move_cursor(10);
        assert_eq!(s.cursor(), 2);
        s.move_down();
        assert_eq!(s.cursor(), 2);
        s.move_first();
        assert_eq!(s.cursor(), 0);
        s.move_last();
        assert_eq!(s.cursor(), 2);
        s.navigate_to(99);
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn empty_root_has_no_rows() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, &[]);
        assert!(s.is_empty());
        assert!(s.current().is_none());
        s.move_down();
        s.toggle_current();
        s.toggle_all();
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.selected_count(), 0);
    }

    #[test]
    fn collapse_clamps_cursor_into_range() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "lib/x.ts");
        touch(&dir, "lib/y.ts");
        let mut s = session(&dir, &[]);
        let lib = dir.path().join("lib");
        s.expand(&lib);
        s.move_last();
        assert_eq!(s.cursor(), 2);

        s.collapse(&lib);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn arrow_navigation_expands_collapses_and_climbs() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "lib/x.ts");
        touch(&dir, "readme.md");
        let mut s = session(&dir, &[]);

        s.expand_or_next();
        assert_eq!(s.len(), 3);
        assert_eq!(s.cursor(), 0);
        s.expand_or_next();
        assert_eq!(s.current().unwrap().name, "x.ts");

        s.collapse_or_parent();
        assert_eq!(s.current().unwrap().name, "lib");
        s.collapse_or_parent();
        assert_eq!(s.len(), 2);
        s.collapse_or_parent();
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn toggle_current_selects_row_under_cursor() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.txt");
        touch(&dir, "b.txt");
        let mut s = session(&dir, &[("b.txt", 7)]);
        s.move_down();
        s.toggle_current();
        assert_eq!(s.selected_paths(), vec!["b.txt"]);
        assert_eq!(s.total_selected_tokens(), 7);
    }

    #[test]
    fn toggle_all_twice_clears_everything() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "lib/x.ts");
        touch(&dir, "a.txt");
        let mut s = session(&dir, &[("lib/x.ts", 3), ("a.txt", 4)]);

        s.toggle_all();
        assert_eq!(s.total_selected_tokens(), 7);
        assert_eq!(s.selected_paths(), vec!["lib", "a.txt"]);
        s.toggle_all();
        assert_eq!(s.total_selected_tokens(), 0);
        assert!(s.selected_paths().is_empty());
    }

    #[test]
    fn available_tokens_count_visible_rows_once() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "lib/x.ts");
        touch(&dir, "a.txt");
        let mut s = session(&dir, &[("lib/x.ts", 3), ("a.txt", 4)]);
        assert_eq!(s.available_tokens(), 7);
        s.expand(&dir.path().join("lib"));
        assert_eq!(s.available_tokens(), 7);
    }
}
