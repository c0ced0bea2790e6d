use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::filter::PathFilter;
use super::relative_path;
use super::tree::TreeNode;
use crate::tokens::TokenTable;

/// Lists the immediate children of a directory as unloaded tree nodes.
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    root: PathBuf,
    filter: PathFilter,
}

impl DirectoryReader {
    /// `root` anchors the relative paths handed to `filter`.
    pub fn new(root: PathBuf, filter: PathFilter) -> Self {
        Self { root, filter }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read `dir` and return its non-ignored entries at `depth`.
    ///
    /// Directories come first, then files; names compare case-insensitively.
    /// File token counts are looked up in `table`; directory counts are left
    /// at zero for the caller to refresh. A directory that cannot be read
    /// yields no children. Symlinks are not followed: a link to a directory
    /// is listed as a file row and is never expanded.
    pub fn list(&self, dir: &Path, depth: usize, table: &TokenTable) -> Vec<TreeNode> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("DirectoryReader: cannot list {dir:?}: {e}");
                return Vec::new();
            }
        };

        let mut nodes = Vec::new();
        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            let path = entry.path();
            if self.filter.should_ignore(&relative_path(&self.root, &path)) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
            let node = if is_dir {
                TreeNode::directory(path, name, depth)
            } else {
                let tokens = table.file_tokens(&path);
                TreeNode::file(path, name, depth, tokens)
            };
            nodes.push(node);
        }

        nodes.sort_by(compare_nodes);
        nodes
    }
}

fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| compare_names(&a.name, &b.name))
}

/// Case-insensitive order; on a case-only tie lowercase sorts first, as locale collation does.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
