//! Expand/collapse and tri-state selection over the tree.
//!
//! Every operation mutates the tree in place through an exclusive borrow and
//! leaves it consistent before returning; token aggregates are refreshed at
//! the end of each mutation.

use std::path::Path;

use super::tokens::{refresh_selected_token_counts, refresh_token_counts, total_selected_tokens};
use crate::fs::reader::DirectoryReader;
use crate::fs::relative_path;
use crate::fs::tree::{find_node_mut, flatten, walk, Children, TreeNode};
use crate::tokens::TokenTable;

/// Aggregates reported after a selection change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub selected_count: usize,
    pub total_selected_tokens: usize,
}

impl SelectionSummary {
    pub fn of(nodes: &[TreeNode], table: &TokenTable) -> Self {
        Self {
            selected_count: selected_count(nodes),
            total_selected_tokens: total_selected_tokens(nodes, table),
        }
    }
}

/// Expand the directory at `path`, reading its children on first expansion.
///
/// Children read under a selected directory start selected. Children that
/// were read before are reused as they are, keeping their selection.
/// Returns false when nothing changed.
pub fn expand(
    nodes: &mut [TreeNode],
    path: &Path,
    reader: &DirectoryReader,
    table: &TokenTable,
) -> bool {
    let Some(node) = find_node_mut(nodes, path) else {
        return false;
    };
    if !node.is_dir() || node.is_expanded {
        return false;
    }

    if !node.children.is_loaded() {
        let mut children = reader.list(&node.path, node.depth + 1, table);
        if node.selected {
            for child in children.iter_mut() {
                child.set_selected_recursive(true);
            }
        }
        node.children = Children::Loaded(children);
    }
    node.is_expanded = true;

    refresh_token_counts(nodes, table);
    refresh_selected_token_counts(nodes, table);
    true
}

/// Collapse the directory at `path`. Loaded children stay in memory.
pub fn collapse(nodes: &mut [TreeNode], path: &Path) -> bool {
    match find_node_mut(nodes, path) {
        Some(node) if node.is_dir() && node.is_expanded => {
            node.is_expanded = false;
            true
        }
        _ => false,
    }
}

/// Flip the selection of the node at `path` and every loaded descendant,
/// then re-derive the tri-state of each ancestor.
pub fn toggle_one(nodes: &mut [TreeNode], path: &Path, table: &TokenTable) -> SelectionSummary {
    if toggle_in(nodes, path) {
        refresh_selected_token_counts(nodes, table);
    }
    SelectionSummary::of(nodes, table)
}

fn toggle_in(nodes: &mut [TreeNode], target: &Path) -> bool {
    for node in nodes.iter_mut() {
        if node.path == target {
            let selected = !node.selected;
            node.set_selected_recursive(selected);
            return true;
        }
        if node.is_dir() && target.starts_with(&node.path) {
            let found = match node.children.loaded_mut() {
                Some(children) => toggle_in(children, target),
                None => false,
            };
            if found {
                derive_tri_state(node);
            }
            return found;
        }
    }
    false
}

/// Recompute `selected`/`partially_selected` of a directory from its loaded children.
///
/// A directory without loaded children keeps its own `selected` flag.
fn derive_tri_state(node: &mut TreeNode) {
    let children = node.children.as_slice();
    if children.is_empty() {
        node.partially_selected = false;
        return;
    }
    let all = children.iter().all(|c| c.selected);
    let any = children.iter().any(|c| c.selected || c.partially_selected);
    node.selected = all;
    node.partially_selected = !all && any;
}

/// Select everything unless every visible row is already selected, in which
/// case clear everything. Applies to loaded but hidden nodes too.
pub fn toggle_all(nodes: &mut [TreeNode], table: &TokenTable) -> SelectionSummary {
    let target = !flatten(nodes).iter().all(|item| item.node.selected);
    for node in nodes.iter_mut() {
        node.set_selected_recursive(target);
    }
    refresh_selected_token_counts(nodes, table);
    SelectionSummary::of(nodes, table)
}

/// Number of selected leaves: files, plus directories whose children are not loaded.
pub fn selected_count(nodes: &[TreeNode]) -> usize {
    let mut count = 0;
    walk(nodes, &mut |node| {
        if node.selected && (!node.is_dir() || !node.has_materialized_children()) {
            count += 1;
        }
    });
    count
}

/// Every selected node in pre-order, as forward-slash paths relative to `root`.
pub fn selected_paths(nodes: &[TreeNode], root: &Path) -> Vec<String> {
    let mut paths = Vec::new();
    walk(nodes, &mut |node| {
        if node.selected {
            paths.push(relative_path(root, &node.path));
        }
    });
    paths
}
