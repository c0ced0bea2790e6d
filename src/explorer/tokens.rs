//! Token aggregation over the tree.
//!
//! Directory totals always come from the token table so they are correct
//! before a directory is ever expanded. Selected totals use loaded children
//! when there are any and fall back to the table otherwise.

use crate::fs::tree::{Children, FlatItem, TreeNode};
use crate::tokens::TokenTable;

/// Recompute `token_count` for every node held in memory.
pub fn refresh_token_counts(nodes: &mut [TreeNode], table: &TokenTable) {
    for node in nodes.iter_mut() {
        if node.is_dir() {
            node.token_count = table.directory_tokens(&node.path);
            if let Some(children) = node.children.loaded_mut() {
                refresh_token_counts(children, table);
            }
        } else {
            node.token_count = table.file_tokens(&node.path);
        }
    }
}

/// Recompute `selected_token_count` bottom-up for every node held in memory.
pub fn refresh_selected_token_counts(nodes: &mut [TreeNode], table: &TokenTable) {
    for node in nodes.iter_mut() {
        update_selected_tokens(node, table);
    }
}

fn update_selected_tokens(node: &mut TreeNode, table: &TokenTable) -> usize {
    let selected_tokens = if !node.is_dir() {
        if node.selected {
            node.token_count
        } else {
            0
        }
    } else {
        match &mut node.children {
            Children::Loaded(children) if !children.is_empty() => children
                .iter_mut()
                .map(|child| update_selected_tokens(child, table))
                .sum(),
            _ if node.selected => table.directory_tokens(&node.path),
            _ => 0,
        }
    };
    node.selected_token_count = selected_tokens;
    selected_tokens
}

/// Total tokens of the current selection across the whole tree.
///
/// Selected files count individually; a selected directory without loaded
/// children counts its table total instead, so nothing is counted twice.
pub fn total_selected_tokens(nodes: &[TreeNode], table: &TokenTable) -> usize {
    let mut total = 0;
    for node in nodes {
        if node.selected {
            if !node.is_dir() {
                total += node.token_count;
            } else if !node.has_materialized_children() {
                total += table.directory_tokens(&node.path);
            }
        }
        total += total_selected_tokens(node.children.as_slice(), table);
    }
    total
}

/// Tokens available in the visible rows, not counting expanded directories twice.
pub fn available_tokens(items: &[FlatItem<'_>]) -> usize {
    items
        .iter()
        .filter(|item| !(item.node.is_dir() && item.node.is_expanded))
        .map(|item| item.node.token_count)
        .sum()
}
