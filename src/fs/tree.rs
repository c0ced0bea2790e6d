use std::path::{Path, PathBuf};

/// Type of filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    File,
    Directory,
}

/// Children of a directory node.
///
/// `Unloaded` means the directory has not been read yet, which is distinct
/// from `Loaded(vec![])` for a directory that was read and found empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Children {
    #[default]
    Unloaded,
    Loaded(Vec<TreeNode>),
}

impl Children {
    /// Materialized children, or an empty slice when unloaded.
    pub fn as_slice(&self) -> &[TreeNode] {
        match self {
            Children::Loaded(children) => children,
            Children::Unloaded => &[],
        }
    }

    /// Mutable access to materialized children, if any were read.
    pub fn loaded_mut(&mut self) -> Option<&mut Vec<TreeNode>> {
        match self {
            Children::Loaded(children) => Some(children),
            Children::Unloaded => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Children::Loaded(_))
    }
}

/// A node in the file tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub name: String,
    /// Identity of the node: parent path joined with `name`.
    pub path: PathBuf,
    pub node_type: NodeType,
    pub depth: usize,
    pub is_expanded: bool,
    pub children: Children,
    pub selected: bool,
    /// Directories only; never true together with `selected`.
    pub partially_selected: bool,
    /// Own count for files, sum over every descendant file for directories.
    pub token_count: usize,
    pub selected_token_count: usize,
}

impl TreeNode {
    /// Create an unselected file node.
    pub fn file(path: PathBuf, name: String, depth: usize, token_count: usize) -> Self {
        Self {
            name,
            path,
            node_type: NodeType::File,
            depth,
            is_expanded: false,
            children: Children::Unloaded,
            selected: false,
            partially_selected: false,
            token_count,
            selected_token_count: 0,
        }
    }

    /// Create a collapsed, unloaded directory node.
    ///
    /// `token_count` starts at zero; callers refresh it from the token table.
    pub fn directory(path: PathBuf, name: String, depth: usize) -> Self {
        Self {
            name,
            path,
            node_type: NodeType::Directory,
            depth,
            is_expanded: false,
            children: Children::Unloaded,
            selected: false,
            partially_selected: false,
            token_count: 0,
            selected_token_count: 0,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.node_type == NodeType::Directory
    }

    /// True if at least one child is held in memory.
    pub fn has_materialized_children(&self) -> bool {
        !self.children.as_slice().is_empty()
    }

    /// Set `selected` on this node and every materialized descendant.
    pub fn set_selected_recursive(&mut self, selected: bool) {
        self.selected = selected;
        self.partially_selected = false;
        if let Some(children) = self.children.loaded_mut() {
            for child in children.iter_mut() {
                child.set_selected_recursive(selected);
            }
        }
    }
}

/// A row of the flattened view.
#[derive(Debug, Clone, Copy)]
pub struct FlatItem<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
    pub is_last_sibling: bool,
}

/// Pre-order traversal of `roots`, descending only into expanded, loaded directories.
pub fn flatten(roots: &[TreeNode]) -> Vec<FlatItem<'_>> {
    let mut items = Vec::new();
    flatten_into(roots, &mut items);
    items
}

fn flatten_into<'a>(nodes: &'a [TreeNode], items: &mut Vec<FlatItem<'a>>) {
    let last = nodes.len().saturating_sub(1);
    for (i, node) in nodes.iter().enumerate() {
        items.push(FlatItem {
            node,
            depth: node.depth,
            is_last_sibling: i == last,
        });
        if node.is_dir() && node.is_expanded {
            if let Children::Loaded(children) = &node.children {
                flatten_into(children, items);
            }
        }
    }
}

/// Find a node by path, descending only through its ancestors.
pub fn find_node<'a>(nodes: &'a [TreeNode], target: &Path) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.path == target {
            return Some(node);
        }
        if node.is_dir() && target.starts_with(&node.path) {
            return find_node(node.children.as_slice(), target);
        }
    }
    None
}

/// Find a mutable reference to a node by path.
pub fn find_node_mut<'a>(nodes: &'a mut [TreeNode], target: &Path) -> Option<&'a mut TreeNode> {
    for node in nodes.iter_mut() {
        if node.path == target {
            return Some(node);
        }
        if node.is_dir() && target.starts_with(&node.path) {
            return match node.children.loaded_mut() {
                Some(children) => find_node_mut(children, target),
                None => None,
            };
        }
    }
    None
}

/// Visit every node in pre-order, materialized or not visible.
pub fn walk<'a>(nodes: &'a [TreeNode], visit: &mut dyn FnMut(&'a TreeNode)) {
    for node in nodes {
        visit(node);
        walk(node.children.as_slice(), visit);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{dir, file};
    use super::*;

    fn sample() -> Vec<TreeNode> {
        let root = PathBuf::from("/p");
        let src = root.join("src");
        let mut src_node = dir(
            &root,
            "src",
            0,
            Some(vec![file(&src, "lib.rs", 1, 10), file(&src, "main.rs", 1, 5)]),
        );
        src_node.is_expanded = true;
        vec![
            src_node,
            dir(&root, "docs", 0, None),
            file(&root, "README.md", 0, 3),
        ]
    }

    #[test]
    fn unloaded_differs_from_empty() {
        assert_ne!(Children::Unloaded, Children::Loaded(Vec::new()));
        assert!(!Children::Unloaded.is_loaded());
        assert!(Children::Loaded(Vec::new()).is_loaded());
        assert!(Children::Unloaded.as_slice().is_empty());
    }

    #[test]
    fn directory_starts_collapsed_and_unloaded() {
        let node = TreeNode::directory(PathBuf::from("/p/lib"), "lib".into(), 0);
        assert!(node.is_dir());
        assert!(!node.is_expanded);
        assert_eq!(node.children, Children::Unloaded);
        assert_eq!(node.token_count, 0);
    }

    #[test]
    fn flatten_descends_into_expanded_dirs_only() {
        let roots = sample();
        let names: Vec<&str> = flatten(&roots).iter().map(|i| i.node.name.as_str()).collect();
        assert_eq!(names, vec!["src", "lib.rs", "main.rs", "docs", "README.md"]);
    }

    #[test]
    fn flatten_skips_collapsed_but_loaded_dirs() {
        let mut roots = sample();
        roots[0].is_expanded = false;
        let names: Vec<&str> = flatten(&roots).iter().map(|i| i.node.name.as_str()).collect();
        assert_eq!(names, vec!["src", "docs", "README.md"]);
    }

    #[test]
    fn flatten_skips_expanded_but_unloaded_dirs() {
        let mut roots = sample();
        roots[1].is_expanded = true;
        assert_eq!(flatten(&roots).len(), 5);
    }

    #[test]
    fn flatten_marks_depth_and_last_sibling() {
        let roots = sample();
        let items = flatten(&roots);
        assert_eq!(items[1].depth, 1);
        assert!(!items[1].is_last_sibling);
        assert!(items[2].is_last_sibling);
        assert!(items[4].is_last_sibling);
    }

    #[test]
    fn flatten_is_stable() {
        let roots = sample();
        let first: Vec<PathBuf> = flatten(&roots).iter().map(|i| i.node.path.clone()).collect();
        let second: Vec<PathBuf> = flatten(&roots).iter().map(|i| i.node.path.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn find_node_locates_nested() {
        let roots = sample();
        let found = find_node(&roots, Path::new("/p/src/main.rs")).unwrap();
        assert_eq!(found.name, "main.rs");
        assert!(find_node(&roots, Path::new("/p/docs/guide.md")).is_none());
    }

    #[test]
    fn find_node_mut_allows_edit() {
        let mut roots = sample();
        find_node_mut(&mut roots, Path::new("/p/src/lib.rs")).unwrap().selected = true;
        assert!(roots[0].children.as_slice()[0].selected);
    }

    #[test]
    fn set_selected_recursive_cascades_to_loaded_children() {
        let mut roots = sample();
        roots[0].partially_selected = true;
        roots[0].set_selected_recursive(true);
        assert!(roots[0].selected);
        assert!(!roots[0].partially_selected);
        assert!(roots[0].children.as_slice().iter().all(|c| c.selected));
    }

    #[test]
    fn walk_visits_hidden_nodes() {
        let mut roots = sample();
        roots[0].is_expanded = false;
        let mut count = 0;
        walk(&roots, &mut |_| count += 1);
        assert_eq!(count, 5);
    }
}
