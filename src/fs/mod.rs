pub mod filter;
pub mod reader;
pub mod tree;

use std::path::Path;

/// Render `path` relative to `root` with forward slashes.
///
/// Paths outside `root` are returned unchanged apart from separator
/// normalization.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}
