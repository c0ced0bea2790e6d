//! Bundling backends that turn the selection into a single artifact.

pub mod concat;
pub mod repomix;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{AppError, Result};
use crate::fs::filter::PathFilter;
use crate::fs::relative_path;

pub use concat::ConcatPacker;
pub use repomix::RepomixPacker;

/// What a successful pack produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOutcome {
    /// Number of selection entries handed to the backend.
    pub entries: usize,
    /// File written by the backend, when it writes one we know about.
    pub artifact: Option<PathBuf>,
}

impl PackOutcome {
    /// One-line description for the result dialog.
    pub fn describe(&self) -> String {
        match &self.artifact {
            Some(path) => format!("Complete: {} entries → {}", self.entries, path.display()),
            None => format!("Complete: {} entries", self.entries),
        }
    }
}

/// Bundles selected paths (relative to `cwd`) into one artifact.
pub trait Packer: Send + Sync {
    fn pack(&self, selected: &[String], cwd: &Path) -> Result<PackOutcome>;
}

/// Fail fast on an empty selection before any backend work.
pub fn ensure_selection(selected: &[String]) -> Result<()> {
    if selected.is_empty() {
        return Err(AppError::EmptySelection);
    }
    Ok(())
}

/// Files behind `selected`, in selection order, each listed once.
///
/// Selected directories are walked through `filter`, so a file the tree hides
/// is never packed. `skip` excludes one path, such as the artifact itself.
pub fn expand_selection(
    selected: &[String],
    cwd: &Path,
    filter: &PathFilter,
    skip: Option<&Path>,
) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut keep = |p: PathBuf, files: &mut Vec<PathBuf>| {
        if skip != Some(p.as_path()) && seen.insert(p.clone()) {
            files.push(p);
        }
    };
    for entry in selected {
        let path = cwd.join(entry);
        if path.is_dir() {
            let filter = filter.clone();
            let walk_root = cwd.to_path_buf();
            let mut builder = WalkBuilder::new(&path);
            builder
                .standard_filters(false)
                .follow_links(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .filter_entry(move |e| {
                    !filter.should_ignore(&relative_path(&walk_root, e.path()))
                });
            for found in builder.build().flatten() {
                if found.file_type().is_some_and(|ft| ft.is_file()) {
                    keep(found.into_path(), &mut files);
                }
            }
        } else if path.is_file() {
            keep(path, &mut files);
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn expand_selection_walks_directories_through_filter() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src").join("snapshots")).unwrap();
        fs::write(dir.path().join("src").join("a.rs"), "").unwrap();
        fs::write(dir.path().join("src").join("b.snap"), "").unwrap();
        fs::write(dir.path().join("src").join("snapshots").join("c.rs"), "").unwrap();
        let filter = PathFilter::new(|p| p.ends_with(".snap") || p.ends_with("snapshots"));

        let selected = vec!["src".to_string(), "src/a.rs".to_string()];
        let files = expand_selection(&selected, dir.path(), &filter, None);
        assert_eq!(files, vec![dir.path().join("src").join("a.rs")]);

        let skip = dir.path().join("src").join("a.rs");
        assert!(expand_selection(&selected, dir.path(), &filter, Some(&skip)).is_empty());
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert!(matches!(ensure_selection(&[]), Err(AppError::EmptySelection)));
        assert!(ensure_selection(&["a.txt".to_string()]).is_ok());
    }

    #[test]
    fn describe_mentions_artifact() {
        let outcome = PackOutcome {
            entries: 3,
            artifact: Some(PathBuf::from("out.txt")),
        };
        assert!(outcome.describe().contains("out.txt"));
        assert!(outcome.describe().contains('3'));
        let outcome = PackOutcome {
            entries: 1,
            artifact: None,
        };
        assert_eq!(outcome.describe(), "Complete: 1 entries");
    }
}
