//! Ignore predicate used to hide entries from the tree and the token scan.
//!
//! `PathFilter` is a thin, cloneable wrapper around any
//! `Fn(&str) -> bool` that receives a forward-slash path relative to the
//! session root. The default predicate combines well-known build/VCS
//! directory names with gitignore-style rules from `.gitignore` and config.

use std::path::{Component, Path};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, warn};

/// Directory and file names hidden by default, matched against every path component.
pub const DEFAULT_IGNORE_NAMES: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    "venv",
    ".venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "target",
    "dist",
    "build",
];

type IgnorePredicate = dyn Fn(&str) -> bool + Send + Sync;

/// Rules used to build the default ignore predicate.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    /// Apply `DEFAULT_IGNORE_NAMES`.
    pub use_defaults: bool,
    /// Read `<root>/.gitignore`.
    pub use_gitignore: bool,
    /// Extra gitignore-style patterns.
    pub patterns: Vec<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self {
            use_defaults: true,
            use_gitignore: true,
            patterns: Vec::new(),
        }
    }
}

/// Decides whether a relative path is excluded from listing and counting.
#[derive(Clone)]
pub struct PathFilter {
    predicate: Arc<IgnorePredicate>,
}

impl std::fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathFilter").finish_non_exhaustive()
    }
}

impl PathFilter {
    /// Wrap an externally supplied predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// A filter that never ignores anything.
    pub fn allow_all() -> Self {
        Self::new(|_| false)
    }

    /// Build the default predicate for `root` from `rules`.
    ///
    /// Invalid patterns and an unreadable `.gitignore` are logged and skipped.
    pub fn from_rules(root: &Path, rules: &IgnoreRules) -> Self {
        let gitignore = build_gitignore(root, rules);
        let names: Vec<String> = if rules.use_defaults {
            DEFAULT_IGNORE_NAMES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        Self::new(move |relative| {
            if matches_component(Path::new(relative), &names) {
                return true;
            }
            // The predicate only sees a path, so honor directory-only rules too.
            gitignore
                .matched_path_or_any_parents(relative, false)
                .is_ignore()
                || gitignore
                    .matched_path_or_any_parents(relative, true)
                    .is_ignore()
        })
    }

    /// Whether `relative_path` should be hidden.
    pub fn should_ignore(&self, relative_path: &str) -> bool {
        if relative_path.is_empty() {
            return false;
        }
        (self.predicate)(relative_path)
    }
}

fn build_gitignore(root: &Path, rules: &IgnoreRules) -> Gitignore {
    let mut builder = GitignoreBuilder::new(root);

    if rules.use_gitignore {
        let gitignore_path = root.join(".gitignore");
        if gitignore_path.is_file() {
            if let Some(err) = builder.add(&gitignore_path) {
                warn!("PathFilter: could not read {gitignore_path:?}: {err}");
            } else {
                debug!("PathFilter: loaded {gitignore_path:?}");
            }
        }
    }

    for pattern in &rules.patterns {
        let trimmed = pattern.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Err(err) = builder.add_line(None, trimmed) {
            warn!("PathFilter: invalid ignore pattern '{pattern}': {err}");
        }
    }

    match builder.build() {
        Ok(gitignore) => gitignore,
        Err(err) => {
            warn!("PathFilter: failed to build ignore matcher: {err}");
            Gitignore::empty()
        }
    }
}

/// True if any normal component of `path` equals one of `names`.
fn matches_component(path: &Path, names: &[String]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            names.iter().any(|n| *n == name)
        }
        _ => false,
    })
}
