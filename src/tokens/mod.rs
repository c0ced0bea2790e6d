//! Token table: the per-file token counts for a session root.
//!
//! The table is produced once per session by a [`TokenTableProvider`] and is
//! read-only afterwards. Paths absent from the table count as zero tokens.

pub mod json;
pub mod scan;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::Result;
use crate::fs::filter::PathFilter;
use crate::fs::relative_path;

/// Produces the token table for a root directory.
pub trait TokenTableProvider: Send + Sync {
    fn token_counts(&self, root: &Path) -> Result<TokenTable>;
}

/// Run `provider`, falling back to an empty table on failure.
pub fn load_or_empty(provider: &dyn TokenTableProvider, root: &Path) -> TokenTable {
    match provider.token_counts(root) {
        Ok(table) => {
            info!(
                "Token table loaded: {} files, {} tokens",
                table.len(),
                table.total()
            );
            table
        }
        Err(e) => {
            warn!("Token table unavailable, continuing without counts: {e}");
            TokenTable::empty(root)
        }
    }
}

/// Mapping from relative path to token count, with directory totals.
///
/// Every key is stored in normalized form, so file lookups and directory
/// totals agree on one key space.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    root: PathBuf,
    entries: HashMap<String, usize>,
    /// Sum over every file nested under a normalized relative directory path.
    dir_totals: HashMap<String, usize>,
    total: usize,
}

impl TokenTable {
    /// Build a table for `root` from raw `(key, count)` entries.
    ///
    /// Keys may be forward-slash relative, OS-relative, absolute or `./`-prefixed.
    pub fn new(root: &Path, entries: HashMap<String, usize>) -> Self {
        Self::build(root, entries, None)
    }

    /// Like [`TokenTable::new`], but drops every entry the tree would never
    /// show: the file itself or one of its parent directories is ignored.
    pub fn filtered(root: &Path, entries: HashMap<String, usize>, filter: &PathFilter) -> Self {
        Self::build(root, entries, Some(filter))
    }

    fn build(root: &Path, raw: HashMap<String, usize>, filter: Option<&PathFilter>) -> Self {
        // An exact normalized key wins over its variant spellings.
        let mut entries: HashMap<String, usize> = HashMap::new();
        for (key, count) in raw {
            let nk = normalize_key(root, &key);
            if nk.is_empty() || filter.is_some_and(|f| is_hidden(f, &nk)) {
                continue;
            }
            if nk == key {
                entries.insert(nk, count);
            } else {
                entries.entry(nk).or_insert(count);
            }
        }

        let mut dir_totals: HashMap<String, usize> = HashMap::new();
        let mut total = 0;
        for (key, &count) in &entries {
            total += count;
            for (i, _) in key.match_indices('/') {
                *dir_totals.entry(key[..i].to_string()).or_default() += count;
            }
        }

        Self {
            root: root.to_path_buf(),
            entries,
            dir_totals,
            total,
        }
    }

    pub fn empty(root: &Path) -> Self {
        Self::new(root, HashMap::new())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every file in the table.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Token count of one file. Missing means zero.
    pub fn file_tokens(&self, path: &Path) -> usize {
        let key = normalize_key(&self.root, &relative_path(&self.root, path));
        self.entries.get(&key).copied().unwrap_or(0)
    }

    /// Sum over every file nested under directory `path`.
    pub fn directory_tokens(&self, path: &Path) -> usize {
        let key = normalize_key(&self.root, &relative_path(&self.root, path));
        if key.is_empty() {
            return self.total;
        }
        self.dir_totals.get(&key).copied().unwrap_or(0)
    }
}

/// True when `key` or any directory above it is ignored by `filter`.
fn is_hidden(filter: &PathFilter, key: &str) -> bool {
    key.match_indices('/')
        .map(|(i, _)| &key[..i])
        .chain(std::iter::once(key))
        .any(|prefix| filter.should_ignore(prefix))
}

/// Normalize a table key to forward-slash form relative to `root`.
fn normalize_key(root: &Path, key: &str) -> String {
    let key = key.replace('\\', "/");
    let stripped = Path::new(&key)
        .strip_prefix(root)
        .ok()
        .filter(|_| Path::new(&key).is_absolute())
        .map(|rel| rel.to_string_lossy().replace('\\', "/"));
    let key = stripped.unwrap_or(key);
    let mut key = key.as_str();
    while let Some(rest) = key.strip_prefix("./") {
        key = rest;
    }
    key.trim_end_matches('/').to_string()
}
