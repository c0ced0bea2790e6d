use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{TokenTable, TokenTableProvider};
use crate::error::{AppError, Result};
use crate::fs::filter::PathFilter;

/// Reads a precomputed `{ "relative/path": count }` table from a JSON file.
///
/// Entries the tree hides are dropped, so an ignored file never adds to a
/// directory total.
pub struct JsonTokenProvider {
    path: PathBuf,
    filter: PathFilter,
}

impl JsonTokenProvider {
    pub fn new(path: PathBuf, filter: PathFilter) -> Self {
        Self { path, filter }
    }
}

impl TokenTableProvider for JsonTokenProvider {
    fn token_counts(&self, root: &Path) -> Result<TokenTable> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::TokenTable(format!("{}: {e}", self.path.display())))?;
        let entries: HashMap<String, usize> = serde_json::from_str(&content)
            .map_err(|e| AppError::TokenTable(format!("{}: {e}", self.path.display())))?;
        Ok(TokenTable::filtered(root, entries, &self.filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_table_from_json() {
        let dir = TempDir::new().unwrap();
        let table_path = dir.path().join("tokens.json");
        fs::write(&table_path, r#"{ "lib/x.ts": 30, "./lib/y.ts": 70 }"#).unwrap();

        let table = JsonTokenProvider::new(table_path, PathFilter::allow_all())
            .token_counts(dir.path())
            .unwrap();
        assert_eq!(table.file_tokens(&dir.path().join("lib").join("x.ts")), 30);
        assert_eq!(table.directory_tokens(&dir.path().join("lib")), 100);
    }

    #[test]
    fn ignored_entries_are_not_counted() {
        let dir = TempDir::new().unwrap();
        let table_path = dir.path().join("tokens.json");
        fs::write(
            &table_path,
            r#"{ "src/a.rs": 40, "src/b.snap": 500, "node_modules/x.js": 7 }"#,
        )
        .unwrap();
        let filter = PathFilter::new(|p| p.ends_with(".snap") || p == "node_modules");

        let table = JsonTokenProvider::new(table_path, filter)
            .token_counts(dir.path())
            .unwrap();
        assert_eq!(table.directory_tokens(&dir.path().join("src")), 40);
        assert_eq!(table.total(), 40);
    }

    #[test]
    fn missing_file_is_token_table_error() {
        let dir = TempDir::new().unwrap();
        let provider =
            JsonTokenProvider::new(dir.path().join("absent.json"), PathFilter::allow_all());
        let result = provider.token_counts(dir.path());
        assert!(matches!(result, Err(AppError::TokenTable(_))));
    }

    #[test]
    fn malformed_json_is_token_table_error() {
        let dir = TempDir::new().unwrap();
        let table_path = dir.path().join("tokens.json");
        fs::write(&table_path, r#"{ "a.txt": "many" }"#).unwrap();
        let provider = JsonTokenProvider::new(table_path, PathFilter::allow_all());
        let result = provider.token_counts(dir.path());
        assert!(matches!(result, Err(AppError::TokenTable(_))));
    }
}
