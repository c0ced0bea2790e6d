//! Local token counting: walk the root and tokenize every included file.
//!
//! The walk applies the same `PathFilter` the tree uses, so directories the
//! user can never see contribute nothing to any total.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ignore::WalkBuilder;
use log::{debug, info};
use tiktoken_rs::CoreBPE;

use super::{TokenTable, TokenTableProvider};
use crate::error::{AppError, Result};
use crate::fs::filter::PathFilter;
use crate::fs::relative_path;

/// Default upper bound on file size for tokenization (1 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1_048_576;

/// BPE vocabulary used for counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Cl100kBase,
    O200kBase,
    P50kBase,
}

impl Encoding {
    /// Parse an encoding name from config; unknown names fall back to `cl100k_base`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "o200k_base" => Encoding::O200kBase,
            "p50k_base" => Encoding::P50kBase,
            _ => Encoding::Cl100kBase,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::O200kBase => "o200k_base",
            Encoding::P50kBase => "p50k_base",
        }
    }

    fn load(&self) -> Result<CoreBPE> {
        let bpe = match self {
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
        };
        bpe.map_err(|e| AppError::TokenTable(format!("{}: {e}", self.name())))
    }
}

/// Builds the token table by tokenizing files under the root.
pub struct ScanTokenProvider {
    filter: PathFilter,
    encoding: Encoding,
    max_file_bytes: u64,
}

impl ScanTokenProvider {
    pub fn new(filter: PathFilter, encoding: Encoding, max_file_bytes: u64) -> Self {
        Self {
            filter,
            encoding,
            max_file_bytes,
        }
    }
}

impl TokenTableProvider for ScanTokenProvider {
    fn token_counts(&self, root: &Path) -> Result<TokenTable> {
        if !root.is_dir() {
            return Err(AppError::InvalidPath(root.display().to_string()));
        }
        let bpe = self.encoding.load()?;
        info!(
            "Counting tokens under {root:?} with {}",
            self.encoding.name()
        );

        let filter = self.filter.clone();
        let walk_root = root.to_path_buf();
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                !filter.should_ignore(&relative_path(&walk_root, entry.path()))
            });

        let mut entries = HashMap::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Token scan: skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            if let Ok(meta) = entry.metadata() {
                if meta.len() > self.max_file_bytes {
                    debug!("Token scan: {path:?} exceeds {} bytes", self.max_file_bytes);
                    continue;
                }
            }
            // Binary and non-UTF-8 files are not counted.
            let Ok(text) = fs::read_to_string(path) else {
                continue;
            };
            let count = bpe.encode_with_special_tokens(&text).len();
            entries.insert(relative_path(root, path), count);
        }

        Ok(TokenTable::new(root, entries))
    }
}
