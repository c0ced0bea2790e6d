use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{ensure_selection, expand_selection, PackOutcome, Packer};
use crate::error::{AppError, Result};
use crate::fs::filter::PathFilter;
use crate::fs::relative_path;

/// Default artifact name, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "repopick-output.txt";

/// Writes every selected file into one delimited text file.
///
/// Selected directories are expanded through the same ignore filter as the tree.
#[derive(Debug, Clone)]
pub struct ConcatPacker {
    filter: PathFilter,
    output: PathBuf,
}

impl ConcatPacker {
    pub fn new(filter: PathFilter, output: PathBuf) -> Self {
        Self { filter, output }
    }

    fn output_path(&self, cwd: &Path) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            cwd.join(&self.output)
        }
    }
}

impl Packer for ConcatPacker {
    fn pack(&self, selected: &[String], cwd: &Path) -> Result<PackOutcome> {
        ensure_selection(selected)?;
        let output = self.output_path(cwd);
        let files = expand_selection(selected, cwd, &self.filter, Some(&output));

        let mut content = String::new();
        let mut written = 0;
        for path in &files {
            let display = relative_path(cwd, path);
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Skipping non-UTF-8 file {display}");
                    continue;
                }
                Err(e) => return Err(AppError::Pack(format!("{display}: {e}"))),
            };
            content.push_str(&format!("--- START FILE: {display} ---\n"));
            content.push_str(&text);
            if !text.ends_with('\n') {
                content.push('\n');
            }
            content.push_str(&format!("--- END FILE: {display} ---\n\n"));
            written += 1;
        }

        fs::write(&output, content)
            .map_err(|e| AppError::Pack(format!("{}: {e}", output.display())))?;
        info!("Wrote {written} files to {output:?}");
        Ok(PackOutcome {
            entries: written,
            artifact: Some(output),
        })
    }
}
