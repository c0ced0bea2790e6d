use std::path::Path;
use std::process::Command;

use log::{debug, info};

use super::{ensure_selection, expand_selection, PackOutcome, Packer};
use crate::error::{AppError, Result};
use crate::fs::filter::PathFilter;
use crate::fs::relative_path;

/// Runs the external `repomix` CLI with an `--include` list.
///
/// Selected directories are expanded into their visible files first, so
/// entries hidden by the ignore rules never reach repomix.
#[derive(Debug, Clone)]
pub struct RepomixPacker {
    command: String,
    extra_args: Vec<String>,
    copy: bool,
    filter: PathFilter,
}

impl RepomixPacker {
    pub fn new(command: String, extra_args: Vec<String>, copy: bool, filter: PathFilter) -> Self {
        Self {
            command,
            extra_args,
            copy,
            filter,
        }
    }

    /// Arguments passed to the command for `selected`, resolved against `cwd`.
    pub fn build_args(&self, selected: &[String], cwd: &Path) -> Result<Vec<String>> {
        let files = expand_selection(selected, cwd, &self.filter, None);
        if files.is_empty() {
            return Err(AppError::Pack("no files under the selection".into()));
        }
        let patterns = files
            .iter()
            .map(|file| include_pattern(&relative_path(cwd, file)))
            .collect::<Result<Vec<_>>>()?;

        let mut args = vec!["--include".to_string(), patterns.join(",")];
        if self.copy {
            args.push("--copy".to_string());
        }
        args.push("--quiet".to_string());
        args.extend(self.extra_args.iter().cloned());
        Ok(args)
    }
}

/// Literal glob for one relative path.
///
/// Commas separate `--include` patterns and cannot be escaped, so such names
/// are rejected.
fn include_pattern(path: &str) -> Result<String> {
    if path.contains(',') {
        return Err(AppError::Pack(format!(
            "{path}: names containing ',' cannot be passed to repomix"
        )));
    }
    let mut pattern = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '\\' | '*' | '?' | '[' | ']' | '{' | '}' | '(' | ')' | '!') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    Ok(pattern)
}

impl Packer for RepomixPacker {
    fn pack(&self, selected: &[String], cwd: &Path) -> Result<PackOutcome> {
        ensure_selection(selected)?;
        let args = self.build_args(selected, cwd)?;
        debug!("Running {} {:?} in {cwd:?}", self.command, args);

        let output = Command::new(&self.command)
            .args(&args)
            .current_dir(cwd)
            .output()
            .map_err(|e| AppError::Pack(format!("{}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let cause = if stderr.is_empty() {
                format!("{} exited with {}", self.command, output.status)
            } else {
                stderr
            };
            return Err(AppError::Pack(cause));
        }

        info!("{} packed {} entries", self.command, selected.len());
        Ok(PackOutcome {
            entries: selected.len(),
            artifact: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("a.rs"), "").unwrap();
        fs::write(dir.path().join("src").join("b.snap"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        dir
    }

    fn packer(command: &str, extra_args: Vec<String>, copy: bool) -> RepomixPacker {
        let filter = PathFilter::new(|p| p.ends_with(".snap"));
        RepomixPacker::new(command.into(), extra_args, copy, filter)
    }

    #[test]
    fn directories_expand_to_visible_files() {
        let dir = setup();
        let args = packer("repomix", Vec::new(), true)
            .build_args(&["src".to_string(), "a.txt".to_string()], dir.path())
            .unwrap();
        assert_eq!(
            args,
            vec!["--include", "src/a.rs,a.txt", "--copy", "--quiet"]
        );
    }

    #[test]
    fn copy_flag_and_extra_args_are_honored() {
        let dir = setup();
        let packer = packer("repomix", vec!["--style".into(), "markdown".into()], false);
        let args = packer.build_args(&["a.txt".to_string()], dir.path()).unwrap();
        assert_eq!(
            args,
            vec!["--include", "a.txt", "--quiet", "--style", "markdown"]
        );
    }

    #[test]
    fn glob_metacharacters_are_escaped() {
        assert_eq!(
            include_pattern("src/[id]/page*.tsx").unwrap(),
            "src/\\[id\\]/page\\*.tsx"
        );
        assert_eq!(include_pattern("plain/file.rs").unwrap(), "plain/file.rs");
    }

    #[test]
    fn comma_in_name_is_pack_error() {
        let dir = setup();
        fs::write(dir.path().join("a,b.txt"), "").unwrap();
        let result =
            packer("repomix", Vec::new(), true).build_args(&["a,b.txt".to_string()], dir.path());
        assert!(matches!(result, Err(AppError::Pack(msg)) if msg.contains("a,b.txt")));
    }

    #[test]
    fn selection_without_visible_files_is_pack_error() {
        let dir = setup();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let result =
            packer("repomix", Vec::new(), true).build_args(&["empty".to_string()], dir.path());
        assert!(matches!(result, Err(AppError::Pack(_))));
    }

    #[test]
    fn empty_selection_never_spawns() {
        let dir = setup();
        let result = packer("/definitely/not/a/command", Vec::new(), true).pack(&[], dir.path());
        assert!(matches!(result, Err(AppError::EmptySelection)));
    }

    #[test]
    fn missing_command_is_pack_error() {
        let dir = setup();
        let result = packer("/definitely/not/a/command", Vec::new(), true)
            .pack(&["a.txt".to_string()], dir.path());
        assert!(matches!(result, Err(AppError::Pack(_))));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_pack_error() {
        let dir = setup();
        let result = packer("false", Vec::new(), false).pack(&["a.txt".to_string()], dir.path());
        match result {
            Err(AppError::Pack(msg)) => assert!(msg.contains("false exited")),
            other => panic!("expected pack error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_run_reports_entries() {
        let dir = setup();
        let outcome = packer("true", Vec::new(), false)
            .pack(&["a.txt".to_string(), "src".to_string()], dir.path())
            .unwrap();
        assert_eq!(outcome.entries, 2);
        assert!(outcome.artifact.is_none());
    }
}
