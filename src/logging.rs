//! File logger setup.
//!
//! The terminal owns stdout and stderr while the UI runs, so every log
//! record goes to a file.

use std::fs::{self, File};
use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

/// Build the simplelog config shared by the application and tests.
fn logger_config() -> simplelog::Config {
    ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .add_filter_ignore_str("globset")
        .add_filter_ignore_str("ignore")
        .build()
}

/// Open `log_file_path` for writing, creating parent directories.
fn open_log_file(log_file_path: &Path) -> Option<File> {
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    File::create(log_file_path).ok()
}

/// Install the global file logger.
///
/// Returns false when the file cannot be opened or a logger is already set;
/// the application runs without logging in that case.
pub fn init_global(log_file_path: &Path, level: LevelFilter) -> bool {
    if level == LevelFilter::Off {
        return false;
    }
    let Some(file) = open_log_file(log_file_path) else {
        return false;
    };
    WriteLogger::init(level, logger_config(), file).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_log_file_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }

    #[test]
    fn off_level_installs_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        assert!(!init_global(&path, LevelFilter::Off));
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_location_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        assert!(!init_global(&blocker.join("app.log"), LevelFilter::Info));
    }
}
