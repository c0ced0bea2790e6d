//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--no-gitignore`, `--tokens-from`, etc.)
//! 2. `$REPOPICK_CONFIG` environment variable (path to config file)
//! 3. Project-local `.repopick.toml` in the current working directory
//! 4. Global `~/.config/repopick/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

use crate::fs::filter::IgnoreRules;
use crate::pack::concat::DEFAULT_OUTPUT;
use crate::tokens::scan::{Encoding, DEFAULT_MAX_FILE_BYTES};

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory to browse (overridden by CLI positional arg).
    pub root: Option<String>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Use unicode glyphs (false = ASCII fallback).
    pub use_icons: Option<bool>,
}

/// Which entries are hidden from the tree and the token scan.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Extra gitignore-style patterns.
    pub patterns: Option<Vec<String>>,
    /// Honor the root `.gitignore`.
    pub use_gitignore: Option<bool>,
    /// Hide `.git`, `node_modules`, `target` and friends.
    pub use_defaults: Option<bool>,
}

/// Token table settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TokensConfig {
    /// "scan" or "json".
    pub source: Option<String>,
    /// JSON table path for the "json" source.
    pub table_path: Option<String>,
    /// "cl100k_base", "o200k_base" or "p50k_base".
    pub encoding: Option<String>,
    /// Files larger than this are not tokenized.
    pub max_file_bytes: Option<u64>,
}

/// Packing backend settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PackConfig {
    /// "repomix" or "concat".
    pub backend: Option<String>,
    /// Executable for the repomix backend.
    pub command: Option<String>,
    /// Extra arguments appended to the command.
    pub args: Option<Vec<String>>,
    /// Ask repomix to copy the result to the clipboard.
    pub copy: Option<bool>,
    /// Output path for the concat backend.
    pub output: Option<String>,
}

/// Log file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<String>,
    /// "off", "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub tree_fg: Option<String>,
    pub cursor_bg: Option<String>,
    pub cursor_fg: Option<String>,
    pub dir_fg: Option<String>,
    pub checked_fg: Option<String>,
    pub partial_fg: Option<String>,
    pub token_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub ignore: IgnoreConfig,
    pub tokens: TokensConfig,
    pub pack: PackConfig,
    pub log: LogConfig,
    pub theme: ThemeConfig,
}

/// Where the token table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Scan,
    Json,
}

/// Which packer runs on execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackBackend {
    Repomix,
    Concat,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default command for the repomix backend.
pub const DEFAULT_PACK_COMMAND: &str = "repomix";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path — that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("REPOPICK_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".repopick.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("repopick").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
///
/// Runs before the logger exists, so warnings go to stderr.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self` — `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                root: other.general.root.clone().or(self.general.root),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            tree: TreeConfig {
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
            },
            ignore: IgnoreConfig {
                patterns: other.ignore.patterns.clone().or(self.ignore.patterns),
                use_gitignore: other.ignore.use_gitignore.or(self.ignore.use_gitignore),
                use_defaults: other.ignore.use_defaults.or(self.ignore.use_defaults),
            },
            tokens: TokensConfig {
                source: other.tokens.source.clone().or(self.tokens.source),
                table_path: other.tokens.table_path.clone().or(self.tokens.table_path),
                encoding: other.tokens.encoding.clone().or(self.tokens.encoding),
                max_file_bytes: other.tokens.max_file_bytes.or(self.tokens.max_file_bytes),
            },
            pack: PackConfig {
                backend: other.pack.backend.clone().or(self.pack.backend),
                command: other.pack.command.clone().or(self.pack.command),
                args: other.pack.args.clone().or(self.pack.args),
                copy: other.pack.copy.or(self.pack.copy),
                output: other.pack.output.clone().or(self.pack.output),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                level: other.log.level.clone().or(self.log.level),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: match (&self.theme.custom, &other.theme.custom) {
                    (_, Some(o)) => Some(o.clone()),
                    (Some(s), None) => Some(s.clone()),
                    (None, None) => None,
                },
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so higher layers overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Configured root directory, if any.
    pub fn root(&self) -> Option<&str> {
        self.general.root.as_deref()
    }

    /// Whether mouse support is enabled.
    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Whether to draw unicode glyphs.
    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(true)
    }

    /// Ignore rules for the path filter.
    pub fn ignore_rules(&self) -> IgnoreRules {
        IgnoreRules {
            use_defaults: self.ignore.use_defaults.unwrap_or(true),
            use_gitignore: self.ignore.use_gitignore.unwrap_or(true),
            patterns: self.ignore.patterns.clone().unwrap_or_default(),
        }
    }

    /// Token source; a configured table path implies "json".
    pub fn token_source(&self) -> TokenSource {
        match self.tokens.source.as_deref() {
            Some("json") => TokenSource::Json,
            Some(_) => TokenSource::Scan,
            None if self.tokens.table_path.is_some() => TokenSource::Json,
            None => TokenSource::Scan,
        }
    }

    pub fn token_table_path(&self) -> Option<PathBuf> {
        self.tokens.table_path.as_ref().map(PathBuf::from)
    }

    pub fn encoding(&self) -> Encoding {
        self.tokens
            .encoding
            .as_deref()
            .map(Encoding::from_name)
            .unwrap_or_default()
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.tokens.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES)
    }

    pub fn pack_backend(&self) -> PackBackend {
        match self.pack.backend.as_deref() {
            Some("concat") => PackBackend::Concat,
            _ => PackBackend::Repomix,
        }
    }

    pub fn pack_command(&self) -> &str {
        self.pack.command.as_deref().unwrap_or(DEFAULT_PACK_COMMAND)
    }

    pub fn pack_args(&self) -> Vec<String> {
        self.pack.args.clone().unwrap_or_default()
    }

    pub fn pack_copy(&self) -> bool {
        self.pack.copy.unwrap_or(true)
    }

    pub fn pack_output(&self) -> PathBuf {
        PathBuf::from(self.pack.output.as_deref().unwrap_or(DEFAULT_OUTPUT))
    }

    /// Log file path; defaults under the platform data directory.
    pub fn log_file(&self) -> Option<PathBuf> {
        match &self.log.file {
            Some(file) => Some(PathBuf::from(file)),
            None => dirs::data_local_dir().map(|d| d.join("repopick").join("repopick.log")),
        }
    }

    /// Log level; unknown names fall back to `info`.
    pub fn log_level(&self) -> LevelFilter {
        self.log
            .level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
