mod app;
mod components;
mod config;
mod error;
mod event;
mod explorer;
mod fs;
mod handler;
mod logging;
mod pack;
mod theme;
mod tokens;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};

use crate::app::App;
use crate::config::{AppConfig, PackBackend, TokenSource};
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::fs::filter::PathFilter;
use crate::fs::reader::DirectoryReader;
use crate::pack::{ConcatPacker, Packer, RepomixPacker};
use crate::tokens::json::JsonTokenProvider;
use crate::tokens::scan::ScanTokenProvider;
use crate::tokens::TokenTableProvider;
use crate::tui::{install_panic_hook, Tui};

/// Interactive file picker with token budgets.
#[derive(Parser, Debug)]
#[command(name = "repopick", version, about)]
struct Cli {
    /// Root directory to browse (defaults to the current directory)
    path: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not honor .gitignore files
    #[arg(long)]
    no_gitignore: bool,

    /// Read token counts from a JSON table instead of scanning
    #[arg(long, value_name = "FILE")]
    tokens_from: Option<PathBuf>,

    /// Tokenizer used when scanning (cl100k_base, o200k_base)
    #[arg(long)]
    encoding: Option<String>,

    /// Packer command for the repomix backend
    #[arg(long)]
    pack_command: Option<String>,

    /// Write the concatenated selection to a file instead of running a packer
    #[arg(long, value_name = "FILE")]
    concat: Option<PathBuf>,

    /// Log file location
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Draw ASCII instead of unicode glyphs
    #[arg(long)]
    no_icons: bool,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,
}

impl Cli {
    /// CLI flags as the highest-priority config layer.
    fn overrides(&self) -> AppConfig {
        let mut cfg = AppConfig::default();
        let as_string = |p: &PathBuf| p.to_string_lossy().into_owned();

        cfg.general.root = self.path.as_ref().map(as_string);
        if self.no_mouse {
            cfg.general.mouse = Some(false);
        }
        if self.no_icons {
            cfg.tree.use_icons = Some(false);
        }
        if self.no_gitignore {
            cfg.ignore.use_gitignore = Some(false);
        }
        if let Some(table) = &self.tokens_from {
            cfg.tokens.source = Some("json".into());
            cfg.tokens.table_path = Some(as_string(table));
        }
        cfg.tokens.encoding = self.encoding.clone();
        cfg.pack.command = self.pack_command.clone();
        if let Some(output) = &self.concat {
            cfg.pack.backend = Some("concat".into());
            cfg.pack.output = Some(as_string(output));
        }
        cfg.log.file = self.log_file.as_ref().map(as_string);
        cfg.log.level = self.log_level.clone();
        cfg
    }
}

fn token_provider(
    config: &AppConfig,
    filter: PathFilter,
) -> error::Result<Box<dyn TokenTableProvider>> {
    Ok(match config.token_source() {
        TokenSource::Scan => Box::new(ScanTokenProvider::new(
            filter,
            config.encoding(),
            config.max_file_bytes(),
        )),
        TokenSource::Json => {
            let path = config.token_table_path().ok_or_else(|| {
                AppError::Config("token source \"json\" needs tokens.table_path".into())
            })?;
            Box::new(JsonTokenProvider::new(path, filter))
        }
    })
}

fn packer(config: &AppConfig, filter: PathFilter, root: &Path) -> Arc<dyn Packer> {
    match config.pack_backend() {
        PackBackend::Repomix => Arc::new(RepomixPacker::new(
            config.pack_command().to_string(),
            config.pack_args(),
            config.pack_copy(),
            filter,
        )),
        PackBackend::Concat => Arc::new(ConcatPacker::new(filter, root.join(config.pack_output()))),
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    if let Some(log_file) = config.log_file() {
        logging::init_global(&log_file, config.log_level());
    }

    let requested = PathBuf::from(config.root().unwrap_or("."));
    let root = requested.canonicalize().map_err(|_| {
        AppError::InvalidPath(format!("{} does not exist", requested.display()))
    })?;
    if !root.is_dir() {
        return Err(AppError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    info!("Starting repopick at {}", root.display());

    let filter = PathFilter::from_rules(&root, &config.ignore_rules());
    let provider = token_provider(&config, filter.clone())?;
    let packer = packer(&config, filter.clone(), &root);
    let theme = theme::resolve_theme(&config.theme);

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut app = App::new(
        DirectoryReader::new(root.clone(), filter),
        packer,
        theme,
        config.use_icons(),
    );
    let mut events = EventHandler::new(Duration::from_millis(100));
    let event_tx = events.sender();

    // Token counting can take a while on large trees; the UI shows a loading screen meanwhile.
    {
        let tx = event_tx.clone();
        let root = root.clone();
        tokio::task::spawn_blocking(move || {
            let table = tokens::load_or_empty(provider.as_ref(), &root);
            if tx.send(Event::TokenTableLoaded(table)).is_err() {
                warn!("Token table finished after shutdown");
            }
        });
    }

    loop {
        tui.draw(&mut app)?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key, &event_tx),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.on_tick(),
            Event::Resize(_, _) => {}
            Event::TokenTableLoaded(table) => app.on_token_table(table),
            Event::PackComplete(result) => app.on_pack_complete(result),
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    info!("Exiting");
    Ok(())
}
