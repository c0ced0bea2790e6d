use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Result;
use crate::event::Event;
use crate::explorer::ExplorerSession;
use crate::fs::reader::DirectoryReader;
use crate::pack::{PackOutcome, Packer};
use crate::theme::ThemeColors;
use crate::tokens::TokenTable;

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    /// Waiting for the token table.
    #[default]
    Loading,
    Browsing,
    /// A pack run is in flight; input other than quit is ignored.
    Executing,
    /// Outcome of the last pack run; any key dismisses it.
    Result { message: String, success: bool },
}

/// Main application state.
pub struct App {
    pub session: Option<ExplorerSession>,
    pub mode: AppMode,
    pub should_quit: bool,
    pub scroll_offset: usize,
    /// Screen row of the first tree line, recorded at render time for mouse hits.
    pub tree_top: u16,
    pub theme: ThemeColors,
    pub use_icons: bool,
    /// Tick counter driving the loading animation.
    pub ticks: usize,
    reader: DirectoryReader,
    packer: Arc<dyn Packer>,
}

impl App {
    pub fn new(
        reader: DirectoryReader,
        packer: Arc<dyn Packer>,
        theme: ThemeColors,
        use_icons: bool,
    ) -> Self {
        Self {
            session: None,
            mode: AppMode::Loading,
            should_quit: false,
            scroll_offset: 0,
            tree_top: 0,
            theme,
            use_icons,
            ticks: 0,
            reader,
            packer,
        }
    }

    pub fn root(&self) -> &Path {
        self.reader.root()
    }

    /// Open the session once the token table is available.
    pub fn on_token_table(&mut self, table: TokenTable) {
        let session = ExplorerSession::new(self.reader.clone(), table);
        info!("Browsing {} top-level entries", session.roots().len());
        self.session = Some(session);
        self.mode = AppMode::Browsing;
    }

    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Leave the result screen.
    pub fn dismiss(&mut self) {
        if matches!(self.mode, AppMode::Result { .. }) {
            self.mode = AppMode::Browsing;
        }
    }

    /// Switch to `Executing` and return the paths to pack.
    ///
    /// Returns `None` when packing cannot start: not browsing, a run is
    /// already in flight, or nothing is selected (which shows an error).
    pub fn begin_pack(&mut self) -> Option<Vec<String>> {
        if self.mode != AppMode::Browsing {
            return None;
        }
        let selected = self.session.as_ref()?.selected_paths();
        if selected.is_empty() {
            self.mode = AppMode::Result {
                message: "❌ No files selected".to_string(),
                success: false,
            };
            return None;
        }
        self.mode = AppMode::Executing;
        Some(selected)
    }

    /// Start a pack run on a blocking thread; completion arrives as an event.
    pub fn execute(&mut self, tx: &UnboundedSender<Event>) {
        let Some(selected) = self.begin_pack() else {
            return;
        };
        info!("Packing {} selected entries", selected.len());
        let packer = Arc::clone(&self.packer);
        let cwd = self.root().to_path_buf();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || packer.pack(&selected, &cwd))
                .await
                .unwrap_or_else(|e| Err(crate::error::AppError::Pack(e.to_string())));
            let _ = tx.send(Event::PackComplete(result));
        });
    }

    pub fn on_pack_complete(&mut self, result: Result<PackOutcome>) {
        self.mode = match result {
            Ok(outcome) => {
                info!("Pack finished: {}", outcome.describe());
                AppMode::Result {
                    message: format!("✅ {}", outcome.describe()),
                    success: true,
                }
            }
            Err(e) => {
                error!("Pack failed: {e}");
                AppMode::Result {
                    message: format!("❌ {e}"),
                    success: false,
                }
            }
        };
    }

    /// Update the scroll offset to ensure the cursor row is visible.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        let cursor = session.cursor();
        if cursor < self.scroll_offset {
            self.scroll_offset = cursor;
        } else if cursor >= self.scroll_offset + visible_height {
            self.scroll_offset = cursor - visible_height + 1;
        }
        let max_offset = session.len().saturating_sub(visible_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Place the cursor on the tree row drawn at screen row `row`.
    pub fn click_row(&mut self, row: u16) {
        if row < self.tree_top {
            return;
        }
        let index = self.scroll_offset + (row - self.tree_top) as usize;
        if let Some(session) = self.session.as_mut() {
            if index < session.len() {
                session.navigate_to(index);
            }
        }
    }
}
