mod reader;
mod selection;
mod shelf;

use crate::config::AppConfig;
use crate::progress::ProgressPersister;

use super::update::Effect;

pub use reader::{ReaderSession, ReaderState, ViewMode};
pub use selection::SelectionState;
pub use shelf::ShelfState;

/// Core application state composed of sub-models.
pub struct App {
    pub(super) shelf: ShelfState,
    pub(super) selection: SelectionState,
    pub(super) reader: ReaderState,
    pub(super) persister: ProgressPersister,
    pub(super) config: AppConfig,
}

impl App {
    /// Build the initial state and the effect that loads the first shelf page.
    pub fn bootstrap(config: AppConfig) -> (App, Vec<Effect>) {
        let mut app = App {
            shelf: ShelfState::new(config.zoom_level),
            selection: SelectionState::default(),
            reader: ReaderState::default(),
            persister: ProgressPersister::new(),
            config,
        };

        tracing::info!(
            backend = %app.config.backend_url,
            page_size = app.config.page_size,
            "Initialized app state"
        );

        let mut effects = Vec::new();
        app.start_shelf_load(false, &mut effects);
        (app, effects)
    }

    pub fn shelf(&self) -> &ShelfState {
        &self.shelf
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn reader(&self) -> &ReaderState {
        &self.reader
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether an unsent progress write is still waiting on its debounce.
    pub fn has_pending_progress(&self) -> bool {
        self.persister.has_pending()
    }
}
