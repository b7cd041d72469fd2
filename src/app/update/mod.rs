use crate::backend::ShelfQuery;
use crate::comic::Direction;

use super::messages::{BatchAction, Message};
use super::state::App;

mod progress;
mod reader;
mod runtime;
mod selection;
mod shelf;

pub use runtime::settle;

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadShelf {
        query: ShelfQuery,
        append: bool,
    },
    FetchPageList {
        title: String,
        path: String,
    },
    SaveProgress {
        path: String,
        page: usize,
        direction: Direction,
    },
    RunBatch {
        action: BatchAction,
        titles: Vec<String>,
    },
    /// The shelf changed in a way the render layer must repaint.
    RenderShelf,
    /// The reader changed in a way the render layer must repaint.
    RenderReader,
    /// Snap the long-strip scroll position.
    ScrollStripTo {
        offset: f32,
    },
    /// Move the strip slider without treating it as user input.
    SyncSlider {
        value: f32,
    },
}

impl App {
    pub fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::FilterChanged(filter) => self.handle_filter_changed(filter, &mut effects),
            Message::SortChanged(key) => self.handle_sort_changed(key, &mut effects),
            Message::SearchChanged(term) => self.handle_search_changed(term, &mut effects),
            Message::ZoomChanged(zoom) => self.handle_zoom_changed(zoom, &mut effects),
            Message::RefreshShelf => self.handle_refresh_shelf(&mut effects),
            Message::ShelfScrolled { distance_to_bottom } => {
                self.handle_shelf_scrolled(distance_to_bottom, &mut effects)
            }
            Message::ShelfPageLoaded { page, append } => {
                self.handle_shelf_page_loaded(page, append, &mut effects)
            }
            Message::ShelfLoadFailed { append, error } => {
                self.handle_shelf_load_failed(append, error, &mut effects)
            }
            Message::ToggleSelectionMode => self.handle_toggle_selection_mode(&mut effects),
            Message::ToggleSelected(title) => self.handle_toggle_selected(title, &mut effects),
            Message::ToggleSelectAll => self.handle_toggle_select_all(&mut effects),
            Message::BatchFavorite(favorite) => {
                self.handle_batch(BatchAction::Favorite(favorite), &mut effects)
            }
            Message::BatchAssignFolder(folder) => {
                self.handle_batch(BatchAction::AssignFolder(folder), &mut effects)
            }
            Message::BatchDelete => self.handle_batch(BatchAction::Delete, &mut effects),
            Message::MergeSelected => self.handle_merge_selected(&mut effects),
            Message::BatchCompleted { action, titles } => {
                self.handle_batch_completed(action, titles, &mut effects)
            }
            Message::BatchFailed { error } => self.handle_batch_failed(error, &mut effects),
            Message::OpenReader(title) => self.handle_open_reader(title, &mut effects),
            Message::PageListLoaded { title, pages } => {
                self.handle_page_list_loaded(title, pages, &mut effects)
            }
            Message::PageListFailed { title, error } => {
                self.handle_page_list_failed(title, error, &mut effects)
            }
            Message::ChangePage(delta) => self.handle_change_page(delta, &mut effects),
            Message::JumpToPage(page) => self.handle_jump_to_page(page, &mut effects),
            Message::ChangeViewMode(mode) => self.handle_change_view_mode(mode, &mut effects),
            Message::ToggleDirection => self.handle_toggle_direction(&mut effects),
            Message::CloseReader => self.handle_close_reader(&mut effects),
            Message::StripMeasured {
                epoch,
                page_tops,
                content_height,
                viewport_height,
            } => self.handle_strip_measured(
                epoch,
                page_tops,
                content_height,
                viewport_height,
                &mut effects,
            ),
            Message::StripScrolled { epoch, offset } => {
                self.handle_strip_scrolled(epoch, offset, &mut effects)
            }
            Message::StripSliderMoved(value) => {
                self.handle_strip_slider_moved(value, &mut effects)
            }
            Message::Tick(now) => self.handle_tick(now, &mut effects),
        }

        effects
    }
}
