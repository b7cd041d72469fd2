use crate::backend::{ShelfFilter, ShelfPage, SortKey};
use crate::comic::ZoomLevel;
use std::time::Instant;

use super::state::ViewMode;

/// Messages fed to the reducer by the render layer and the effect runtime.
#[derive(Debug, Clone)]
pub enum Message {
    // Shelf.
    FilterChanged(ShelfFilter),
    SortChanged(SortKey),
    SearchChanged(String),
    ZoomChanged(ZoomLevel),
    RefreshShelf,
    ShelfScrolled {
        distance_to_bottom: f32,
    },
    ShelfPageLoaded {
        page: ShelfPage,
        append: bool,
    },
    ShelfLoadFailed {
        append: bool,
        error: String,
    },

    // Selection and batch operations.
    ToggleSelectionMode,
    ToggleSelected(String),
    ToggleSelectAll,
    BatchFavorite(bool),
    BatchAssignFolder(Option<String>),
    BatchDelete,
    MergeSelected,
    BatchCompleted {
        action: BatchAction,
        titles: Vec<String>,
    },
    BatchFailed {
        error: String,
    },

    // Reader.
    OpenReader(String),
    PageListLoaded {
        title: String,
        pages: Vec<String>,
    },
    PageListFailed {
        title: String,
        error: String,
    },
    ChangePage(i32),
    JumpToPage(usize),
    ChangeViewMode(ViewMode),
    ToggleDirection,
    CloseReader,

    // Long-strip geometry reports.
    StripMeasured {
        epoch: u64,
        page_tops: Vec<f32>,
        content_height: f32,
        viewport_height: f32,
    },
    StripScrolled {
        epoch: u64,
        offset: f32,
    },
    StripSliderMoved(f32),

    // Clock, drives the progress debounce.
    Tick(Instant),
}

/// One mutation applied to every title in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAction {
    Favorite(bool),
    AssignFolder(Option<String>),
    Delete,
    Merge {
        online_title: String,
        local_title: String,
    },
}
