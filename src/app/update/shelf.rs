use super::super::state::App;
use super::Effect;
use crate::backend::{ShelfFilter, ShelfPage, SortKey};
use crate::comic::ZoomLevel;
use tracing::{debug, info, warn};

impl App {
    /// Kick off a catalog request. Non-append loads restart from page 1 and
    /// replace the collection when they land; appends extend it.
    pub(in crate::app) fn start_shelf_load(&mut self, append: bool, effects: &mut Vec<Effect>) {
        if self.shelf.loading {
            return;
        }
        let page = if append { self.shelf.page + 1 } else { 1 };
        self.shelf.loading = true;
        effects.push(Effect::LoadShelf {
            query: self.shelf.request_for_page(page, self.config.page_size),
            append,
        });
    }

    /// Query changes invalidate both the collection and any in-progress
    /// selection.
    fn reload_shelf(&mut self, effects: &mut Vec<Effect>) {
        self.selection.exit();
        self.shelf.loading = false;
        self.start_shelf_load(false, effects);
    }

    pub(super) fn handle_filter_changed(&mut self, filter: ShelfFilter, effects: &mut Vec<Effect>) {
        if self.shelf.query.filter == filter {
            return;
        }
        info!(filter = filter.as_param(), "Shelf filter changed");
        self.shelf.query.filter = filter;
        self.reload_shelf(effects);
    }

    pub(super) fn handle_sort_changed(&mut self, key: SortKey, effects: &mut Vec<Effect>) {
        if self.shelf.query.sort_by == key {
            // Re-selecting the active key flips its order.
            self.shelf.query.sort_order = self.shelf.query.sort_order.flipped();
        } else {
            self.shelf.query.sort_by = key;
            self.shelf.query.sort_order = key.default_order();
        }
        debug!(
            sort_by = key.as_param(),
            sort_order = self.shelf.query.sort_order.as_param(),
            "Shelf sort changed"
        );
        self.reload_shelf(effects);
    }

    pub(super) fn handle_search_changed(&mut self, term: String, effects: &mut Vec<Effect>) {
        if self.shelf.query.search_term == term {
            return;
        }
        self.shelf.query.search_term = term;
        self.reload_shelf(effects);
    }

    pub(super) fn handle_zoom_changed(&mut self, zoom: ZoomLevel, effects: &mut Vec<Effect>) {
        if self.shelf.query.zoom_level != zoom {
            // Covers are picked client-side per tier, so no reload is needed.
            self.shelf.query.zoom_level = zoom;
            effects.push(Effect::RenderShelf);
        }
    }

    pub(super) fn handle_refresh_shelf(&mut self, effects: &mut Vec<Effect>) {
        self.reload_shelf(effects);
    }

    pub(super) fn handle_shelf_scrolled(
        &mut self,
        distance_to_bottom: f32,
        effects: &mut Vec<Effect>,
    ) {
        if self
            .shelf
            .wants_append(distance_to_bottom, self.config.append_threshold_px)
        {
            self.start_shelf_load(true, effects);
        }
    }

    pub(super) fn handle_shelf_page_loaded(
        &mut self,
        page: ShelfPage,
        append: bool,
        effects: &mut Vec<Effect>,
    ) {
        self.shelf.loading = false;
        let added = self.shelf.merge_page(page, append);
        info!(
            added,
            loaded = self.shelf.comics().len(),
            total = self.shelf.total_comics(),
            append,
            "Merged shelf page"
        );
        effects.push(Effect::RenderShelf);
    }

    pub(super) fn handle_shelf_load_failed(
        &mut self,
        append: bool,
        error: String,
        effects: &mut Vec<Effect>,
    ) {
        warn!(append, "Shelf load failed: {error}");
        self.shelf.loading = false;
        if append {
            // Background appends fail silently; the comics already on the
            // shelf stay up and the next scroll retries.
            return;
        }
        self.shelf.error = Some(error);
        effects.push(Effect::RenderShelf);
    }
}
