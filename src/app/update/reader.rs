use super::super::state::{App, ReaderSession, ViewMode};
use super::Effect;
use crate::progress::ProgressWrite;
use crate::strip;
use std::time::Instant;
use tracing::{debug, info, warn};

impl App {
    /// Open a reading session. Only comics with a local copy are readable;
    /// everything else surfaces as a shelf error.
    pub(super) fn handle_open_reader(&mut self, title: String, effects: &mut Vec<Effect>) {
        let Some(comic) = self.shelf.comic(&title) else {
            warn!(%title, "Open requested for a comic not on the shelf");
            return;
        };
        let Some(path) = comic.local_path() else {
            self.shelf.error = Some(format!("\"{}\" has no local copy to read", comic.shelf_name()));
            effects.push(Effect::RenderShelf);
            return;
        };

        let session = ReaderSession {
            comic_title: comic.title.clone(),
            local_path: path.to_string(),
            pages: Vec::new(),
            // Saved progress; clamped once the page list arrives.
            current_page: comic.current_page,
            direction: comic.direction.unwrap_or_default(),
            loading: true,
            error: None,
        };
        info!(%title, path, resume_page = session.current_page, "Opening reader");

        let fetch = Effect::FetchPageList {
            title: session.comic_title.clone(),
            path: session.local_path.clone(),
        };
        self.reader.session = Some(session);
        self.reader.invalidate_strip();
        effects.push(fetch);
        effects.push(Effect::RenderReader);
    }

    pub(super) fn handle_page_list_loaded(
        &mut self,
        title: String,
        pages: Vec<String>,
        effects: &mut Vec<Effect>,
    ) {
        let Some(session) = self.reader.session.as_mut() else {
            return;
        };
        if session.comic_title != title {
            debug!(%title, "Dropping page list for a closed session");
            return;
        }
        session.pages = pages;
        session.loading = false;
        session.set_page_clamped(session.current_page);
        info!(
            %title,
            pages = session.pages.len(),
            page = session.current_page,
            "Reader session ready"
        );
        effects.push(Effect::RenderReader);
    }

    pub(super) fn handle_page_list_failed(
        &mut self,
        title: String,
        error: String,
        effects: &mut Vec<Effect>,
    ) {
        let Some(session) = self.reader.session.as_mut() else {
            return;
        };
        if session.comic_title != title {
            return;
        }
        warn!(%title, "Page list fetch failed: {error}");
        session.loading = false;
        session.error = Some(error);
        effects.push(Effect::RenderReader);
    }

    /// Navigation; the one operation that schedules progress persistence.
    pub(super) fn handle_change_page(&mut self, delta: i32, effects: &mut Vec<Effect>) {
        let mode = self.reader.view_mode;
        let Some(session) = self.reader.session.as_mut() else {
            return;
        };
        if session.loading || !session.apply_page_delta(delta, mode) {
            return;
        }
        let write = ProgressWrite {
            path: session.local_path.clone(),
            page: session.current_page,
            direction: session.direction,
        };
        self.persister.schedule(write, Instant::now());
        effects.push(Effect::RenderReader);
    }

    pub(super) fn handle_jump_to_page(&mut self, page: usize, effects: &mut Vec<Effect>) {
        if self.reader.view_mode == ViewMode::LongStrip {
            // Position is scroll-derived in strip mode; jumps come from the
            // slider instead.
            return;
        }
        let Some(session) = self.reader.session.as_mut() else {
            return;
        };
        if session.loading {
            return;
        }
        let before = session.current_page;
        session.set_page_clamped(page);
        if session.current_page != before {
            let write = ProgressWrite {
                path: session.local_path.clone(),
                page: session.current_page,
                direction: session.direction,
            };
            self.persister.schedule(write, Instant::now());
        }
        effects.push(Effect::RenderReader);
    }

    pub(super) fn handle_change_view_mode(&mut self, mode: ViewMode, effects: &mut Vec<Effect>) {
        if self.reader.view_mode == mode || self.reader.session.is_none() {
            return;
        }
        self.reader.view_mode = mode;
        if mode == ViewMode::Double {
            if let Some(session) = self.reader.session.as_mut() {
                session.realign_for_double();
            }
        }
        // Any previously measured strip geometry belongs to the old layout.
        self.reader.invalidate_strip();
        debug!(?mode, "View mode changed");
        effects.push(Effect::RenderReader);
    }

    pub(super) fn handle_toggle_direction(&mut self, effects: &mut Vec<Effect>) {
        if let Some(session) = self.reader.session.as_mut() {
            session.direction = session.direction.flipped();
            debug!(direction = session.direction.as_param(), "Direction changed");
            effects.push(Effect::RenderReader);
        }
    }

    /// Close the session, flushing final progress immediately. The shelf's
    /// copy of the comic is updated so the card shows the new position
    /// without a reload.
    pub(super) fn handle_close_reader(&mut self, effects: &mut Vec<Effect>) {
        let Some(session) = self.reader.session.take() else {
            return;
        };
        // The final write supersedes whatever the debounce was holding.
        self.persister.cancel();
        self.reader.invalidate_strip();

        if let Some(comic) = self.shelf.comic_mut(&session.comic_title) {
            comic.current_page = session.current_page;
            comic.direction = Some(session.direction);
            if !session.pages.is_empty() {
                comic.total_pages = session.pages.len();
            }
        }
        info!(
            title = %session.comic_title,
            page = session.current_page,
            "Closed reader session"
        );

        if !session.pages.is_empty() {
            effects.push(Effect::SaveProgress {
                path: session.local_path,
                page: session.current_page,
                direction: session.direction,
            });
        }
        effects.push(Effect::RenderShelf);
    }

    pub(super) fn handle_strip_measured(
        &mut self,
        epoch: u64,
        page_tops: Vec<f32>,
        content_height: f32,
        viewport_height: f32,
        effects: &mut Vec<Effect>,
    ) {
        if epoch != self.reader.strip_epoch {
            debug!(epoch, current = self.reader.strip_epoch, "Dropping stale strip measurement");
            return;
        }
        let Some(session) = self.reader.session.as_ref() else {
            return;
        };
        let target = page_tops
            .get(session.current_page)
            .copied()
            .unwrap_or(0.0);

        let strip = &mut self.reader.strip;
        strip.page_tops = page_tops;
        strip.content_height = content_height;
        strip.viewport_height = viewport_height;

        // Land the viewport on the page the session was already at.
        strip.scroll_offset = target;
        strip.slider_value = strip::slider_value_for_scroll(target, strip.scrollable_distance());
        effects.push(Effect::ScrollStripTo { offset: target });
        effects.push(Effect::SyncSlider {
            value: strip.slider_value,
        });
    }

    /// Scroll report from the render layer. The current page is derived from
    /// the viewport midpoint, and a derived change persists like navigation.
    pub(super) fn handle_strip_scrolled(
        &mut self,
        epoch: u64,
        offset: f32,
        effects: &mut Vec<Effect>,
    ) {
        if epoch != self.reader.strip_epoch || self.reader.view_mode != ViewMode::LongStrip {
            return;
        }
        let Some(session) = self.reader.session.as_mut() else {
            return;
        };
        let strip = &mut self.reader.strip;
        strip.scroll_offset = offset;

        let derived = strip::page_index_for_scroll_offset(
            &strip.page_tops,
            strip.content_height,
            offset,
            strip.viewport_height,
        );
        if !strip.page_tops.is_empty() && derived != session.current_page {
            session.current_page = derived;
            let write = ProgressWrite {
                path: session.local_path.clone(),
                page: derived,
                direction: session.direction,
            };
            self.persister.schedule(write, Instant::now());
            effects.push(Effect::RenderReader);
        }

        if strip.slider_driven {
            // This scroll is the echo of a slider move; do not bounce it back.
            strip.slider_driven = false;
        } else {
            strip.slider_value =
                strip::slider_value_for_scroll(offset, strip.scrollable_distance());
            effects.push(Effect::SyncSlider {
                value: strip.slider_value,
            });
        }
    }

    pub(super) fn handle_strip_slider_moved(&mut self, value: f32, effects: &mut Vec<Effect>) {
        if self.reader.view_mode != ViewMode::LongStrip || self.reader.session.is_none() {
            return;
        }
        let strip = &mut self.reader.strip;
        strip.slider_value = value.clamp(0.0, strip::STRIP_SLIDER_MAX);
        strip.slider_driven = true;
        let offset = strip::scroll_offset_for_slider(value, strip.scrollable_distance());
        effects.push(Effect::ScrollStripTo { offset });
    }
}
