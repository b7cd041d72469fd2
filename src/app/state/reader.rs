//! Reading-session model: page list, navigation, and view-mode layout.

use crate::comic::Direction;

/// How pages are laid out in the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    Single,
    #[default]
    Double,
    LongStrip,
}

impl ViewMode {
    /// Pages advanced per navigation step.
    pub fn page_step(self) -> usize {
        match self {
            ViewMode::Double => 2,
            ViewMode::Single | ViewMode::LongStrip => 1,
        }
    }
}

/// What the render layer should draw for the current position, with page
/// indices already in visual left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    Single(usize),
    Spread { left: usize, right: usize },
    Strip,
}

/// One open reading session. Exists only between open and close.
#[derive(Debug)]
pub struct ReaderSession {
    pub(in crate::app) comic_title: String,
    pub(in crate::app) local_path: String,
    pub(in crate::app) pages: Vec<String>,
    pub(in crate::app) current_page: usize,
    pub(in crate::app) direction: Direction,
    pub(in crate::app) loading: bool,
    pub(in crate::app) error: Option<String>,
}

impl ReaderSession {
    pub fn comic_title(&self) -> &str {
        &self.comic_title
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(in crate::app) fn set_page_clamped(&mut self, page: usize) {
        let last = self.pages.len().saturating_sub(1);
        self.current_page = page.min(last);
    }

    /// Move by `delta` navigation steps. Step size follows the view mode; in
    /// double mode with rtl direction the numeric direction is inverted, so
    /// advancing visually forward walks the index backward. Returns whether
    /// the index actually changed.
    pub(in crate::app) fn apply_page_delta(&mut self, delta: i32, mode: ViewMode) -> bool {
        if self.pages.is_empty() {
            return false;
        }
        let mut step = delta as i64 * mode.page_step() as i64;
        if mode == ViewMode::Double && self.direction == Direction::Rtl {
            step = -step;
        }
        let last = (self.pages.len() - 1) as i64;
        let target = (self.current_page as i64 + step).clamp(0, last) as usize;
        let changed = target != self.current_page;
        self.current_page = target;
        changed
    }

    /// Pairing invariant for double mode: a spread starts at an even index.
    /// Called when switching into double mode.
    pub(in crate::app) fn realign_for_double(&mut self) {
        if self.current_page % 2 == 1 {
            self.current_page -= 1;
        }
    }
}

/// Scroll geometry reported by the render layer in long-strip mode.
#[derive(Debug, Default)]
pub struct StripState {
    pub(in crate::app) page_tops: Vec<f32>,
    pub(in crate::app) content_height: f32,
    pub(in crate::app) viewport_height: f32,
    pub(in crate::app) scroll_offset: f32,
    pub(in crate::app) slider_value: f32,
    // Set while a scroll was caused by the slider itself, so the resulting
    // scroll report does not echo back into a slider update.
    pub(in crate::app) slider_driven: bool,
}

impl StripState {
    pub(in crate::app) fn reset(&mut self) {
        *self = StripState::default();
    }

    pub(in crate::app) fn scrollable_distance(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    pub fn slider_value(&self) -> f32 {
        self.slider_value
    }
}

/// Reader model. The view mode outlives sessions; everything else is
/// per-session.
#[derive(Debug, Default)]
pub struct ReaderState {
    pub(in crate::app) session: Option<ReaderSession>,
    pub(in crate::app) view_mode: ViewMode,
    pub(in crate::app) strip: StripState,
    // Bumped whenever strip geometry becomes meaningless (session or mode
    // change); measurements carrying a stale epoch are dropped.
    pub(in crate::app) strip_epoch: u64,
}

impl ReaderState {
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ReaderSession> {
        self.session.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn strip_epoch(&self) -> u64 {
        self.strip_epoch
    }

    pub(in crate::app) fn invalidate_strip(&mut self) {
        self.strip_epoch = self.strip_epoch.wrapping_add(1);
        self.strip.reset();
    }

    /// Layout for the current position, or `None` while no session is open
    /// or the page list has not arrived yet.
    pub fn layout(&self) -> Option<PageLayout> {
        let session = self.session.as_ref()?;
        if session.pages.is_empty() {
            return None;
        }
        let current = session.current_page;
        Some(match self.view_mode {
            ViewMode::LongStrip => PageLayout::Strip,
            ViewMode::Single => PageLayout::Single(current),
            ViewMode::Double => {
                if current + 1 < session.pages.len() {
                    match session.direction {
                        Direction::Ltr => PageLayout::Spread {
                            left: current,
                            right: current + 1,
                        },
                        Direction::Rtl => PageLayout::Spread {
                            left: current + 1,
                            right: current,
                        },
                    }
                } else {
                    PageLayout::Single(current)
                }
            }
        })
    }
}
