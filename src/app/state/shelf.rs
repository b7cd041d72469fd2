//! Shelf model: the current query plus the loaded comic collection.

use crate::backend::{ShelfFilter, ShelfPage, ShelfQuery, SortKey, SortOrder};
use crate::comic::{Comic, ZoomLevel};
use std::collections::HashSet;

/// Query half of the shelf: mutating any field invalidates the collection
/// and forces a reload from page 1.
#[derive(Debug, Clone, Default)]
pub struct ShelfQueryState {
    pub(in crate::app) filter: ShelfFilter,
    pub(in crate::app) sort_by: SortKey,
    pub(in crate::app) sort_order: SortOrder,
    pub(in crate::app) search_term: String,
    pub(in crate::app) zoom_level: ZoomLevel,
}

/// Loaded collection built from successive catalog pages.
///
/// Invariant: no two comics share a title. The merge enforces this, not the
/// backend — overlapping pages caused by concurrent catalog mutation during
/// scroll are expected and deduplicated here.
pub struct ShelfState {
    pub(in crate::app) query: ShelfQueryState,
    comics: Vec<Comic>,
    titles: HashSet<String>,
    pub(in crate::app) page: usize,
    pub(in crate::app) total_comics: usize,
    pub(in crate::app) has_more: bool,
    pub(in crate::app) loading: bool,
    pub(in crate::app) error: Option<String>,
}

impl ShelfState {
    pub(in crate::app) fn new(zoom_level: ZoomLevel) -> Self {
        Self {
            query: ShelfQueryState {
                zoom_level,
                ..ShelfQueryState::default()
            },
            comics: Vec::new(),
            titles: HashSet::new(),
            page: 1,
            total_comics: 0,
            has_more: true,
            loading: false,
            error: None,
        }
    }

    /// Build the catalog request for the given page.
    pub(in crate::app) fn request_for_page(&self, page: usize, limit: usize) -> ShelfQuery {
        ShelfQuery {
            page,
            limit,
            sort_by: self.query.sort_by,
            sort_order: self.query.sort_order,
            filter: self.query.filter.clone(),
            search: self.query.search_term.clone(),
        }
    }

    /// Merge one backend page into the collection.
    ///
    /// A non-append merge replaces the collection wholesale; an append keeps
    /// only comics whose title is not already present, preserving the
    /// backend-provided order. Returns how many comics were actually added.
    pub(in crate::app) fn merge_page(&mut self, response: ShelfPage, append: bool) -> usize {
        if !append {
            self.comics.clear();
            self.titles.clear();
        }

        let mut added = 0;
        for comic in response.comics {
            if self.titles.insert(comic.title.clone()) {
                self.comics.push(comic);
                added += 1;
            }
        }

        self.page = response.page;
        self.total_comics = response.total_comics;
        self.has_more = self.comics.len() < response.total_comics;
        self.error = None;
        added
    }

    pub fn comics(&self) -> &[Comic] {
        &self.comics
    }

    pub fn comic(&self, title: &str) -> Option<&Comic> {
        self.comics.iter().find(|comic| comic.title == title)
    }

    pub(in crate::app) fn comic_mut(&mut self, title: &str) -> Option<&mut Comic> {
        self.comics.iter_mut().find(|comic| comic.title == title)
    }

    /// Titles currently rendered, in shelf order.
    pub fn visible_titles(&self) -> Vec<String> {
        self.comics.iter().map(|comic| comic.title.clone()).collect()
    }

    pub(in crate::app) fn remove_titles(&mut self, titles: &[String]) {
        let doomed: HashSet<&str> = titles.iter().map(String::as_str).collect();
        self.comics.retain(|comic| !doomed.contains(comic.title.as_str()));
        for title in titles {
            self.titles.remove(title);
        }
        self.total_comics = self.total_comics.saturating_sub(titles.len());
        self.has_more = self.comics.len() < self.total_comics;
    }

    /// Append-trigger contract for the render layer: load more only when the
    /// scroll position is near the bottom, more pages exist, and nothing is
    /// already in flight.
    pub fn wants_append(&self, distance_to_bottom: f32, threshold_px: f32) -> bool {
        self.has_more && !self.loading && distance_to_bottom <= threshold_px
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn total_comics(&self) -> usize {
        self.total_comics
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn zoom_level(&self) -> ZoomLevel {
        self.query.zoom_level
    }

    pub fn filter(&self) -> &ShelfFilter {
        &self.query.filter
    }
}
