//! Comic catalog model.
//!
//! These shapes mirror what the backend serves from `/api/comics`. The title
//! is the stable unique key; everything else is mutable metadata. A comic is
//! only valid with at least one source, which the backend guarantees at scan
//! time and the loader re-checks when opening a reader.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reading direction for a comic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Ltr => Direction::Rtl,
            Direction::Rtl => Direction::Ltr,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// Shelf card zoom level; also decides which cover tier to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    Small,
    #[default]
    Medium,
    Large,
}

/// Where a comic's content lives. A comic carries one or both.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComicSource {
    Local { path: String },
    Online { url: String },
}

/// Pre-rendered cover tiers the backend keeps for local comics.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CoverPaths {
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Comic {
    pub title: String,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub sources: Vec<ComicSource>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub source_tags: Vec<String>,
    #[serde(default)]
    pub added_tags: Vec<String>,
    #[serde(default)]
    pub removed_tags: Vec<String>,
    #[serde(default, rename = "currentPage")]
    pub current_page: usize,
    #[serde(default, rename = "totalPages")]
    pub total_pages: usize,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub date_added: Option<u64>,
    #[serde(default)]
    pub cover_paths_local: Option<CoverPaths>,
    #[serde(default)]
    pub cover_url_online: Option<String>,
}

impl Comic {
    /// Name shown on the shelf; falls back to the stable title.
    pub fn shelf_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.title)
    }

    pub fn local_path(&self) -> Option<&str> {
        self.sources.iter().find_map(|source| match source {
            ComicSource::Local { path } => Some(path.as_str()),
            ComicSource::Online { .. } => None,
        })
    }

    pub fn online_url(&self) -> Option<&str> {
        self.sources.iter().find_map(|source| match source {
            ComicSource::Online { url } => Some(url.as_str()),
            ComicSource::Local { .. } => None,
        })
    }

    /// Effective tag set: (source ∪ added) − removed, deduplicated and sorted.
    pub fn final_tags(&self) -> Vec<String> {
        let removed: BTreeSet<&str> = self.removed_tags.iter().map(String::as_str).collect();
        let mut tags: BTreeSet<&str> = BTreeSet::new();
        for tag in self.source_tags.iter().chain(self.added_tags.iter()) {
            if !removed.contains(tag.as_str()) {
                tags.insert(tag);
            }
        }
        tags.into_iter().map(str::to_string).collect()
    }

    /// Cover to show at the given zoom, preferring local tiers and degrading
    /// to smaller ones before falling back to the online URL.
    pub fn cover_for_zoom(&self, zoom: ZoomLevel) -> Option<&str> {
        if let Some(covers) = &self.cover_paths_local {
            let tiered = match zoom {
                ZoomLevel::Small => covers.thumbnail.as_deref(),
                ZoomLevel::Medium => covers.medium.as_deref().or(covers.thumbnail.as_deref()),
                ZoomLevel::Large => covers
                    .large
                    .as_deref()
                    .or(covers.medium.as_deref())
                    .or(covers.thumbnail.as_deref()),
            };
            if tiered.is_some() {
                return tiered;
            }
        }
        self.cover_url_online.as_deref()
    }
}
