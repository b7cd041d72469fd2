//! Catalog backend contract and its HTTP implementation.
//!
//! The core never talks to the network directly; everything flows through
//! [`CatalogBackend`] so the reducer and runtime can be exercised against an
//! in-memory fake. [`HttpBackend`] is the real thing: a thin
//! `reqwest::blocking` client over the backend's JSON API. Any non-success
//! response is collapsed into [`BackendError::Request`] carrying the
//! backend's human-readable message; transport-level failures become
//! [`BackendError::Network`].

use crate::comic::{Comic, Direction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure; no response was received.
    #[error("network failure: {0}")]
    Network(String),
    /// The backend answered with a non-success status and a message.
    #[error("{0}")]
    Request(String),
}

/// Built-in shelf filters plus user-defined folders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ShelfFilter {
    #[default]
    All,
    Favorites,
    Web,
    Downloaded,
    Undownloaded,
    Folder(String),
}

impl ShelfFilter {
    pub fn as_param(&self) -> &str {
        match self {
            ShelfFilter::All => "all",
            ShelfFilter::Favorites => "favorites",
            ShelfFilter::Web => "web",
            ShelfFilter::Downloaded => "downloaded",
            ShelfFilter::Undownloaded => "undownloaded",
            ShelfFilter::Folder(name) => name,
        }
    }

    pub fn folder_name(&self) -> Option<&str> {
        match self {
            ShelfFilter::Folder(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    Name,
    #[default]
    Date,
}

impl SortKey {
    pub fn as_param(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Date => "date",
        }
    }

    /// Order used when this key is first selected.
    pub fn default_order(self) -> SortOrder {
        match self {
            SortKey::Name => SortOrder::Asc,
            SortKey::Date => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// One catalog request: pagination plus the current shelf state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfQuery {
    pub page: usize,
    pub limit: usize,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub filter: ShelfFilter,
    pub search: String,
}

/// One page of catalog results.
#[derive(Debug, Clone, Deserialize)]
pub struct ShelfPage {
    pub comics: Vec<Comic>,
    pub page: usize,
    pub total_comics: usize,
}

/// Everything the core needs from the backend, one method per endpoint.
pub trait CatalogBackend {
    fn list_comics(&self, query: &ShelfQuery) -> Result<ShelfPage, BackendError>;
    fn comic_pages(&self, path: &str) -> Result<Vec<String>, BackendError>;
    fn save_progress(
        &self,
        path: &str,
        page: usize,
        direction: Direction,
    ) -> Result<(), BackendError>;
    fn set_favorite(&self, titles: &[String], favorite: bool) -> Result<(), BackendError>;
    fn assign_folder(&self, titles: &[String], folder: Option<&str>) -> Result<(), BackendError>;
    fn delete_comics(&self, titles: &[String]) -> Result<(), BackendError>;
    fn merge_comics(&self, online_title: &str, local_title: &str) -> Result<(), BackendError>;
}

/// Blocking HTTP client for the catalog API.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct ProgressBody<'a> {
    path: &'a str,
    page: usize,
    direction: &'a str,
}

#[derive(Serialize)]
struct FavoriteBody<'a> {
    titles: &'a [String],
    favorite: bool,
}

#[derive(Serialize)]
struct FolderBody<'a> {
    titles: &'a [String],
    folder: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    titles: &'a [String],
}

#[derive(Serialize)]
struct MergeBody<'a> {
    online_comic_title: &'a str,
    local_comic_title: &'a str,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| BackendError::Network(err.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        response: Result<reqwest::blocking::Response, reqwest::Error>,
    ) -> Result<T, BackendError> {
        let response = response.map_err(|err| BackendError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("backend returned status {status}"));
            return Err(BackendError::Request(message));
        }
        response
            .json::<T>()
            .map_err(|err| BackendError::Request(format!("malformed backend response: {err}")))
    }

    fn read_ack(
        response: Result<reqwest::blocking::Response, reqwest::Error>,
    ) -> Result<(), BackendError> {
        let response = response.map_err(|err| BackendError::Network(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("backend returned status {status}"));
        Err(BackendError::Request(message))
    }
}

impl CatalogBackend for HttpBackend {
    fn list_comics(&self, query: &ShelfQuery) -> Result<ShelfPage, BackendError> {
        let request = self
            .client
            .get(self.url("/api/comics"))
            .query(&[
                ("page", query.page.to_string()),
                ("limit", query.limit.to_string()),
                ("sort_by", query.sort_by.as_param().to_string()),
                ("sort_order", query.sort_order.as_param().to_string()),
                ("filter", query.filter.as_param().to_string()),
                ("search", query.search.clone()),
            ])
            .send();
        Self::read_json(request)
    }

    fn comic_pages(&self, path: &str) -> Result<Vec<String>, BackendError> {
        let request = self
            .client
            .get(self.url("/api/comic/pages"))
            .query(&[("path", path)])
            .send();
        Self::read_json(request)
    }

    fn save_progress(
        &self,
        path: &str,
        page: usize,
        direction: Direction,
    ) -> Result<(), BackendError> {
        let body = ProgressBody {
            path,
            page,
            direction: direction.as_param(),
        };
        Self::read_ack(
            self.client
                .post(self.url("/api/comic/progress"))
                .json(&body)
                .send(),
        )
    }

    fn set_favorite(&self, titles: &[String], favorite: bool) -> Result<(), BackendError> {
        let body = FavoriteBody { titles, favorite };
        Self::read_ack(
            self.client
                .post(self.url("/api/comics/favorite"))
                .json(&body)
                .send(),
        )
    }

    fn assign_folder(&self, titles: &[String], folder: Option<&str>) -> Result<(), BackendError> {
        let body = FolderBody { titles, folder };
        Self::read_ack(
            self.client
                .post(self.url("/api/comics/folder"))
                .json(&body)
                .send(),
        )
    }

    fn delete_comics(&self, titles: &[String]) -> Result<(), BackendError> {
        let body = DeleteBody { titles };
        Self::read_ack(
            self.client
                .post(self.url("/api/comics/delete_full"))
                .json(&body)
                .send(),
        )
    }

    fn merge_comics(&self, online_title: &str, local_title: &str) -> Result<(), BackendError> {
        let body = MergeBody {
            online_comic_title: online_title,
            local_comic_title: local_title,
        };
        Self::read_ack(
            self.client
                .post(self.url("/api/comics/merge"))
                .json(&body)
                .send(),
        )
    }
}
