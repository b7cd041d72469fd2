//! Effect runtime: the single place where reducer output meets the backend.
//!
//! Backend-bound effects are executed synchronously and their outcome is fed
//! back into the reducer as a follow-up message, in order, until the system
//! settles. Render and scroll effects are passed through untouched for the
//! shell to act on.

use std::collections::VecDeque;

use super::super::messages::{BatchAction, Message};
use super::super::state::App;
use super::Effect;
use crate::backend::CatalogBackend;
use tracing::warn;

/// Execute one backend-bound effect, returning any follow-up message.
/// Shell-facing effects produce nothing here.
pub fn run_effect(effect: Effect, backend: &dyn CatalogBackend) -> Option<Message> {
    match effect {
        Effect::LoadShelf { query, append } => match backend.list_comics(&query) {
            Ok(page) => Some(Message::ShelfPageLoaded { page, append }),
            Err(err) => Some(Message::ShelfLoadFailed {
                append,
                error: err.to_string(),
            }),
        },
        Effect::FetchPageList { title, path } => match backend.comic_pages(&path) {
            Ok(pages) => Some(Message::PageListLoaded { title, pages }),
            Err(err) => Some(Message::PageListFailed {
                title,
                error: err.to_string(),
            }),
        },
        Effect::SaveProgress {
            path,
            page,
            direction,
        } => {
            // Progress writes are fire-and-forget; a lost write costs at most
            // one resume position.
            if let Err(err) = backend.save_progress(&path, page, direction) {
                warn!(%path, page, "Progress write failed: {err}");
            }
            None
        }
        Effect::RunBatch { action, titles } => {
            let result = match &action {
                BatchAction::Favorite(favorite) => backend.set_favorite(&titles, *favorite),
                BatchAction::AssignFolder(folder) => {
                    backend.assign_folder(&titles, folder.as_deref())
                }
                BatchAction::Delete => backend.delete_comics(&titles),
                BatchAction::Merge {
                    online_title,
                    local_title,
                } => backend.merge_comics(online_title, local_title),
            };
            match result {
                Ok(()) => Some(Message::BatchCompleted { action, titles }),
                Err(err) => Some(Message::BatchFailed {
                    error: err.to_string(),
                }),
            }
        }
        Effect::RenderShelf
        | Effect::RenderReader
        | Effect::ScrollStripTo { .. }
        | Effect::SyncSlider { .. } => None,
    }
}

/// Run a batch of effects to completion, reducing follow-up messages in the
/// order they were produced. Returns the shell-facing effects.
pub fn settle(app: &mut App, backend: &dyn CatalogBackend, effects: Vec<Effect>) -> Vec<Effect> {
    let mut shell_effects = Vec::new();
    let mut pending: VecDeque<Effect> = effects.into();

    while let Some(effect) = pending.pop_front() {
        match effect {
            Effect::RenderShelf
            | Effect::RenderReader
            | Effect::ScrollStripTo { .. }
            | Effect::SyncSlider { .. } => shell_effects.push(effect),
            other => {
                if let Some(follow_up) = run_effect(other, backend) {
                    for next in app.reduce(follow_up) {
                        pending.push_back(next);
                    }
                }
            }
        }
    }

    shell_effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ShelfPage, ShelfQuery, SortKey};
    use crate::comic::{Comic, ComicSource, Direction};
    use crate::config::AppConfig;
    use crate::progress::PROGRESS_DEBOUNCE;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::time::{Duration, Instant};

    /// In-memory catalog standing in for the HTTP backend.
    #[derive(Default)]
    struct FakeBackend {
        comics: RefCell<Vec<Comic>>,
        pages_by_path: HashMap<String, Vec<String>>,
        saves: RefCell<Vec<(String, usize, Direction)>>,
        mutations: RefCell<Vec<String>>,
        fail_listing: Cell<bool>,
    }

    impl FakeBackend {
        fn with_comics(comics: Vec<Comic>) -> Self {
            Self {
                comics: RefCell::new(comics),
                ..Self::default()
            }
        }
    }

    impl CatalogBackend for FakeBackend {
        fn list_comics(&self, query: &ShelfQuery) -> Result<ShelfPage, BackendError> {
            if self.fail_listing.get() {
                return Err(BackendError::Network("connection refused".into()));
            }
            let comics = self.comics.borrow();
            let start = (query.page - 1) * query.limit;
            let slice: Vec<Comic> = comics.iter().skip(start).take(query.limit).cloned().collect();
            Ok(ShelfPage {
                comics: slice,
                page: query.page,
                total_comics: comics.len(),
            })
        }

        fn comic_pages(&self, path: &str) -> Result<Vec<String>, BackendError> {
            self.pages_by_path
                .get(path)
                .cloned()
                .ok_or_else(|| BackendError::Request(format!("unknown comic path {path}")))
        }

        fn save_progress(
            &self,
            path: &str,
            page: usize,
            direction: Direction,
        ) -> Result<(), BackendError> {
            self.saves
                .borrow_mut()
                .push((path.to_string(), page, direction));
            Ok(())
        }

        fn set_favorite(&self, titles: &[String], favorite: bool) -> Result<(), BackendError> {
            self.mutations
                .borrow_mut()
                .push(format!("favorite:{favorite}:{}", titles.join(",")));
            Ok(())
        }

        fn assign_folder(
            &self,
            titles: &[String],
            folder: Option<&str>,
        ) -> Result<(), BackendError> {
            self.mutations
                .borrow_mut()
                .push(format!("folder:{}:{}", folder.unwrap_or("-"), titles.join(",")));
            Ok(())
        }

        fn delete_comics(&self, titles: &[String]) -> Result<(), BackendError> {
            self.comics
                .borrow_mut()
                .retain(|comic| !titles.contains(&comic.title));
            self.mutations
                .borrow_mut()
                .push(format!("delete:{}", titles.join(",")));
            Ok(())
        }

        fn merge_comics(&self, online_title: &str, local_title: &str) -> Result<(), BackendError> {
            self.comics
                .borrow_mut()
                .retain(|comic| comic.title != online_title);
            self.mutations
                .borrow_mut()
                .push(format!("merge:{online_title}->{local_title}"));
            Ok(())
        }
    }

    fn local_comic(title: &str) -> Comic {
        Comic {
            title: title.to_string(),
            display_name: None,
            sources: vec![ComicSource::Local {
                path: format!("/library/{title}"),
            }],
            is_favorite: false,
            folder: None,
            source_tags: Vec::new(),
            added_tags: Vec::new(),
            removed_tags: Vec::new(),
            current_page: 0,
            total_pages: 0,
            direction: None,
            date_added: None,
            cover_paths_local: None,
            cover_url_online: None,
        }
    }

    fn online_comic(title: &str) -> Comic {
        Comic {
            sources: vec![ComicSource::Online {
                url: format!("http://example/{title}"),
            }],
            ..local_comic(title)
        }
    }

    /// Feed one message through the reducer and settle everything it causes.
    fn drive(app: &mut App, backend: &dyn CatalogBackend, message: Message) -> Vec<Effect> {
        let effects = app.reduce(message);
        settle(app, backend, effects)
    }

    fn boot(backend: &FakeBackend, page_size: usize) -> App {
        let config = AppConfig {
            page_size,
            ..AppConfig::default()
        };
        let (mut app, effects) = App::bootstrap(config);
        settle(&mut app, backend, effects);
        app
    }

    #[test]
    fn bootstrap_loads_the_first_shelf_page() {
        let backend = FakeBackend::with_comics((0..5).map(|i| local_comic(&format!("c{i}"))).collect());
        let app = boot(&backend, 3);
        assert_eq!(app.shelf().comics().len(), 3);
        assert!(app.shelf().has_more());
        assert_eq!(app.shelf().total_comics(), 5);
    }

    #[test]
    fn scrolling_near_the_bottom_appends_the_next_page() {
        let backend = FakeBackend::with_comics((0..5).map(|i| local_comic(&format!("c{i}"))).collect());
        let mut app = boot(&backend, 3);

        drive(&mut app, &backend, Message::ShelfScrolled { distance_to_bottom: 100.0 });
        assert_eq!(app.shelf().comics().len(), 5);
        assert!(!app.shelf().has_more());

        // Far from the bottom: nothing happens.
        drive(&mut app, &backend, Message::ShelfScrolled { distance_to_bottom: 5000.0 });
        assert_eq!(app.shelf().comics().len(), 5);
    }

    #[test]
    fn overlapping_append_deduplicates_by_title() {
        // A comic inserted at the front between page loads shifts page 2 so
        // that it re-serves the tail of page 1.
        let backend = FakeBackend::with_comics((0..60).map(|i| local_comic(&format!("c{i:02}"))).collect());
        let mut app = boot(&backend, 30);
        assert_eq!(app.shelf().comics().len(), 30);

        backend.comics.borrow_mut().insert(0, local_comic("brand-new"));
        drive(&mut app, &backend, Message::ShelfScrolled { distance_to_bottom: 0.0 });

        // Page 2 now starts at c29, which the shelf already has.
        assert_eq!(app.shelf().comics().len(), 59);
        assert!(app.shelf().has_more(), "brand-new is still unloaded");
    }

    #[test]
    fn append_failure_is_silent_and_keeps_loaded_comics() {
        let backend = FakeBackend::with_comics((0..5).map(|i| local_comic(&format!("c{i}"))).collect());
        let mut app = boot(&backend, 3);

        backend.fail_listing.set(true);
        drive(&mut app, &backend, Message::ShelfScrolled { distance_to_bottom: 0.0 });

        assert_eq!(app.shelf().comics().len(), 3, "append failure keeps the shelf");
        assert!(app.shelf().error().is_none(), "background failure only logs");
        assert!(!app.shelf().is_loading());

        // The next scroll retries once the backend recovers.
        backend.fail_listing.set(false);
        drive(&mut app, &backend, Message::ShelfScrolled { distance_to_bottom: 0.0 });
        assert_eq!(app.shelf().comics().len(), 5);
    }

    #[test]
    fn first_page_failure_surfaces_a_shelf_error() {
        let backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.fail_listing.set(true);
        let app = boot(&backend, 3);

        assert!(app.shelf().comics().is_empty());
        assert!(app.shelf().error().is_some());
        assert!(!app.shelf().is_loading());
    }

    #[test]
    fn changing_the_filter_exits_selection_mode() {
        let backend = FakeBackend::with_comics(vec![local_comic("a"), local_comic("b")]);
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::ToggleSelectionMode);
        drive(&mut app, &backend, Message::ToggleSelected("a".into()));
        assert_eq!(app.selection().count(), 1);

        drive(
            &mut app,
            &backend,
            Message::FilterChanged(crate::backend::ShelfFilter::Favorites),
        );
        assert!(!app.selection().is_active());
        assert_eq!(app.selection().count(), 0);
    }

    #[test]
    fn reselecting_the_sort_key_flips_the_order() {
        let backend = FakeBackend::with_comics(vec![local_comic("a")]);
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::SortChanged(SortKey::Name));
        drive(&mut app, &backend, Message::SortChanged(SortKey::Name));
        // Name starts ascending; the second selection flips it.
        let query = app.shelf().request_for_page(1, 30);
        assert_eq!(query.sort_order.as_param(), "desc");
    }

    #[test]
    fn batch_favorite_updates_local_copies_and_exits_selection() {
        let backend = FakeBackend::with_comics(vec![local_comic("a"), local_comic("b")]);
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::ToggleSelectionMode);
        drive(&mut app, &backend, Message::ToggleSelectAll);
        drive(&mut app, &backend, Message::BatchFavorite(true));

        assert_eq!(backend.mutations.borrow().as_slice(), ["favorite:true:a,b"]);
        assert!(app.shelf().comics().iter().all(|c| c.is_favorite));
        assert!(!app.selection().is_active());
    }

    #[test]
    fn empty_selection_batches_never_reach_the_backend() {
        let backend = FakeBackend::with_comics(vec![local_comic("a")]);
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::ToggleSelectionMode);
        drive(&mut app, &backend, Message::BatchDelete);
        assert!(backend.mutations.borrow().is_empty());
        assert_eq!(app.shelf().comics().len(), 1);
    }

    #[test]
    fn batch_delete_removes_titles_from_the_shelf() {
        let backend =
            FakeBackend::with_comics(vec![local_comic("a"), local_comic("b"), local_comic("c")]);
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::ToggleSelectionMode);
        drive(&mut app, &backend, Message::ToggleSelected("b".into()));
        drive(&mut app, &backend, Message::BatchDelete);

        assert_eq!(app.shelf().visible_titles(), vec!["a", "c"]);
        assert_eq!(app.shelf().total_comics(), 2);
    }

    #[test]
    fn merge_requires_one_local_and_one_online_comic() {
        let backend = FakeBackend::with_comics(vec![
            local_comic("local"),
            online_comic("online"),
            local_comic("other"),
        ]);
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::ToggleSelectionMode);
        drive(&mut app, &backend, Message::ToggleSelected("local".into()));
        drive(&mut app, &backend, Message::MergeSelected);
        assert!(app.shelf().error().is_some(), "one selection is rejected");
        assert!(backend.mutations.borrow().is_empty());

        drive(&mut app, &backend, Message::ToggleSelected("online".into()));
        drive(&mut app, &backend, Message::MergeSelected);
        assert_eq!(
            backend.mutations.borrow().as_slice(),
            ["merge:online->local"]
        );
        // The merged-away entry is gone after the reload.
        assert_eq!(app.shelf().visible_titles(), vec!["local", "other"]);
    }

    #[test]
    fn opening_an_online_only_comic_is_rejected() {
        let backend = FakeBackend::with_comics(vec![online_comic("web")]);
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::OpenReader("web".into()));
        assert!(!app.reader().is_open());
        assert!(app.shelf().error().is_some());
    }

    #[test]
    fn opening_resumes_at_saved_progress_clamped_to_the_page_list() {
        let mut comic = local_comic("a");
        comic.current_page = 40;
        let mut backend = FakeBackend::with_comics(vec![comic]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..10).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);

        drive(&mut app, &backend, Message::OpenReader("a".into()));
        let session = app.reader().session().expect("session open");
        assert_eq!(session.pages().len(), 10);
        assert_eq!(session.current_page(), 9, "saved page beyond the end clamps");
    }

    #[test]
    fn rapid_page_turns_collapse_into_one_debounced_write() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..20).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));
        drive(&mut app, &backend, Message::ChangeViewMode(crate::app::state::ViewMode::Single));

        for _ in 0..5 {
            drive(&mut app, &backend, Message::ChangePage(1));
        }
        assert!(backend.saves.borrow().is_empty(), "nothing flushes mid-burst");
        assert!(app.has_pending_progress());

        // A tick inside the quiet period releases nothing.
        drive(&mut app, &backend, Message::Tick(Instant::now()));
        assert!(backend.saves.borrow().is_empty());

        let later = Instant::now() + PROGRESS_DEBOUNCE + Duration::from_millis(50);
        drive(&mut app, &backend, Message::Tick(later));
        assert_eq!(
            backend.saves.borrow().as_slice(),
            [("/library/a".to_string(), 5, Direction::Ltr)]
        );
    }

    #[test]
    fn closing_flushes_immediately_and_updates_the_shelf_copy() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..20).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));
        drive(&mut app, &backend, Message::ChangePage(1));
        drive(&mut app, &backend, Message::ToggleDirection);
        drive(&mut app, &backend, Message::CloseReader);

        assert!(!app.reader().is_open());
        assert_eq!(
            backend.saves.borrow().as_slice(),
            [("/library/a".to_string(), 2, Direction::Rtl)],
            "close bypasses the debounce exactly once"
        );
        let comic = app.shelf().comic("a").expect("still shelved");
        assert_eq!(comic.current_page, 2);
        assert_eq!(comic.direction, Some(Direction::Rtl));
        assert_eq!(comic.total_pages, 20);

        // The debounced duplicate never fires afterwards.
        let later = Instant::now() + PROGRESS_DEBOUNCE * 3;
        drive(&mut app, &backend, Message::Tick(later));
        assert_eq!(backend.saves.borrow().len(), 1);
    }

    #[test]
    fn stale_strip_measurements_are_dropped() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..4).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));
        drive(&mut app, &backend, Message::ChangeViewMode(crate::app::state::ViewMode::LongStrip));
        let epoch = app.reader().strip_epoch();

        // A measurement from before the mode switch must be ignored.
        let effects = drive(
            &mut app,
            &backend,
            Message::StripMeasured {
                epoch: epoch.wrapping_sub(1),
                page_tops: vec![0.0, 500.0],
                content_height: 1000.0,
                viewport_height: 400.0,
            },
        );
        assert!(effects.is_empty());

        let effects = drive(
            &mut app,
            &backend,
            Message::StripMeasured {
                epoch,
                page_tops: vec![0.0, 1000.0, 2000.0, 3000.0],
                content_height: 4000.0,
                viewport_height: 800.0,
            },
        );
        assert!(effects.iter().any(|e| matches!(e, Effect::ScrollStripTo { .. })));
    }

    #[test]
    fn strip_scrolling_derives_the_page_and_schedules_progress() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..4).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));
        drive(&mut app, &backend, Message::ChangeViewMode(crate::app::state::ViewMode::LongStrip));
        let epoch = app.reader().strip_epoch();
        drive(
            &mut app,
            &backend,
            Message::StripMeasured {
                epoch,
                page_tops: vec![0.0, 1000.0, 2000.0, 3000.0],
                content_height: 4000.0,
                viewport_height: 800.0,
            },
        );

        drive(&mut app, &backend, Message::StripScrolled { epoch, offset: 2100.0 });
        let session = app.reader().session().expect("session open");
        assert_eq!(session.current_page(), 2, "viewport midpoint sits in page 2");
        assert!(app.has_pending_progress());
    }

    #[test]
    fn slider_moves_scroll_without_echoing_back() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..4).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));
        drive(&mut app, &backend, Message::ChangeViewMode(crate::app::state::ViewMode::LongStrip));
        let epoch = app.reader().strip_epoch();
        drive(
            &mut app,
            &backend,
            Message::StripMeasured {
                epoch,
                page_tops: vec![0.0, 1000.0, 2000.0, 3000.0],
                content_height: 4000.0,
                viewport_height: 800.0,
            },
        );

        let effects = drive(&mut app, &backend, Message::StripSliderMoved(500.0));
        let scroll_to = effects.iter().find_map(|e| match e {
            Effect::ScrollStripTo { offset } => Some(*offset),
            _ => None,
        });
        assert_eq!(scroll_to, Some(1600.0), "half the 3200px scrollable distance");

        // The echoed scroll report must not produce a slider sync.
        let effects = drive(
            &mut app,
            &backend,
            Message::StripScrolled { epoch, offset: 1600.0 },
        );
        assert!(
            !effects.iter().any(|e| matches!(e, Effect::SyncSlider { .. })),
            "slider-driven scroll does not bounce back"
        );

        // A genuine user scroll afterwards does sync the slider.
        let effects = drive(
            &mut app,
            &backend,
            Message::StripScrolled { epoch, offset: 800.0 },
        );
        assert!(effects.iter().any(|e| matches!(e, Effect::SyncSlider { .. })));
    }

    #[test]
    fn jumping_schedules_a_debounced_progress_write() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..10).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));

        drive(&mut app, &backend, Message::JumpToPage(4));
        assert!(app.has_pending_progress(), "a jump persists like a page turn");

        let later = Instant::now() + PROGRESS_DEBOUNCE + Duration::from_millis(50);
        drive(&mut app, &backend, Message::Tick(later));
        assert_eq!(
            backend.saves.borrow().as_slice(),
            [("/library/a".to_string(), 4, Direction::Ltr)]
        );

        // Jumping to the page already shown schedules nothing.
        drive(&mut app, &backend, Message::JumpToPage(4));
        assert!(!app.has_pending_progress());
    }

    #[test]
    fn jump_is_ignored_in_long_strip_mode() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..6).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));

        drive(&mut app, &backend, Message::JumpToPage(4));
        assert_eq!(app.reader().session().map(|s| s.current_page()), Some(4));

        drive(&mut app, &backend, Message::ChangeViewMode(crate::app::state::ViewMode::LongStrip));
        drive(&mut app, &backend, Message::JumpToPage(1));
        assert_eq!(
            app.reader().session().map(|s| s.current_page()),
            Some(4),
            "position is scroll-derived in strip mode"
        );
    }

    #[test]
    fn switching_to_double_realigns_to_an_even_spread() {
        let mut backend = FakeBackend::with_comics(vec![local_comic("a")]);
        backend.pages_by_path.insert(
            "/library/a".into(),
            (0..10).map(|i| format!("p{i}.jpg")).collect(),
        );
        let mut app = boot(&backend, 30);
        drive(&mut app, &backend, Message::OpenReader("a".into()));
        drive(&mut app, &backend, Message::ChangeViewMode(crate::app::state::ViewMode::Single));
        drive(&mut app, &backend, Message::JumpToPage(5));

        drive(&mut app, &backend, Message::ChangeViewMode(crate::app::state::ViewMode::Double));
        assert_eq!(app.reader().session().map(|s| s.current_page()), Some(4));
    }
}
