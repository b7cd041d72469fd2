use super::super::messages::BatchAction;
use super::super::state::App;
use super::Effect;
use tracing::{info, warn};

impl App {
    pub(super) fn handle_toggle_selection_mode(&mut self, effects: &mut Vec<Effect>) {
        if self.selection.is_active() {
            self.selection.exit();
        } else {
            self.selection.enter();
        }
        effects.push(Effect::RenderShelf);
    }

    pub(super) fn handle_toggle_selected(&mut self, title: String, effects: &mut Vec<Effect>) {
        if !self.selection.is_active() {
            return;
        }
        self.selection.toggle(&title);
        effects.push(Effect::RenderShelf);
    }

    pub(super) fn handle_toggle_select_all(&mut self, effects: &mut Vec<Effect>) {
        if !self.selection.is_active() {
            return;
        }
        let visible = self.shelf.visible_titles();
        self.selection.toggle_select_all(&visible);
        effects.push(Effect::RenderShelf);
    }

    /// Start a batch mutation over the current selection. An empty selection
    /// aborts before anything reaches the backend.
    pub(super) fn handle_batch(&mut self, action: BatchAction, effects: &mut Vec<Effect>) {
        let titles = self.selection.selected_in_order(&self.shelf.visible_titles());
        if titles.is_empty() {
            return;
        }
        info!(count = titles.len(), ?action, "Starting batch operation");
        effects.push(Effect::RunBatch { action, titles });
    }

    /// Merge takes exactly two selected comics: one with a local copy, one
    /// online-only. The local one survives.
    pub(super) fn handle_merge_selected(&mut self, effects: &mut Vec<Effect>) {
        let titles = self.selection.selected_in_order(&self.shelf.visible_titles());
        if titles.len() != 2 {
            self.shelf.error = Some("Merging requires exactly two selected comics".to_string());
            effects.push(Effect::RenderShelf);
            return;
        }

        let locality = |title: &str| {
            self.shelf
                .comic(title)
                .map(|comic| comic.local_path().is_some())
                .unwrap_or(false)
        };
        let (online_title, local_title) = match (locality(&titles[0]), locality(&titles[1])) {
            (false, true) => (titles[0].clone(), titles[1].clone()),
            (true, false) => (titles[1].clone(), titles[0].clone()),
            _ => {
                self.shelf.error = Some(
                    "Merging requires one local and one online-only comic".to_string(),
                );
                effects.push(Effect::RenderShelf);
                return;
            }
        };

        info!(%online_title, %local_title, "Starting merge");
        effects.push(Effect::RunBatch {
            action: BatchAction::Merge {
                online_title,
                local_title,
            },
            titles,
        });
    }

    /// Apply a confirmed batch to the local collection so the shelf reflects
    /// the mutation without a full reload. Merge is the exception: the
    /// backend rewrites both entries, so the shelf is refetched.
    pub(super) fn handle_batch_completed(
        &mut self,
        action: BatchAction,
        titles: Vec<String>,
        effects: &mut Vec<Effect>,
    ) {
        match action {
            BatchAction::Favorite(favorite) => {
                for title in &titles {
                    if let Some(comic) = self.shelf.comic_mut(title) {
                        comic.is_favorite = favorite;
                    }
                }
            }
            BatchAction::AssignFolder(folder) => {
                for title in &titles {
                    if let Some(comic) = self.shelf.comic_mut(title) {
                        comic.folder = folder.clone();
                    }
                }
            }
            BatchAction::Delete => {
                self.shelf.remove_titles(&titles);
            }
            BatchAction::Merge { .. } => {
                self.selection.exit();
                self.shelf.loading = false;
                self.start_shelf_load(false, effects);
                return;
            }
        }
        info!(count = titles.len(), "Batch operation applied");
        self.selection.exit();
        effects.push(Effect::RenderShelf);
    }

    pub(super) fn handle_batch_failed(&mut self, error: String, effects: &mut Vec<Effect>) {
        warn!("Batch operation failed: {error}");
        self.shelf.error = Some(error);
        effects.push(Effect::RenderShelf);
    }
}
