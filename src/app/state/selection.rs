//! Multi-select model for batch shelf operations.

use std::collections::HashSet;

/// Selection mode over the visible shelf. Outside selection mode the set is
/// always empty; leaving the mode clears it.
#[derive(Debug, Default)]
pub struct SelectionState {
    pub(in crate::app) active: bool,
    selected: HashSet<String>,
}

impl SelectionState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_selected(&self, title: &str) -> bool {
        self.selected.contains(title)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub(in crate::app) fn enter(&mut self) {
        self.active = true;
    }

    pub(in crate::app) fn exit(&mut self) {
        self.active = false;
        self.selected.clear();
    }

    pub(in crate::app) fn toggle(&mut self, title: &str) {
        if !self.active {
            return;
        }
        if !self.selected.remove(title) {
            self.selected.insert(title.to_string());
        }
    }

    /// Select-all toggle: if every visible title is already selected, clear
    /// the selection; otherwise select all visible titles.
    pub(in crate::app) fn toggle_select_all(&mut self, visible: &[String]) {
        if !self.active {
            return;
        }
        let all_selected =
            !visible.is_empty() && visible.iter().all(|title| self.selected.contains(title));
        if all_selected {
            self.selected.clear();
        } else {
            self.selected.extend(visible.iter().cloned());
        }
    }

    /// Selected titles in shelf order, for handing to batch endpoints.
    pub(in crate::app) fn selected_in_order(&self, visible: &[String]) -> Vec<String> {
        visible
            .iter()
            .filter(|title| self.selected.contains(*title))
            .cloned()
            .collect()
    }

    pub(in crate::app) fn drop_titles(&mut self, titles: &[String]) {
        for title in titles {
            self.selected.remove(title);
        }
    }
}
