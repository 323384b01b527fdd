//! Row selection for bulk actions
//!
//! "Select all" means the ids of the page currently loaded, nothing more.

use std::collections::BTreeSet;

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select members to delete";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    pub fn toggle(&mut self, id: i64) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Header checkbox: select exactly `page_ids`, or clear if all are already selected
    pub fn toggle_page(&mut self, page_ids: &[i64]) {
        if self.all_selected(page_ids) {
            self.clear();
        } else {
            self.ids = page_ids.iter().copied().collect();
        }
    }

    pub fn all_selected(&self, page_ids: &[i64]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.ids.contains(id))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }
}

/// Uses the server's count, not the number requested
pub fn bulk_delete_message(deleted: u64) -> String {
    format!("Successfully deleted {deleted} member(s)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_is_page_scoped() {
        let mut selection = Selection::default();
        selection.toggle(99);
        selection.toggle_page(&[1, 2, 3]);
        assert_eq!(selection.ids(), vec![1, 2, 3]);
        assert!(selection.all_selected(&[1, 2, 3]));

        selection.toggle_page(&[1, 2, 3]);
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_flips_one_row() {
        let mut selection = Selection::default();
        selection.toggle(3);
        selection.toggle(7);
        selection.toggle(3);
        assert_eq!(selection.ids(), vec![7]);
        assert!(!selection.all_selected(&[]));
    }

    #[test]
    fn message_reports_actual_count() {
        assert_eq!(bulk_delete_message(1), "Successfully deleted 1 member(s)");
    }
}
