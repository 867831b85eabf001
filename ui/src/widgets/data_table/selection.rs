//! Row selection keyed by row id.
//!
//! Ids rather than row references: upstream re-fetches recreate row values
//! every time, so reference identity would silently drop selections.

use ustr::Ustr;

/// An ordered selection set, rebuilt on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    ids: Vec<Ustr>,
}

impl Selection {
    pub fn contains(&self, id: Ustr) -> bool {
        self.ids.contains(&id)
    }

    pub fn toggle(&mut self, id: Ustr) {
        if self.contains(id) {
            self.ids.retain(|existing| *existing != id);
        } else {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = Ustr>) {
        self.ids.clear();
        self.ids.extend(ids);
    }

    /// Select-all click behavior: an empty selection selects every row; any
    /// non-empty selection, partial included, clears first.
    pub fn toggle_all(&mut self, ids: impl IntoIterator<Item = Ustr>) {
        if self.ids.is_empty() {
            self.select_all(ids);
        } else {
            self.clear();
        }
    }

    /// The select-all checkbox is checked iff every row is selected and
    /// there is at least one row.
    pub fn all_selected(&self, row_count: usize) -> bool {
        row_count > 0 && self.ids.len() == row_count
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[Ustr] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_round_trip() {
        let all = [Ustr::from("a"), Ustr::from("b"), Ustr::from("c")];
        let mut selection = Selection::default();

        selection.toggle(all[0]);
        selection.toggle(all[1]);
        assert_eq!(selection.len(), 2);
        assert!(!selection.all_selected(3));

        // Clicking the unchecked select-all clears, clicking again selects
        // everything.
        selection.clear();
        assert!(selection.is_empty());
        selection.select_all(all);
        assert!(selection.all_selected(3));
    }

    #[test]
    fn toggle_all_clears_a_partial_selection_first() {
        let all = [Ustr::from("a"), Ustr::from("b"), Ustr::from("c")];
        let mut selection = Selection::default();
        selection.toggle(all[0]);
        selection.toggle(all[1]);

        selection.toggle_all(all);
        assert!(selection.is_empty());
        selection.toggle_all(all);
        assert!(selection.all_selected(3));
    }

    #[test]
    fn toggling_twice_removes_the_id() {
        let mut selection = Selection::default();
        selection.toggle(Ustr::from("a"));
        selection.toggle(Ustr::from("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn all_selected_requires_at_least_one_row() {
        let selection = Selection::default();
        assert!(!selection.all_selected(0));
    }
}
