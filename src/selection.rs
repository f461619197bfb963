use std::collections::BTreeSet;

/// Which results (by index into the current ranked set) the user has
/// picked. Lives exactly as long as the result set it indexes into;
/// installing a new result set clears it wholesale.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    picked: BTreeSet<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership. Returns the new state of the index.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.picked.remove(&index) {
            false
        } else {
            self.picked.insert(index);
            true
        }
    }

    /// Replace the set with `{0..n}`.
    pub fn select_all(&mut self, n: usize) {
        self.picked = (0..n).collect();
    }

    pub fn clear(&mut self) {
        self.picked.clear();
    }

    pub fn count(&self) -> usize {
        self.picked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.picked.contains(&index)
    }

    /// Selected indices in ascending original-rank order, regardless of
    /// the order they were toggled in.
    pub fn ordered(&self) -> impl Iterator<Item = usize> + '_ {
        self.picked.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_membership() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle(3));
        assert!(selection.is_selected(3));
        assert!(!selection.toggle(3));
        assert!(!selection.is_selected(3));
    }

    #[test]
    fn select_all_then_toggle() {
        let mut selection = SelectionSet::new();
        selection.select_all(5);
        assert_eq!(selection.count(), 5);
        selection.toggle(2);
        assert_eq!(selection.count(), 4);
    }

    #[test]
    fn ordered_ignores_toggle_order() {
        let mut selection = SelectionSet::new();
        selection.toggle(4);
        selection.toggle(0);
        selection.toggle(2);
        let indices: Vec<usize> = selection.ordered().collect();
        assert_eq!(indices, vec![0, 2, 4]);
    }
}
