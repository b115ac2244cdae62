//! Number-grid selection for the predict view

use crate::constants::{MAX_SELECTION, NUMBER_RANGE};
use rand::Rng;
use std::collections::BTreeSet;

/// Ascending set of picked numbers, capped at `MAX_SELECTION`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSelection {
    numbers: BTreeSet<u32>,
}

impl NumberSelection {
    pub fn contains(&self, n: u32) -> bool {
        self.numbers.contains(&n)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.numbers.len() >= MAX_SELECTION
    }

    /// Remove `n` if selected, otherwise add it. Adding past the cap or
    /// outside the valid range does nothing. Returns whether the set changed.
    pub fn toggle(&mut self, n: u32) -> bool {
        if self.numbers.remove(&n) {
            return true;
        }
        if self.is_full() || !NUMBER_RANGE.contains(&n) {
            return false;
        }
        self.numbers.insert(n)
    }

    pub fn clear(&mut self) {
        self.numbers.clear();
    }

    /// Replace the selection with `count` distinct random numbers
    pub fn quick_pick<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        self.numbers = quick_pick(count.min(MAX_SELECTION), rng);
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.numbers.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.numbers.iter().copied()
    }
}

/// Draw from the valid range, resampling duplicates, until `count` unique
/// numbers are collected.
pub fn quick_pick<R: Rng + ?Sized>(count: usize, rng: &mut R) -> BTreeSet<u32> {
    let span = (NUMBER_RANGE.end() - NUMBER_RANGE.start() + 1) as usize;
    let count = count.min(span);
    let mut picked = BTreeSet::new();
    while picked.len() < count {
        picked.insert(rng.random_range(NUMBER_RANGE));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn toggle_keeps_ascending_order() {
        let mut sel = NumberSelection::default();
        for n in [42, 7, 23] {
            assert!(sel.toggle(n));
        }
        assert_eq!(sel.to_vec(), vec![7, 23, 42]);
        assert!(sel.toggle(23));
        assert_eq!(sel.to_vec(), vec![7, 42]);
    }

    #[test]
    fn twenty_first_toggle_is_a_no_op() {
        let mut sel = NumberSelection::default();
        for n in 1..=20 {
            assert!(sel.toggle(n));
        }
        let before = sel.clone();
        assert!(!sel.toggle(21));
        assert_eq!(sel, before);
        assert_eq!(sel.len(), MAX_SELECTION);
        // Deselecting still works at the cap
        assert!(sel.toggle(5));
        assert!(sel.toggle(21));
        assert_eq!(sel.len(), MAX_SELECTION);
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let mut sel = NumberSelection::default();
        assert!(!sel.toggle(0));
        assert!(!sel.toggle(81));
        assert!(sel.is_empty());
    }

    #[test]
    fn quick_pick_yields_exact_unique_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in [1, 5, 10, 20, 80] {
            for _ in 0..50 {
                let picked = quick_pick(count, &mut rng);
                assert_eq!(picked.len(), count);
                assert!(picked.iter().all(|n| NUMBER_RANGE.contains(n)));
            }
        }
        assert_eq!(quick_pick(500, &mut rng).len(), 80);
    }

    #[test]
    fn quick_pick_replaces_selection_within_cap() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sel = NumberSelection::default();
        sel.toggle(3);
        sel.quick_pick(10, &mut rng);
        assert_eq!(sel.len(), 10);
        sel.quick_pick(40, &mut rng);
        assert_eq!(sel.len(), MAX_SELECTION);
        let v = sel.to_vec();
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }
}
