//! Sibling ordering
//!
//! Vector position is the canonical sequence. The `order` field mirrors it
//! so renderers can sort without relying on storage order, and every
//! structural change renumbers the affected siblings to `0..n`.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An entity with an identity and a display position among its siblings
pub trait Ordered {
    type Id: Eq + Hash + Clone;

    fn id(&self) -> &Self::Id;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid direction '{0}': expected 'up' or 'down'")]
pub struct DirectionError(String);

impl FromStr for Direction {
    type Err = DirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(DirectionError(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Sorts siblings into display order and renumbers them to `0..n`
///
/// The sort is stable, so ties (e.g. records without an `order` field) keep
/// their stored position.
pub fn normalize<T: Ordered>(siblings: &mut [T]) {
    siblings.sort_by_key(|s| s.order());
    renumber(siblings);
}

/// Rewrites every sibling's order to match its position
pub fn renumber<T: Ordered>(siblings: &mut [T]) {
    for (position, sibling) in siblings.iter_mut().enumerate() {
        sibling.set_order(position as u32);
    }
}

/// Returns true if order values strictly increase with position
pub fn is_strictly_ordered<T: Ordered>(siblings: &[T]) -> bool {
    siblings.windows(2).all(|w| w[0].order() < w[1].order())
}

/// Swaps the sibling with `id` and its neighbour in `direction`
///
/// Returns `None` if the sibling does not exist, `Some(false)` if it is
/// already at the boundary, and `Some(true)` once swapped and renumbered.
pub fn step<T: Ordered>(siblings: &mut [T], id: &T::Id, direction: Direction) -> Option<bool> {
    if !siblings.iter().any(|s| s.id() == id) {
        return None;
    }
    normalize(siblings);

    let index = siblings.iter().position(|s| s.id() == id)?;
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|&t| t < siblings.len()),
    };

    match target {
        Some(target) => {
            siblings.swap(index, target);
            renumber(siblings);
            Some(true)
        }
        None => Some(false),
    }
}

/// Returns true if `proposed` names exactly the current siblings, each once
pub fn is_permutation<T: Ordered>(siblings: &[T], proposed: &[T::Id]) -> bool {
    if siblings.len() != proposed.len() {
        return false;
    }

    let mut seen = HashSet::with_capacity(proposed.len());
    if !proposed.iter().all(|id| seen.insert(id)) {
        return false;
    }

    siblings.iter().all(|s| seen.contains(s.id()))
}

/// Rearranges siblings into `proposed` order and renumbers them
///
/// Leaves the slice untouched and returns false unless `proposed` is a
/// permutation of the current IDs.
pub fn reorder<T: Ordered>(siblings: &mut Vec<T>, proposed: &[T::Id]) -> bool {
    if !is_permutation(siblings, proposed) {
        return false;
    }

    let mut remaining: Vec<Option<T>> = siblings.drain(..).map(Some).collect();
    for id in proposed {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|s| s.id() == id))
        {
            if let Some(sibling) = slot.take() {
                siblings.push(sibling);
            }
        }
    }
    renumber(siblings);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Slot {
        id: u32,
        order: u32,
    }

    impl Ordered for Slot {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn order(&self) -> u32 {
            self.order
        }

        fn set_order(&mut self, order: u32) {
            self.order = order;
        }
    }

    fn slots(ids: &[u32]) -> Vec<Slot> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| Slot { id, order: i as u32 })
            .collect()
    }

    fn ids(slots: &[Slot]) -> Vec<u32> {
        slots.iter().map(|s| s.id).collect()
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(" down".parse::<Direction>(), Ok(Direction::Down));
        assert!("left".parse::<Direction>().is_err());
    }

    #[test]
    fn normalize_sorts_by_order_and_keeps_ties_stable() {
        let mut s = slots(&[1, 2, 3, 4]);
        s[0].order = u32::MAX;
        s[1].order = 0;
        s[2].order = 0;
        s[3].order = 5;

        normalize(&mut s);

        assert_eq!(ids(&s), vec![2, 3, 4, 1]);
        assert_eq!(s.iter().map(|x| x.order).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn step_follows_display_order_on_unnumbered_siblings() {
        let mut s = slots(&[10, 20, 30]);
        s[0].order = 2;
        s[1].order = 0;
        s[2].order = 1;

        assert_eq!(step(&mut s, &10, Direction::Up), Some(true));
        assert_eq!(ids(&s), vec![20, 10, 30]);
        assert!(is_strictly_ordered(&s));
    }

    #[test]
    fn step_swaps_with_neighbour() {
        let mut s = slots(&[10, 20, 30]);

        assert_eq!(step(&mut s, &30, Direction::Up), Some(true));
        assert_eq!(ids(&s), vec![10, 30, 20]);
        assert!(is_strictly_ordered(&s));

        assert_eq!(step(&mut s, &10, Direction::Down), Some(true));
        assert_eq!(ids(&s), vec![30, 10, 20]);
    }

    #[test]
    fn step_at_boundary_is_noop() {
        let mut s = slots(&[10, 20]);

        assert_eq!(step(&mut s, &10, Direction::Up), Some(false));
        assert_eq!(step(&mut s, &20, Direction::Down), Some(false));
        assert_eq!(step(&mut s, &99, Direction::Up), None);
        assert_eq!(ids(&s), vec![10, 20]);
    }

    #[test]
    fn permutation_check_rejects_missing_extra_and_duplicate() {
        let s = slots(&[1, 2, 3]);

        assert!(is_permutation(&s, &[3, 1, 2]));
        assert!(!is_permutation(&s, &[1, 2]));
        assert!(!is_permutation(&s, &[1, 2, 3, 4]));
        assert!(!is_permutation(&s, &[1, 1, 2]));
        assert!(!is_permutation(&s, &[1, 2, 4]));
    }

    #[test]
    fn reorder_rejects_without_touching_siblings() {
        let mut s = slots(&[1, 2, 3]);
        s[2].order = 9;
        let before = s.clone();

        assert!(!reorder(&mut s, &[3, 1]));
        assert_eq!(s, before);
    }

    #[test]
    fn reorder_applies_and_renumbers() {
        let mut s = slots(&[1, 2, 3]);

        assert!(reorder(&mut s, &[3, 1, 2]));
        assert_eq!(ids(&s), vec![3, 1, 2]);
        assert_eq!(s.iter().map(|x| x.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    proptest! {
        #[test]
        fn steps_keep_siblings_strictly_ordered(
            len in 1usize..8,
            moves in prop::collection::vec((0u32..8, any::<bool>()), 0..20),
        ) {
            let initial: Vec<u32> = (0..len as u32).collect();
            let mut s = slots(&initial);

            for (id, up) in moves {
                let direction = if up { Direction::Up } else { Direction::Down };
                let _ = step(&mut s, &id, direction);
                prop_assert!(is_strictly_ordered(&s));
            }

            let mut sorted = ids(&s);
            sorted.sort_unstable();
            prop_assert_eq!(sorted, initial);
        }
    }
}
