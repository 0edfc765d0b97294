//! Cyclic turn order over the surviving players.

use frontier_core::PlayerId;
use serde::{Deserialize, Serialize};

/// Ordered sequence of surviving players plus the index of the one to move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    order: Vec<PlayerId>,
    current: usize,
    round: u32,
}

impl Rotation {
    pub(crate) fn new(order: Vec<PlayerId>) -> Self {
        Self {
            order,
            current: 0,
            round: 0,
        }
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn current(&self) -> Option<PlayerId> {
        self.order.get(self.current).copied()
    }

    /// Surviving players starting from the first player of a round.
    #[must_use]
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// Number of completed traversals back to the first player.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Number of players still in the rotation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reports whether the rotation has no players at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reports whether the player is still in the rotation.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.order.contains(&player)
    }

    /// Passes the turn to the next player. Returns `true` when the rotation
    /// wrapped back to its first player and a new round began.
    pub(crate) fn advance(&mut self) -> bool {
        if self.order.is_empty() {
            return false;
        }
        self.current += 1;
        if self.current >= self.order.len() {
            self.current = 0;
            self.round = self.round.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Removes the player while keeping the relative order of the rest and
    /// the identity of the current player. Returns `false` if absent.
    pub(crate) fn remove(&mut self, player: PlayerId) -> bool {
        let Some(index) = self.order.iter().position(|entry| *entry == player) else {
            return false;
        };
        let _ = self.order.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        if self.current >= self.order.len() {
            self.current = 0;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(count: u32) -> Vec<PlayerId> {
        (0..count).map(PlayerId::new).collect()
    }

    #[test]
    fn round_advances_once_per_traversal() {
        let mut rotation = Rotation::new(players(3));
        let mut wraps = 0;
        for _ in 0..9 {
            if rotation.advance() {
                wraps += 1;
            }
        }
        assert_eq!(wraps, 3);
        assert_eq!(rotation.round(), 3);
        assert_eq!(rotation.current(), Some(PlayerId::new(0)));
    }

    #[test]
    fn removal_keeps_current_player_and_relative_order() {
        let mut rotation = Rotation::new(players(4));
        let _ = rotation.advance();
        let _ = rotation.advance();
        assert_eq!(rotation.current(), Some(PlayerId::new(2)));

        assert!(rotation.remove(PlayerId::new(0)));
        assert_eq!(rotation.current(), Some(PlayerId::new(2)));
        assert_eq!(
            rotation.order(),
            &[PlayerId::new(1), PlayerId::new(2), PlayerId::new(3)]
        );

        assert!(rotation.remove(PlayerId::new(3)));
        assert_eq!(rotation.current(), Some(PlayerId::new(2)));
        assert!(!rotation.remove(PlayerId::new(3)));
        assert_eq!(rotation.len(), 2);

        assert!(rotation.advance());
        assert_eq!(rotation.current(), Some(PlayerId::new(1)));
    }

    #[test]
    fn removing_the_last_slot_wraps_to_the_front() {
        let mut rotation = Rotation::new(players(2));
        let _ = rotation.advance();
        assert!(rotation.remove(PlayerId::new(1)));
        assert_eq!(rotation.current(), Some(PlayerId::new(0)));
        assert!(!rotation.is_empty());
    }
}
