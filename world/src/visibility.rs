//! Monotonic per-player record of explored tiles.

use frontier_core::{Coord, PlayerId};

use crate::map::Grid;

/// Marks every existing tile in the square of `sight` around `centre` as
/// revealed to `player`. Returns how many tiles were newly revealed.
pub(crate) fn reveal(grid: &mut Grid, player: PlayerId, centre: Coord, sight: i32) -> usize {
    let mut revealed = 0;
    for coord in centre.square(sight) {
        if let Some(tile) = grid.tile_mut(coord) {
            if tile.revealed.insert(player) {
                revealed += 1;
            }
        }
    }
    if revealed > 0 {
        tracing::trace!(player = player.get(), %centre, revealed, "revealed tiles");
    }
    revealed
}
