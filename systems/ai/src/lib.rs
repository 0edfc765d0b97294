#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Computer player that plays a whole turn through the world's command surface.
//!
//! The controller never touches world state directly: every decision becomes
//! a [`Command`] submitted through [`frontier_world::apply`], so computer
//! players obey exactly the rules a human does. Each per-unit loop only
//! continues after an accepted command, and every accepted move either spends
//! movement or removes an enemy unit, which bounds the work per turn.

use std::{cmp::Reverse, collections::BTreeSet};

use frontier_core::{Command, Coord, Event, PlayerId, UnitId, UnitKind};
use frontier_world::{apply, query, City, Unit, World};

/// Number of non-settler units that stay home to guard a city.
pub const DEFAULT_DEFENDERS: usize = 2;

/// Kind every computer city tries to produce each turn.
pub const GARRISON_KIND: UnitKind = UnitKind::Warrior;

/// Drives a computer player's turn from housekeeping to hand-over.
#[derive(Debug)]
pub struct AiController {
    defenders: usize,
    handled: BTreeSet<UnitId>,
}

impl Default for AiController {
    fn default() -> Self {
        Self::with_defenders(DEFAULT_DEFENDERS)
    }
}

/// Role a unit plays for the rest of the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Settler,
    Defender,
    Attacker,
}

impl AiController {
    /// Creates a controller with the default number of defenders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller that keeps `defenders` units near home.
    #[must_use]
    pub fn with_defenders(defenders: usize) -> Self {
        Self {
            defenders,
            handled: BTreeSet::new(),
        }
    }

    /// Plays the current player's turn to completion and ends it.
    ///
    /// Does nothing once the game is over.
    pub fn take_turn(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        let Some(player) = query::current_player(world) else {
            return;
        };
        if query::is_game_over(world) {
            return;
        }

        let _ = apply(world, Command::StartTurn, out_events);
        tracing::debug!(player = player.get(), "computer turn running");

        produce_garrisons(world, player, out_events);
        self.command_units(world, player, out_events);

        if !query::is_game_over(world) {
            let _ = apply(world, Command::EndTurn, out_events);
        }
    }

    /// Visits every unit once, including units that appear mid-pass.
    fn command_units(&mut self, world: &mut World, player: PlayerId, out: &mut Vec<Event>) {
        self.handled.clear();
        let mut defenders_left = self.defenders;

        loop {
            let Some((unit, kind)) = query::units_of(world, player)
                .find(|unit| !self.handled.contains(&unit.id()))
                .map(|unit| (unit.id(), unit.kind()))
            else {
                break;
            };
            let _ = self.handled.insert(unit);

            let role = if kind == UnitKind::Settler {
                Role::Settler
            } else if defenders_left > 0 {
                defenders_left -= 1;
                Role::Defender
            } else {
                Role::Attacker
            };
            tracing::trace!(unit = unit.get(), ?role, "unit acting");

            match role {
                Role::Settler => settle(world, unit, out),
                Role::Defender => defend(world, player, unit, out),
                Role::Attacker => attack(world, player, unit, out),
            }
        }
    }
}

fn produce_garrisons(world: &mut World, player: PlayerId, out: &mut Vec<Event>) {
    let cost = GARRISON_KIND.stats().cost;
    let sites: Vec<Coord> = query::cities_of(world, player)
        .filter(|city| city.reserve() >= cost && city.can_produce(GARRISON_KIND))
        .map(City::coord)
        .filter(|at| query::unit_at(world, *at).is_none())
        .collect();
    for city in sites {
        if apply(
            world,
            Command::ProduceUnit {
                city,
                kind: GARRISON_KIND,
            },
            out,
        ) {
            tracing::debug!(player = player.get(), %city, "garrison ordered");
        }
    }
}

/// Issues a move and reports whether the unit can keep acting.
fn step(world: &mut World, unit: UnitId, to: Coord, out: &mut Vec<Event>) -> bool {
    apply(world, Command::MoveUnit { unit, to }, out) && query::unit(world, unit).is_some()
}

fn settle(world: &mut World, unit: UnitId, out: &mut Vec<Event>) {
    let Some(settler) = query::unit(world, unit) else {
        return;
    };
    let (at, can_found) = (settler.position(), settler.can_found());
    let unclaimed = query::tile_at(world, at).is_some_and(|tile| tile.owner_city().is_none());
    if can_found && unclaimed && apply(world, Command::FoundCity { at }, out) {
        return;
    }

    while let Some(to) = settler_destination(world, unit) {
        if !step(world, unit, to, out) {
            break;
        }
    }
}

/// Empty tile that takes the settler furthest from existing cities.
fn settler_destination(world: &World, unit: UnitId) -> Option<Coord> {
    let owner = query::unit(world, unit).map(Unit::owner)?;
    query::valid_moves(world, unit)
        .into_iter()
        .filter(|to| query::unit_at(world, *to).is_none())
        .filter(|to| !query::city_at(world, *to).is_some_and(|city| city.owner() != owner))
        .min_by_key(|to| {
            let clearance = query::cities(world)
                .map(|city| city.coord().chebyshev_distance(*to))
                .min()
                .unwrap_or(u32::MAX);
            Reverse(clearance)
        })
}

fn defend(world: &mut World, player: PlayerId, unit: UnitId, out: &mut Vec<Event>) {
    let Some(position) = query::unit(world, unit).map(Unit::position) else {
        return;
    };

    if query::tile_at(world, position).is_some_and(|tile| tile.is_city()) {
        let exit = query::valid_moves(world, unit).into_iter().find(|to| {
            query::tile_at(world, *to)
                .is_some_and(|tile| tile.occupant().is_none() && !tile.is_city())
        });
        if let Some(exit) = exit {
            if !step(world, unit, exit, out) {
                return;
            }
        }
    }

    let Some(position) = query::unit(world, unit).map(Unit::position) else {
        return;
    };
    let Some(anchor) = position.square(1).find(|coord| {
        query::city_at(world, *coord).is_some_and(|city| city.owner() == player)
    }) else {
        return;
    };

    loop {
        let guarded: Vec<Coord> = query::valid_moves(world, unit)
            .into_iter()
            .filter(|to| *to != anchor && to.chebyshev_distance(anchor) <= 1)
            .collect();
        let choice = guarded
            .iter()
            .copied()
            .find(|to| query::unit_at(world, *to).is_some())
            .or_else(|| guarded.first().copied());
        let Some(to) = choice else {
            break;
        };
        if !step(world, unit, to, out) {
            break;
        }
    }
}

fn attack(world: &mut World, player: PlayerId, unit: UnitId, out: &mut Vec<Event>) {
    let Some(position) = query::unit(world, unit).map(Unit::position) else {
        return;
    };
    let Some(target) = nearest_enemy_city(world, player, position) else {
        return;
    };
    tracing::trace!(unit = unit.get(), %target, "advancing on city");

    loop {
        let target_stands =
            query::city_at(world, target).is_some_and(|city| city.owner() != player);
        if !target_stands {
            break;
        }
        let Some(position) = query::unit(world, unit).map(Unit::position) else {
            break;
        };
        let moves = query::valid_moves(world, unit);
        let Some(to) = step_towards(position, target, &moves) else {
            break;
        };
        if !step(world, unit, to, out) {
            break;
        }
    }
}

/// Closest city of another player; ties go to the lowest x, then lowest y.
fn nearest_enemy_city(world: &World, player: PlayerId, from: Coord) -> Option<Coord> {
    query::cities(world)
        .filter(|city| city.owner() != player)
        .map(|city| (from.chebyshev_distance(city.coord()), city.coord()))
        .min()
        .map(|(_, coord)| coord)
}

/// Picks the move towards `target`: the target itself or the ideal diagonal
/// step first, then any move matching the dominant axis, then any move.
fn step_towards(from: Coord, target: Coord, moves: &[Coord]) -> Option<Coord> {
    let (dx, dy) = from.delta_to(target);
    let ideal = from.offset(dx.signum(), dy.signum());
    let y_dominant = dy.unsigned_abs() > dx.unsigned_abs();

    moves
        .iter()
        .find(|to| **to == target || **to == ideal)
        .or_else(|| {
            moves.iter().find(|to| {
                if y_dominant {
                    to.y() == ideal.y()
                } else {
                    to.x() == ideal.x()
                }
            })
        })
        .or_else(|| moves.first())
        .copied()
}
