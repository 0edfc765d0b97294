#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Frontier.
//!
//! The [`World`] aggregate owns the tile grid, every unit and city, the
//! players and their turn rotation. All mutation flows through [`apply`];
//! adapters and systems observe the results through [`query`] and the
//! emitted [`Event`] values.

mod combat;
mod economy;
mod entities;
mod map;
mod movement;
mod rotation;
mod turn;
mod visibility;

use std::collections::BTreeSet;

use frontier_core::{
    default_start_coords, CityId, Command, Coord, Event, GameSetup, PlayerId, RuleViolation,
    SetupError, UnitId, UnitKind,
};
use serde::{Deserialize, Serialize};

pub use entities::{City, Player, Unit, MAX_CONTROL_RADIUS};
pub use map::{Grid, Tile};
pub use rotation::Rotation;

use entities::Registry;

/// Marks the (round, player) pair whose turn-start housekeeping already ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct TurnMarker {
    round: u32,
    player: PlayerId,
}

/// Represents the authoritative Frontier world state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    grid: Grid,
    players: Vec<Player>,
    units: Registry<Unit>,
    cities: Registry<City>,
    rotation: Rotation,
    starts: Vec<Coord>,
    turn_marker: Option<TurnMarker>,
}

impl World {
    /// Builds a fresh game: map, players in rotation order, and one settler
    /// per player on its start coordinate.
    ///
    /// Setup is all-or-nothing; on failure no world is produced.
    pub fn new_game(setup: &GameSetup) -> Result<Self, SetupError> {
        if setup.players.is_empty() {
            return Err(SetupError::NoPlayers);
        }

        let layout = frontier_system_mapgen::layout_for(&setup.map, &setup.starts)?;
        let starts = if setup.starts.is_empty() {
            default_start_coords(layout.size()).to_vec()
        } else {
            setup.starts.clone()
        };
        if setup.players.len() > starts.len() {
            return Err(SetupError::TooManyPlayers {
                players: setup.players.len(),
                starts: starts.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for start in starts.iter().take(setup.players.len()) {
            let spec = layout.tile(*start).ok_or(SetupError::OutOfBounds(*start))?;
            if !spec.terrain.is_passable() {
                return Err(SetupError::Impassable(*start));
            }
            if !seen.insert(*start) {
                return Err(SetupError::DuplicateStart(*start));
            }
        }

        let players: Vec<Player> = setup
            .players
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let id = PlayerId::new(u32::try_from(index).unwrap_or(u32::MAX));
                Player::new(id, player.name.clone(), player.controller)
            })
            .collect();
        let order = players.iter().map(Player::id).collect();

        let mut world = Self {
            grid: Grid::from_layout(layout),
            players,
            units: Registry::new(),
            cities: Registry::new(),
            rotation: Rotation::new(order),
            starts,
            turn_marker: None,
        };

        let placements: Vec<(PlayerId, Coord)> = world
            .players
            .iter()
            .map(Player::id)
            .zip(world.starts.iter().copied())
            .collect();
        for (player, start) in placements {
            let _ = world.attach_unit(player, UnitKind::Settler, start);
        }

        tracing::info!(
            players = world.players.len(),
            size = world.grid.size(),
            "new game created"
        );
        Ok(world)
    }

    /// Places a unit directly on the board, outside of the command surface.
    ///
    /// Intended for scenario setup; the unit starts with full movement.
    pub fn place_unit(
        &mut self,
        owner: PlayerId,
        kind: UnitKind,
        at: Coord,
    ) -> Result<UnitId, SetupError> {
        let tile = self.placement_tile(owner, at)?;
        if tile.occupant().is_some() {
            return Err(SetupError::Occupied(at));
        }
        Ok(self.attach_unit(owner, kind, at))
    }

    /// Builds a city directly on the board, outside of the command surface.
    ///
    /// The city starts with the same values as a freshly founded one but no
    /// free unit is produced.
    pub fn place_city(&mut self, owner: PlayerId, at: Coord) -> Result<CityId, SetupError> {
        let tile = self.placement_tile(owner, at)?;
        if tile.owner_city().is_some() {
            return Err(SetupError::Claimed(at));
        }
        let mut discarded = Vec::new();
        Ok(economy::establish_city(self, owner, at, &mut discarded))
    }

    fn placement_tile(&self, owner: PlayerId, at: Coord) -> Result<&Tile, SetupError> {
        if self.player(owner).is_none() {
            return Err(SetupError::UnknownPlayer(owner));
        }
        let tile = self.grid.tile(at).ok_or(SetupError::OutOfBounds(at))?;
        if !tile.terrain().is_passable() {
            return Err(SetupError::Impassable(at));
        }
        Ok(tile)
    }

    pub(crate) fn player(&self, id: PlayerId) -> Option<&Player> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.players.get(index))
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.players.get_mut(index))
    }

    pub(crate) fn is_game_over(&self) -> bool {
        self.rotation.len() <= 1
    }

    /// Player allowed to issue commands right now.
    pub(crate) fn acting_player(&self) -> Result<PlayerId, RuleViolation> {
        if self.is_game_over() {
            return Err(RuleViolation::GameOver);
        }
        self.rotation.current().ok_or(RuleViolation::GameOver)
    }

    /// Creates a unit, links it to its tile and owner, and reveals around it.
    pub(crate) fn attach_unit(&mut self, owner: PlayerId, kind: UnitKind, at: Coord) -> UnitId {
        let id = self.units.allocate();
        let unit = Unit::new(id, kind, owner, at);
        let sight = unit.sight();
        self.units.insert(id, unit);
        if let Some(tile) = self.grid.tile_mut(at) {
            tile.occupant = Some(id);
        }
        if let Some(player) = self.player_mut(owner) {
            player.units.push(id);
        }
        let _ = visibility::reveal(&mut self.grid, owner, at, sight);
        id
    }

    /// Removes a unit from the board, its tile and its owner's list.
    pub(crate) fn detach_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(id)?;
        if let Some(tile) = self.grid.tile_mut(unit.position()) {
            if tile.occupant == Some(id) {
                tile.occupant = None;
            }
        }
        if let Some(player) = self.player_mut(unit.owner()) {
            player.units.retain(|entry| *entry != id);
        }
        Some(unit)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Returns `true` when the command changed the world. Rule violations leave
/// the world untouched, return `false` and emit [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) -> bool {
    let outcome = match command {
        Command::MoveUnit { unit, to } => movement::move_or_act(world, unit, to, out_events),
        Command::ProduceUnit { city, kind } => {
            economy::produce_unit(world, city, kind, out_events)
        }
        Command::FoundCity { at } => economy::found_city(world, at, out_events),
        Command::StartTurn => turn::start_turn(world, out_events),
        Command::EndTurn => turn::end_turn(world, out_events),
    };

    check_invariants(world);

    match outcome {
        Ok(changed) => changed,
        Err(reason) => {
            tracing::debug!(?command, %reason, "command rejected");
            out_events.push(Event::CommandRejected { reason });
            false
        }
    }
}

fn check_invariants(world: &World) {
    if !cfg!(debug_assertions) {
        return;
    }

    for unit in world.units.values() {
        debug_assert_eq!(
            world.grid.tile(unit.position()).and_then(Tile::occupant),
            Some(unit.id()),
            "unit {:?} is not referenced by its tile",
            unit.id()
        );
        debug_assert!(unit.remaining_movement() <= unit.max_movement());
        debug_assert!(unit.hp() <= unit.max_hp());
    }

    for tile in world.grid.iter() {
        if let Some(occupant) = tile.occupant() {
            debug_assert_eq!(
                world.units.get(occupant).map(Unit::position),
                Some(tile.coord()),
                "tile {} references a unit standing elsewhere",
                tile.coord()
            );
        }
        if tile.is_city() {
            debug_assert_eq!(
                tile.owner_city()
                    .and_then(|id| world.cities.get(id))
                    .map(City::coord),
                Some(tile.coord()),
                "city tile {} does not match its city",
                tile.coord()
            );
        }
    }

    for city in world.cities.values() {
        debug_assert!(city.hp() <= city.max_hp());
        debug_assert!(
            world.rotation.contains(city.owner()),
            "city owner {:?} left the rotation",
            city.owner()
        );
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use frontier_core::{CityId, Controller, Coord, PlayerId, UnitId};

    use super::{City, Grid, Player, Tile, Unit, World};

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Width and height of the square map.
    #[must_use]
    pub fn size(world: &World) -> u32 {
        world.grid.size()
    }

    /// Tile at the coordinate; `None` off the map.
    #[must_use]
    pub fn tile_at(world: &World, coord: Coord) -> Option<&Tile> {
        world.grid.tile(coord)
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn current_player(world: &World) -> Option<PlayerId> {
        world.rotation.current()
    }

    /// Looks up a player, eliminated or not.
    #[must_use]
    pub fn player(world: &World, id: PlayerId) -> Option<&Player> {
        world.player(id)
    }

    /// Every player that took part in the game, in setup order.
    #[must_use]
    pub fn players(world: &World) -> &[Player] {
        &world.players
    }

    /// Surviving players in turn order.
    #[must_use]
    pub fn rotation(world: &World) -> &[PlayerId] {
        world.rotation.order()
    }

    /// Number of completed traversals of the rotation.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.rotation.round()
    }

    /// Reports whether the player to move takes commands from a UI.
    #[must_use]
    pub fn is_human_turn(world: &World) -> bool {
        current_player(world)
            .and_then(|id| world.player(id))
            .is_some_and(|player| player.controller() == Controller::Human)
    }

    /// Reports whether a single player remains in the rotation.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.is_game_over()
    }

    /// Sole surviving player once the game is over.
    #[must_use]
    pub fn winner(world: &World) -> Option<PlayerId> {
        if world.is_game_over() {
            world.rotation.current()
        } else {
            None
        }
    }

    /// Reports whether the current player's turn-start housekeeping already ran.
    #[must_use]
    pub fn turn_started(world: &World) -> bool {
        match (world.turn_marker, world.rotation.current()) {
            (Some(marker), Some(player)) => {
                marker.player == player && marker.round == world.rotation.round()
            }
            _ => false,
        }
    }

    /// Looks up a living unit.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<&Unit> {
        world.units.get(id)
    }

    /// Unit standing on the coordinate.
    #[must_use]
    pub fn unit_at(world: &World, coord: Coord) -> Option<&Unit> {
        tile_at(world, coord)
            .and_then(Tile::occupant)
            .and_then(|id| world.units.get(id))
    }

    /// Units commanded by the player, in acquisition order.
    pub fn units_of(world: &World, player: PlayerId) -> impl Iterator<Item = &Unit> + '_ {
        world
            .player(player)
            .into_iter()
            .flat_map(|player| player.units().iter())
            .filter_map(|id| world.units.get(*id))
    }

    /// Every living unit ordered by identifier.
    pub fn units(world: &World) -> impl Iterator<Item = &Unit> + '_ {
        world.units.values()
    }

    /// Looks up a standing city.
    #[must_use]
    pub fn city(world: &World, id: CityId) -> Option<&City> {
        world.cities.get(id)
    }

    /// City built on the coordinate.
    #[must_use]
    pub fn city_at(world: &World, coord: Coord) -> Option<&City> {
        tile_at(world, coord)
            .filter(|tile| tile.is_city())
            .and_then(Tile::owner_city)
            .and_then(|id| world.cities.get(id))
    }

    /// Cities owned by the player, in founding order.
    pub fn cities_of(world: &World, player: PlayerId) -> impl Iterator<Item = &City> + '_ {
        world
            .player(player)
            .into_iter()
            .flat_map(|player| player.cities().iter())
            .filter_map(|id| world.cities.get(*id))
    }

    /// Every standing city ordered by identifier.
    pub fn cities(world: &World) -> impl Iterator<Item = &City> + '_ {
        world.cities.values()
    }

    /// Destinations the unit may move to or attack this action.
    ///
    /// Derived on demand from the current board; unknown units have none.
    #[must_use]
    pub fn valid_moves(world: &World, unit: UnitId) -> Vec<Coord> {
        world
            .units
            .get(unit)
            .map(|unit| super::movement::valid_moves(world, unit))
            .unwrap_or_default()
    }

    /// Start coordinates chosen when the game was set up.
    #[must_use]
    pub fn starting_coords(world: &World) -> &[Coord] {
        &world.starts
    }

    /// Reports whether the player has ever had the coordinate in sight.
    #[must_use]
    pub fn is_revealed(world: &World, coord: Coord, player: PlayerId) -> bool {
        tile_at(world, coord).is_some_and(|tile| tile.is_revealed_to(player))
    }

    /// Produces a status summary for the player.
    #[must_use]
    pub fn player_summary(world: &World, id: PlayerId) -> Option<PlayerSummary> {
        let player = world.player(id)?;
        Some(PlayerSummary {
            id,
            name: player.name().to_owned(),
            controller: player.controller(),
            units: player.units().len(),
            cities: player.cities().len(),
            revealed_tiles: world
                .grid
                .iter()
                .filter(|tile| tile.is_revealed_to(id))
                .count(),
            in_rotation: world.rotation.contains(id),
        })
    }

    /// Status line data describing a single player.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PlayerSummary {
        /// Identifier of the player.
        pub id: PlayerId,
        /// Display name of the player.
        pub name: String,
        /// Source of the player's commands.
        pub controller: Controller,
        /// Number of living units.
        pub units: usize,
        /// Number of standing cities.
        pub cities: usize,
        /// Number of tiles the player has explored.
        pub revealed_tiles: usize,
        /// Whether the player is still taking turns.
        pub in_rotation: bool,
    }
}
