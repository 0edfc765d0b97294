//! Tile grid owned by the world.

use std::collections::BTreeSet;

use frontier_core::{CityId, Coord, MapLayout, PlayerId, Resource, Terrain, UnitId};
use serde::{Deserialize, Serialize};

/// Movement modifier written onto a tile when a city is founded on it.
pub(crate) const CITY_MOVEMENT_MODIFIER: i32 = 0;

/// Attack modifier written onto a tile when a city is founded on it.
pub(crate) const CITY_ATTACK_MODIFIER: f64 = 1.25;

/// Single square of the map together with everything standing on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    coord: Coord,
    terrain: Terrain,
    resource: Option<Resource>,
    pub(crate) movement_modifier: i32,
    pub(crate) attack_modifier: f64,
    pub(crate) owner_city: Option<CityId>,
    pub(crate) is_city: bool,
    pub(crate) occupant: Option<UnitId>,
    pub(crate) revealed: BTreeSet<PlayerId>,
}

impl Tile {
    fn new(coord: Coord, terrain: Terrain, resource: Option<Resource>) -> Self {
        Self {
            coord,
            terrain,
            resource,
            movement_modifier: terrain.movement_modifier(),
            attack_modifier: terrain.attack_modifier(),
            owner_city: None,
            is_city: false,
            occupant: None,
            revealed: BTreeSet::new(),
        }
    }

    /// Location of the tile.
    #[must_use]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Terrain generated for the tile.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Resource deposit on the tile, if any.
    #[must_use]
    pub const fn resource(&self) -> Option<Resource> {
        self.resource
    }

    /// Penalty added to the base cost of entering the tile.
    #[must_use]
    pub const fn movement_modifier(&self) -> i32 {
        self.movement_modifier
    }

    /// Movement points a unit spends to enter the tile.
    #[must_use]
    pub const fn movement_cost(&self) -> i32 {
        1 - self.movement_modifier
    }

    /// Multiplier applied to attacks launched from the tile.
    #[must_use]
    pub const fn attack_modifier(&self) -> f64 {
        self.attack_modifier
    }

    /// City whose territory covers the tile.
    #[must_use]
    pub const fn owner_city(&self) -> Option<CityId> {
        self.owner_city
    }

    /// Reports whether a city is built on the tile.
    #[must_use]
    pub const fn is_city(&self) -> bool {
        self.is_city
    }

    /// Unit standing on the tile.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// Reports whether the player has ever had the tile in sight.
    #[must_use]
    pub fn is_revealed_to(&self, player: PlayerId) -> bool {
        self.revealed.contains(&player)
    }

    /// Players the tile has been revealed to.
    #[must_use]
    pub fn revealed_to(&self) -> &BTreeSet<PlayerId> {
        &self.revealed
    }
}

/// Square grid of tiles stored row by row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds the grid from a generated or parsed layout.
    pub(crate) fn from_layout(layout: MapLayout) -> Self {
        let size = layout.size();
        let coords: Vec<Coord> = layout.iter().map(|(coord, _)| coord).collect();
        let tiles = coords
            .into_iter()
            .zip(layout.into_tiles())
            .map(|(coord, spec)| Tile::new(coord, spec.terrain, spec.resource))
            .collect();
        Self { size, tiles }
    }

    /// Width and height of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Tile at the coordinate; coordinates off the map have no tile.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn tile_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index(coord).and_then(|index| self.tiles.get_mut(index))
    }

    /// Iterates over every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        let x = u32::try_from(coord.x()).ok()?;
        let y = u32::try_from(coord.y()).ok()?;
        if x < self.size && y < self.size {
            let width = usize::try_from(self.size).ok()?;
            Some(usize::try_from(y).ok()? * width + usize::try_from(x).ok()?)
        } else {
            None
        }
    }
}
