//! Units, cities, players and the registries that own them.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use frontier_core::{CityId, Controller, Coord, PlayerId, UnitId, UnitKind};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Production rate of a freshly founded city.
pub(crate) const CITY_STARTING_PRODUCTION: u32 = 50;
/// Production reserve of a freshly founded city.
pub(crate) const CITY_STARTING_RESERVE: u32 = 400;
/// Hit points of a freshly founded city.
pub(crate) const CITY_STARTING_HP: f64 = 100.0;
/// Turns a freshly founded city waits before its first growth.
pub(crate) const CITY_STARTING_GROWTH: u32 = 5;
/// Flat bonus applied to production and hit points on every growth.
pub(crate) const CITY_GROWTH_BONUS: u32 = 10;
/// Largest radius a city's territory can reach.
pub const MAX_CONTROL_RADIUS: u32 = 3;

/// Unit standing on the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    kind: UnitKind,
    owner: PlayerId,
    pub(crate) position: Coord,
    pub(crate) hp: f64,
    pub(crate) remaining_movement: i32,
    pub(crate) can_found: bool,
}

impl Unit {
    pub(crate) fn new(id: UnitId, kind: UnitKind, owner: PlayerId, position: Coord) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            owner,
            position,
            hp: stats.max_hp,
            remaining_movement: stats.movement,
            can_found: kind == UnitKind::Settler,
        }
    }

    /// Identifier of the unit.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Kind of the unit.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Player commanding the unit.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Tile the unit occupies.
    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> f64 {
        self.hp
    }

    /// Hit points of a fully healed unit of this kind.
    #[must_use]
    pub const fn max_hp(&self) -> f64 {
        self.kind.stats().max_hp
    }

    /// Movement points left this turn.
    #[must_use]
    pub const fn remaining_movement(&self) -> i32 {
        self.remaining_movement
    }

    /// Movement points restored at the start of every owner turn.
    #[must_use]
    pub const fn max_movement(&self) -> i32 {
        self.kind.stats().movement
    }

    /// Radius of the square the unit reveals.
    #[must_use]
    pub const fn sight(&self) -> i32 {
        self.kind.stats().sight
    }

    /// Base attack value before terrain modifiers.
    #[must_use]
    pub const fn attack(&self) -> f64 {
        self.kind.stats().attack
    }

    /// Reports whether the unit still holds its city-founding charge.
    #[must_use]
    pub const fn can_found(&self) -> bool {
        self.can_found
    }

    pub(crate) fn reset_movement(&mut self) {
        self.remaining_movement = self.max_movement();
    }

    pub(crate) fn heal(&mut self) {
        let max = self.max_hp();
        self.hp = (self.hp + max / 20.0).min(max);
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.hp.trunc() <= 0.0
    }
}

/// City built on a tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    id: CityId,
    owner: PlayerId,
    coord: Coord,
    pub(crate) production: u32,
    pub(crate) reserve: u32,
    pub(crate) population: u32,
    pub(crate) hp: f64,
    pub(crate) max_hp: f64,
    pub(crate) turns_until_growth: u32,
    pub(crate) unlocked: BTreeSet<UnitKind>,
}

impl City {
    pub(crate) fn new(id: CityId, owner: PlayerId, coord: Coord) -> Self {
        Self {
            id,
            owner,
            coord,
            production: CITY_STARTING_PRODUCTION,
            reserve: CITY_STARTING_RESERVE,
            population: 1,
            hp: CITY_STARTING_HP,
            max_hp: CITY_STARTING_HP,
            turns_until_growth: CITY_STARTING_GROWTH,
            unlocked: UnitKind::BASELINE.into_iter().collect(),
        }
    }

    /// Identifier of the city.
    #[must_use]
    pub const fn id(&self) -> CityId {
        self.id
    }

    /// Player owning the city.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Tile the city is built on.
    #[must_use]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Production added to the reserve every owner turn.
    #[must_use]
    pub const fn production(&self) -> u32 {
        self.production
    }

    /// Production accumulated towards new units.
    #[must_use]
    pub const fn reserve(&self) -> u32 {
        self.reserve
    }

    /// Population, which doubles as the city level.
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.population
    }

    /// Chebyshev radius of the territory the city claims.
    #[must_use]
    pub fn control_radius(&self) -> u32 {
        (self.population / 2).min(MAX_CONTROL_RADIUS)
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> f64 {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> f64 {
        self.max_hp
    }

    /// Owner turns left until the population grows.
    #[must_use]
    pub const fn turns_until_growth(&self) -> u32 {
        self.turns_until_growth
    }

    /// Unit kinds the city can produce.
    #[must_use]
    pub fn unlocked(&self) -> &BTreeSet<UnitKind> {
        &self.unlocked
    }

    /// Reports whether the city may produce the kind.
    #[must_use]
    pub fn can_produce(&self, kind: UnitKind) -> bool {
        self.unlocked.contains(&kind)
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.hp.trunc() <= 0.0
    }
}

/// Participant in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    controller: Controller,
    pub(crate) units: Vec<UnitId>,
    pub(crate) cities: Vec<CityId>,
}

impl Player {
    pub(crate) fn new(id: PlayerId, name: String, controller: Controller) -> Self {
        Self {
            id,
            name,
            controller,
            units: Vec::new(),
            cities: Vec::new(),
        }
    }

    /// Identifier of the player.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name of the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source of the player's commands.
    #[must_use]
    pub const fn controller(&self) -> Controller {
        self.controller
    }

    /// Reports whether the player is driven by the AI.
    #[must_use]
    pub fn is_computer(&self) -> bool {
        self.controller == Controller::Computer
    }

    /// Units the player commands, in the order they were acquired.
    #[must_use]
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Cities the player owns, in the order they were founded.
    #[must_use]
    pub fn cities(&self) -> &[CityId] {
        &self.cities
    }
}

/// Entity stored inside a [`Registry`].
pub(crate) trait Entity {
    /// Identifier type addressing the entity.
    type Id: Copy + Ord + fmt::Debug + Serialize + DeserializeOwned;

    /// Builds an identifier from the registry's counter.
    fn id_from(value: u32) -> Self::Id;
}

impl Entity for Unit {
    type Id = UnitId;

    fn id_from(value: u32) -> UnitId {
        UnitId::new(value)
    }
}

impl Entity for City {
    type Id = CityId;

    fn id_from(value: u32) -> CityId {
        CityId::new(value)
    }
}

/// Arena of entities addressed by identifiers that are never reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Registry<T: Entity> {
    entries: BTreeMap<T::Id, T>,
    next_id: u32,
}

impl<T: Entity> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub(crate) fn allocate(&mut self) -> T::Id {
        let id = T::id_from(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub(crate) fn insert(&mut self, id: T::Id, entity: T) {
        let _ = self.entries.insert(id, entity);
    }

    pub(crate) fn get(&self, id: T::Id) -> Option<&T> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: T::Id) -> Option<T> {
        self.entries.remove(&id)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }
}
