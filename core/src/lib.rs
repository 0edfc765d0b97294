#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Frontier engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the turn/AI systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what changed. Rule violations never surface as errors: a rejected command
//! reports `false` and a [`RuleViolation`] event, while setup failures are
//! typed [`SetupError`] values.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Movement modifier applied to tiles that cannot be entered.
pub const IMPASSABLE_PENALTY: i32 = -1000;

/// Location of a single tile expressed as x and y coordinates.
///
/// Coordinates are signed so neighbour arithmetic near the map edge stays
/// well defined; lookups outside the grid simply find no tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical index of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Computes the Chebyshev distance, `max(|dx|, |dy|)`, between two coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Delta that leads from `self` to `other`.
    #[must_use]
    pub const fn delta_to(self, other: Coord) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Enumerates the eight surrounding coordinates, x-major then y-minor.
    pub fn neighbours(self) -> impl Iterator<Item = Coord> {
        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Enumerates every coordinate in the inclusive square of the given radius.
    pub fn square(self, radius: i32) -> impl Iterator<Item = Coord> {
        (-radius..=radius)
            .flat_map(move |dx| (-radius..=radius).map(move |dy| (dx, dy)))
            .map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a unit. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a city. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CityId(u32);

impl CityId {
    /// Creates a new city identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Terrain kinds a tile can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open ground with no movement penalty.
    Field,
    /// Raised ground that slows movement and favours attackers.
    Hill,
    /// Wetland that slows movement and weakens attackers.
    Swamp,
    /// Impassable water.
    Water,
    /// Impassable mountain.
    Mountain,
}

impl Terrain {
    /// Every terrain kind in declaration order.
    pub const ALL: [Terrain; 5] = [
        Terrain::Field,
        Terrain::Hill,
        Terrain::Swamp,
        Terrain::Water,
        Terrain::Mountain,
    ];

    /// Integer penalty added to the base movement cost of entering the tile.
    ///
    /// Values are zero or negative; the cost of entering is `1 - modifier`.
    #[must_use]
    pub const fn movement_modifier(self) -> i32 {
        match self {
            Self::Field => 0,
            Self::Hill | Self::Swamp => -1,
            Self::Water | Self::Mountain => IMPASSABLE_PENALTY,
        }
    }

    /// Multiplier applied to the attack of a unit standing on the tile.
    #[must_use]
    pub const fn attack_modifier(self) -> f64 {
        match self {
            Self::Field => 1.0,
            Self::Hill => 1.25,
            Self::Swamp => 0.75,
            Self::Water | Self::Mountain => 0.0,
        }
    }

    /// Reports whether any unit could ever enter the terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Water | Self::Mountain)
    }

    /// Token used by the textual map description format.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Hill => "hill",
            Self::Swamp => "swamp",
            Self::Water => "water",
            Self::Mountain => "mountain",
        }
    }

    /// Parses a terrain token from the textual map description format.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|terrain| terrain.token() == token)
    }
}

/// Strategic resources that unlock additional unit kinds for a city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Unlocks [`UnitKind::Militia`].
    Wheat,
    /// Unlocks [`UnitKind::Swordsman`].
    Iron,
    /// Unlocks [`UnitKind::Cavalry`].
    Horse,
}

impl Resource {
    /// Unit kind a city gains access to once it owns a tile with the resource.
    #[must_use]
    pub const fn unlocks(self) -> UnitKind {
        match self {
            Self::Wheat => UnitKind::Militia,
            Self::Iron => UnitKind::Swordsman,
            Self::Horse => UnitKind::Cavalry,
        }
    }

    /// Token used by the textual map description format.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Wheat => "w",
            Self::Iron => "i",
            Self::Horse => "h",
        }
    }

    /// Parses a resource token from the textual map description format.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "w" => Some(Self::Wheat),
            "i" => Some(Self::Iron),
            "h" => Some(Self::Horse),
            _ => None,
        }
    }
}

/// Fixed stat bundle shared by every unit of a kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitStats {
    /// Hit points of a freshly produced unit.
    pub max_hp: f64,
    /// Movement points restored at the start of every owner turn.
    pub movement: i32,
    /// Radius of the square revealed around the unit.
    pub sight: i32,
    /// Damage dealt by an attack or counterattack before terrain modifiers.
    pub attack: f64,
    /// Production a city spends to produce the unit.
    pub cost: u32,
}

/// Kinds of units a player can command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Civilian that can found a single city.
    Settler,
    /// Fast, far-sighted explorer.
    Scout,
    /// Baseline melee unit.
    Warrior,
    /// Cheap defensive unit unlocked by wheat.
    Militia,
    /// Heavy melee unit unlocked by iron.
    Swordsman,
    /// Mobile strike unit unlocked by horses.
    Cavalry,
}

impl UnitKind {
    /// Every unit kind in declaration order.
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Settler,
        UnitKind::Scout,
        UnitKind::Warrior,
        UnitKind::Militia,
        UnitKind::Swordsman,
        UnitKind::Cavalry,
    ];

    /// Kinds every city can produce without owning any resource.
    pub const BASELINE: [UnitKind; 3] = [UnitKind::Warrior, UnitKind::Scout, UnitKind::Settler];

    /// Looks up the stat bundle for the kind.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        match self {
            Self::Settler => UnitStats {
                max_hp: 1.0,
                movement: 2,
                sight: 2,
                attack: 0.0,
                cost: 2000,
            },
            Self::Scout => UnitStats {
                max_hp: 50.0,
                movement: 4,
                sight: 4,
                attack: 15.0,
                cost: 300,
            },
            Self::Warrior => UnitStats {
                max_hp: 100.0,
                movement: 2,
                sight: 2,
                attack: 25.0,
                cost: 600,
            },
            Self::Militia => UnitStats {
                max_hp: 50.0,
                movement: 1,
                sight: 1,
                attack: 10.0,
                cost: 100,
            },
            Self::Swordsman => UnitStats {
                max_hp: 150.0,
                movement: 1,
                sight: 1,
                attack: 35.0,
                cost: 900,
            },
            Self::Cavalry => UnitStats {
                max_hp: 100.0,
                movement: 3,
                sight: 2,
                attack: 30.0,
                cost: 1000,
            },
        }
    }

    /// Human readable label for the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Settler => "Settler",
            Self::Scout => "Scout",
            Self::Warrior => "Warrior",
            Self::Militia => "Militia",
            Self::Swordsman => "Swordsman",
            Self::Cavalry => "Cavalry",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terrain and resource description of a single generated tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    /// Terrain kind of the tile.
    pub terrain: Terrain,
    /// Resource deposit on the tile, if any.
    pub resource: Option<Resource>,
}

impl TileSpec {
    /// Creates a tile description without a resource.
    #[must_use]
    pub const fn plain(terrain: Terrain) -> Self {
        Self {
            terrain,
            resource: None,
        }
    }

    /// Creates a tile description bearing the provided resource.
    #[must_use]
    pub const fn with_resource(terrain: Terrain, resource: Resource) -> Self {
        Self {
            terrain,
            resource: Some(resource),
        }
    }
}

/// Square grid of typed tiles produced by map generation.
///
/// Tiles are stored row by row: index `y * size + x`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLayout {
    size: u32,
    tiles: Vec<TileSpec>,
}

impl MapLayout {
    /// Creates a layout of the given size where every tile shares `terrain`.
    #[must_use]
    pub fn filled(size: u32, terrain: Terrain) -> Self {
        let count = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(0);
        Self {
            size,
            tiles: vec![TileSpec::plain(terrain); count],
        }
    }

    /// Creates a layout from row-major tiles, rejecting mismatched lengths.
    pub fn from_tiles(size: u32, tiles: Vec<TileSpec>) -> Result<Self, MapParseError> {
        let expected = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(usize::MAX);
        if size == 0 {
            return Err(MapParseError::InvalidSize(size.to_string()));
        }
        if tiles.len() != expected {
            return Err(MapParseError::TileCount {
                expected,
                found: tiles.len(),
            });
        }
        Ok(Self { size, tiles })
    }

    /// Width and height of the square layout.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the tile description at the coordinate, if it lies on the map.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&TileSpec> {
        self.index(coord).and_then(|index| self.tiles.get(index))
    }

    /// Overwrites the tile at the coordinate. Returns `false` when out of bounds.
    pub fn set_tile(&mut self, coord: Coord, spec: TileSpec) -> bool {
        match self.index(coord).and_then(|index| self.tiles.get_mut(index)) {
            Some(slot) => {
                *slot = spec;
                true
            }
            None => false,
        }
    }

    /// Iterates over every tile with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &TileSpec)> {
        let size = self.size;
        self.tiles.iter().enumerate().map(move |(index, spec)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let x = i32::try_from(index % size).unwrap_or(i32::MAX);
            let y = i32::try_from(index / size).unwrap_or(i32::MAX);
            (Coord::new(x, y), spec)
        })
    }

    /// Consumes the layout, yielding its row-major tiles.
    #[must_use]
    pub fn into_tiles(self) -> Vec<TileSpec> {
        self.tiles
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

/// Default start coordinates for a square map: the four inner corners.
#[must_use]
pub fn default_start_coords(size: u32) -> [Coord; 4] {
    let far = i32::try_from(size).unwrap_or(i32::MAX).saturating_sub(2);
    [
        Coord::new(1, 1),
        Coord::new(far, far),
        Coord::new(far, 1),
        Coord::new(1, far),
    ]
}

/// Who issues commands for a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    /// Commands arrive from an external UI.
    Human,
    /// Commands are issued by the AI controller.
    Computer,
}

/// Description of a single player taking part in a new game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display identifier of the player.
    pub name: String,
    /// Source of the player's commands.
    pub controller: Controller,
}

impl PlayerSetup {
    /// Creates a human player description.
    #[must_use]
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: Controller::Human,
        }
    }

    /// Creates a computer player description.
    #[must_use]
    pub fn computer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: Controller::Computer,
        }
    }
}

/// Where the tile grid of a new game comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapSource {
    /// Procedurally generated square map.
    Procedural {
        /// Width and height of the map.
        size: u32,
        /// Seed driving the deterministic generator.
        seed: u64,
    },
    /// Externally authored map in the textual description format.
    Description {
        /// Full contents of the description.
        text: String,
    },
    /// Pre-built layout supplied directly by the caller.
    Layout {
        /// Layout to use verbatim.
        layout: MapLayout,
    },
}

/// Everything required to start a new game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// Players in rotation order; the first one moves first.
    pub players: Vec<PlayerSetup>,
    /// Source of the tile grid.
    pub map: MapSource,
    /// Start coordinates matched to players by position. Empty selects the
    /// default inner corners of the map.
    #[serde(default)]
    pub starts: Vec<Coord>,
}

impl GameSetup {
    /// One human player facing a single computer opponent.
    #[must_use]
    pub fn single_player(size: u32, seed: u64) -> Self {
        Self {
            players: vec![PlayerSetup::human("Player 1"), PlayerSetup::computer("CPU Player")],
            map: MapSource::Procedural { size, seed },
            starts: Vec::new(),
        }
    }

    /// `count` human players sharing one seat.
    #[must_use]
    pub fn hot_seat(count: usize, size: u32, seed: u64) -> Self {
        Self {
            players: (1..=count)
                .map(|index| PlayerSetup::human(format!("Player {index}")))
                .collect(),
            map: MapSource::Procedural { size, seed },
            starts: Vec::new(),
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Moves a unit one tile, attacking whatever enemy occupies the destination.
    MoveUnit {
        /// Unit attempting the action.
        unit: UnitId,
        /// Destination tile, at most one tile away on both axes.
        to: Coord,
    },
    /// Asks the city built on `city` to produce a unit.
    ProduceUnit {
        /// Coordinate of the producing city's tile.
        city: Coord,
        /// Kind of unit requested.
        kind: UnitKind,
    },
    /// Asks the settler standing on `at` to found a city there.
    FoundCity {
        /// Coordinate of the settler.
        at: Coord,
    },
    /// Runs turn-start housekeeping for the current player if it has not run yet.
    StartTurn,
    /// Ends the current player's turn and starts the next one.
    EndTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A player's turn-start housekeeping completed.
    TurnStarted {
        /// Player whose turn began.
        player: PlayerId,
        /// Round the turn belongs to.
        round: u32,
    },
    /// The rotation wrapped back to its first player.
    RoundAdvanced {
        /// Round that just began.
        round: u32,
    },
    /// A unit relocated between two tiles.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Tile the unit left.
        from: Coord,
        /// Tile the unit entered.
        to: Coord,
    },
    /// A unit attacked another unit.
    UnitAttacked {
        /// Attacking unit.
        attacker: UnitId,
        /// Defending unit.
        defender: UnitId,
        /// Damage applied to the defender.
        damage: f64,
        /// Damage applied to the attacker by the counterattack, if one happened.
        counter_damage: Option<f64>,
    },
    /// A unit attacked a city.
    CityAttacked {
        /// Attacking unit.
        attacker: UnitId,
        /// City that took the damage.
        city: CityId,
        /// Damage applied to the city.
        damage: f64,
    },
    /// A unit was removed from the board.
    UnitDestroyed {
        /// Unit that was removed.
        unit: UnitId,
        /// Former owner of the unit.
        owner: PlayerId,
        /// Tile the unit occupied.
        at: Coord,
    },
    /// A settler founded a city.
    CityFounded {
        /// Newly created city.
        city: CityId,
        /// Owner of the city.
        owner: PlayerId,
        /// Tile the city was built on.
        at: Coord,
    },
    /// A city was destroyed by an attack.
    CityDestroyed {
        /// City that was destroyed.
        city: CityId,
        /// Former owner of the city.
        owner: PlayerId,
        /// Tile the city stood on.
        at: Coord,
    },
    /// A city's population increased.
    CityGrew {
        /// City that grew.
        city: CityId,
        /// Population after growth.
        population: u32,
    },
    /// A city claimed a previously unowned tile.
    TileClaimed {
        /// Claiming city.
        city: CityId,
        /// Claimed tile.
        at: Coord,
    },
    /// A city gained the ability to produce a unit kind.
    UnitUnlocked {
        /// City that gained the kind.
        city: CityId,
        /// Newly producible kind.
        kind: UnitKind,
    },
    /// A city produced a unit.
    UnitProduced {
        /// Newly created unit.
        unit: UnitId,
        /// Producing city.
        city: CityId,
        /// Kind of the new unit.
        kind: UnitKind,
    },
    /// A player lost its last city and left the rotation.
    PlayerEliminated {
        /// Eliminated player.
        player: PlayerId,
    },
    /// Exactly one player remains in the rotation.
    GameOver {
        /// Sole surviving player.
        winner: PlayerId,
    },
    /// A command broke a game rule and left the world unchanged.
    CommandRejected {
        /// Rule that was violated.
        reason: RuleViolation,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RuleViolation {
    /// No living unit carries the identifier.
    #[error("unit does not exist")]
    UnknownUnit,
    /// The unit or city belongs to a player other than the current one.
    #[error("it is not the owner's turn")]
    NotYourTurn,
    /// The target lies off the map.
    #[error("target tile is off the map")]
    OutOfBounds,
    /// The target is more than one tile away on some axis.
    #[error("target tile is not adjacent")]
    NotAdjacent,
    /// The destination costs more movement than the unit has left.
    #[error("not enough movement left")]
    InsufficientMovement,
    /// The destination holds a unit of the acting player.
    #[error("destination holds a friendly unit")]
    FriendlyOccupied,
    /// No city is built on the requested tile.
    #[error("no city on tile")]
    NoCity,
    /// The city's production reserve does not cover the unit cost.
    #[error("not enough production")]
    InsufficientProduction,
    /// The city tile already holds a unit.
    #[error("city tile is occupied")]
    TileOccupied,
    /// The city has not unlocked the requested unit kind.
    #[error("unit kind is locked")]
    KindLocked,
    /// No settler stands on the requested tile.
    #[error("no settler on tile")]
    NoSettler,
    /// The settler has already used its founding charge.
    #[error("settler has no charge left")]
    NoCharge,
    /// The tile already lies inside a city's territory.
    #[error("tile is already claimed by a city")]
    TerritoryClaimed,
    /// The game has ended.
    #[error("the game is over")]
    GameOver,
}

/// Failures raised while parsing a textual map description.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapParseError {
    /// The description did not start with a size line.
    #[error("map description is missing the size line")]
    MissingSize,
    /// The size line was not a positive integer.
    #[error("invalid map size '{0}'")]
    InvalidSize(String),
    /// A tile line named an unknown terrain.
    #[error("line {line}: unknown terrain '{token}'")]
    UnknownTerrain {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A tile line named an unknown resource.
    #[error("line {line}: unknown resource '{token}'")]
    UnknownResource {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// The number of tile lines did not match the declared size.
    #[error("expected {expected} tiles, found {found}")]
    TileCount {
        /// Tiles required by the declared size.
        expected: usize,
        /// Tiles present in the description.
        found: usize,
    },
}

/// Failures raised while setting up a new game.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    /// The setup named no players.
    #[error("a game needs at least one player")]
    NoPlayers,
    /// More players than start coordinates.
    #[error("{players} players but only {starts} start coordinates")]
    TooManyPlayers {
        /// Players requested.
        players: usize,
        /// Start coordinates available.
        starts: usize,
    },
    /// A placement coordinate lies off the map.
    #[error("coordinate {0} is off the map")]
    OutOfBounds(Coord),
    /// A placement coordinate is water or mountain.
    #[error("coordinate {0} is impassable")]
    Impassable(Coord),
    /// Two players share a start coordinate.
    #[error("start coordinate {0} is used twice")]
    DuplicateStart(Coord),
    /// A unit already stands on the placement coordinate.
    #[error("coordinate {0} already holds a unit")]
    Occupied(Coord),
    /// The placement coordinate already belongs to a city's territory.
    #[error("coordinate {0} is already claimed by a city")]
    Claimed(Coord),
    /// The referenced player does not exist.
    #[error("player {} does not exist", .0.get())]
    UnknownPlayer(PlayerId),
    /// The map could not be produced.
    #[error("invalid map: {0}")]
    Map(#[from] MapParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_distance_matches_expectation() {
        let origin = Coord::new(1, 1);
        let destination = Coord::new(4, 3);
        assert_eq!(origin.chebyshev_distance(destination), 3);
        assert_eq!(destination.chebyshev_distance(origin), 3);
        assert_eq!(origin.chebyshev_distance(origin), 0);
    }

    #[test]
    fn neighbours_cover_eight_tiles_in_x_major_order() {
        let neighbours: Vec<Coord> = Coord::new(5, 5).neighbours().collect();
        assert_eq!(neighbours.len(), 8);
        assert_eq!(neighbours[0], Coord::new(4, 4));
        assert_eq!(neighbours[1], Coord::new(4, 5));
        assert_eq!(neighbours[7], Coord::new(6, 6));
        assert!(!neighbours.contains(&Coord::new(5, 5)));
    }

    #[test]
    fn square_includes_centre_and_edges() {
        let square: Vec<Coord> = Coord::new(0, 0).square(2).collect();
        assert_eq!(square.len(), 25);
        assert!(square.contains(&Coord::new(-2, 2)));
        assert!(square.contains(&Coord::new(0, 0)));
    }

    #[test]
    fn terrain_tokens_parse_back() {
        for terrain in Terrain::ALL {
            assert_eq!(Terrain::from_token(terrain.token()), Some(terrain));
        }
        assert_eq!(Terrain::from_token("lava"), None);
    }

    #[test]
    fn impassable_terrain_carries_large_penalty() {
        assert_eq!(Terrain::Water.movement_modifier(), IMPASSABLE_PENALTY);
        assert_eq!(Terrain::Mountain.movement_modifier(), IMPASSABLE_PENALTY);
        assert!(!Terrain::Mountain.is_passable());
        assert!(Terrain::Swamp.is_passable());
    }

    #[test]
    fn resources_unlock_matching_kinds() {
        assert_eq!(Resource::Wheat.unlocks(), UnitKind::Militia);
        assert_eq!(Resource::Iron.unlocks(), UnitKind::Swordsman);
        assert_eq!(Resource::Horse.unlocks(), UnitKind::Cavalry);
        assert_eq!(Resource::from_token("h"), Some(Resource::Horse));
        assert_eq!(Resource::from_token(""), None);
    }

    #[test]
    fn unit_stat_table_matches_rules() {
        let warrior = UnitKind::Warrior.stats();
        assert_eq!(warrior.cost, 600);
        assert_eq!(warrior.movement, 2);
        assert!((warrior.attack - 25.0).abs() < f64::EPSILON);
        assert!((UnitKind::Swordsman.stats().max_hp - 150.0).abs() < f64::EPSILON);
        assert_eq!(UnitKind::Militia.stats().cost, 100);
        assert_eq!(UnitKind::Scout.stats().sight, 4);
    }

    #[test]
    fn layout_rejects_mismatched_tile_count() {
        let error = MapLayout::from_tiles(3, vec![TileSpec::plain(Terrain::Field); 8]);
        assert_eq!(
            error,
            Err(MapParseError::TileCount {
                expected: 9,
                found: 8
            })
        );
    }

    #[test]
    fn layout_lookup_is_bounds_checked() {
        let mut layout = MapLayout::filled(4, Terrain::Field);
        assert!(layout.set_tile(Coord::new(3, 1), TileSpec::plain(Terrain::Hill)));
        assert!(!layout.set_tile(Coord::new(4, 1), TileSpec::plain(Terrain::Hill)));
        assert_eq!(
            layout.tile(Coord::new(3, 1)).map(|spec| spec.terrain),
            Some(Terrain::Hill)
        );
        assert!(layout.tile(Coord::new(-1, 0)).is_none());
        let (coord, _) = layout.iter().nth(7).expect("tile exists");
        assert_eq!(coord, Coord::new(3, 1));
    }

    #[test]
    fn default_starts_sit_inside_the_border() {
        let starts = default_start_coords(20);
        assert_eq!(starts[0], Coord::new(1, 1));
        assert_eq!(starts[1], Coord::new(18, 18));
        assert_eq!(starts[2], Coord::new(18, 1));
        assert_eq!(starts[3], Coord::new(1, 18));
    }

    #[test]
    fn command_round_trips_through_bincode() {
        let command = Command::MoveUnit {
            unit: UnitId::new(4),
            to: Coord::new(2, 3),
        };
        let bytes = bincode::serialize(&command).expect("serialize");
        let restored: Command = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, command);
    }
}
