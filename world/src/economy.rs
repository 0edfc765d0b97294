//! City growth, territory, unit production and founding.

use frontier_core::{CityId, Coord, Event, PlayerId, RuleViolation, UnitId, UnitKind};

use crate::{
    entities::CITY_GROWTH_BONUS,
    map::{CITY_ATTACK_MODIFIER, CITY_MOVEMENT_MODIFIER},
    City, Tile, World,
};

/// Per-turn accrual for a city: production, growth and regeneration.
///
/// Returns `true` when the population grew.
pub(crate) fn increment(city: &mut City) -> bool {
    city.reserve = city.reserve.saturating_add(city.production);
    city.turns_until_growth = city.turns_until_growth.saturating_sub(1);

    let grew = city.turns_until_growth == 0;
    if grew {
        city.population = city.population.saturating_add(1);
        let population = city.population;
        city.turns_until_growth = population * 3 + population * population / 3;
        city.production = city.production.saturating_add(CITY_GROWTH_BONUS);
        city.max_hp += f64::from(CITY_GROWTH_BONUS);
        city.hp += f64::from(CITY_GROWTH_BONUS);
    }

    if city.hp < city.max_hp {
        city.hp = (city.hp + city.max_hp / 20.0).min(city.max_hp);
    }
    grew
}

/// Claims every unowned tile within the city's control radius.
pub(crate) fn claim_territory(world: &mut World, city_id: CityId, out_events: &mut Vec<Event>) {
    let Some(city) = world.cities.get(city_id) else {
        return;
    };
    let radius = i32::try_from(city.control_radius()).unwrap_or(0);
    let centre = city.coord();

    let mut unlocks = Vec::new();
    for coord in centre.square(radius) {
        let Some(tile) = world.grid.tile_mut(coord) else {
            continue;
        };
        if tile.owner_city.is_some() {
            continue;
        }
        tile.owner_city = Some(city_id);
        if let Some(resource) = tile.resource() {
            unlocks.push(resource.unlocks());
        }
        out_events.push(Event::TileClaimed {
            city: city_id,
            at: coord,
        });
    }
    unlock(world, city_id, unlocks, out_events);
}

fn unlock(world: &mut World, city_id: CityId, kinds: Vec<UnitKind>, out_events: &mut Vec<Event>) {
    let Some(city) = world.cities.get_mut(city_id) else {
        return;
    };
    for kind in kinds {
        if city.unlocked.insert(kind) {
            tracing::debug!(city = city_id.get(), %kind, "unit kind unlocked");
            out_events.push(Event::UnitUnlocked {
                city: city_id,
                kind,
            });
        }
    }
}

/// Handles a produce request issued against the city on `at`.
pub(crate) fn produce_unit(
    world: &mut World,
    at: Coord,
    kind: UnitKind,
    out_events: &mut Vec<Event>,
) -> Result<bool, RuleViolation> {
    let acting = world.acting_player()?;
    let city_id = world
        .grid
        .tile(at)
        .filter(|tile| tile.is_city())
        .and_then(Tile::owner_city)
        .ok_or(RuleViolation::NoCity)?;
    let owner = world
        .cities
        .get(city_id)
        .map(City::owner)
        .ok_or(RuleViolation::NoCity)?;
    if owner != acting {
        return Err(RuleViolation::NotYourTurn);
    }
    let _ = produce(world, city_id, kind, out_events)?;
    Ok(true)
}

/// Spends the city's reserve on a unit placed on the city tile.
///
/// The new unit cannot move until its owner's next turn.
pub(crate) fn produce(
    world: &mut World,
    city_id: CityId,
    kind: UnitKind,
    out_events: &mut Vec<Event>,
) -> Result<UnitId, RuleViolation> {
    let city = world.cities.get(city_id).ok_or(RuleViolation::NoCity)?;
    let cost = kind.stats().cost;
    if city.reserve() < cost {
        return Err(RuleViolation::InsufficientProduction);
    }
    let (at, owner) = (city.coord(), city.owner());
    if world.grid.tile(at).and_then(Tile::occupant).is_some() {
        return Err(RuleViolation::TileOccupied);
    }
    if !city.can_produce(kind) {
        return Err(RuleViolation::KindLocked);
    }

    if let Some(city) = world.cities.get_mut(city_id) {
        city.reserve -= cost;
        if kind == UnitKind::Settler {
            city.population = city.population.saturating_sub(1);
        }
    }
    let unit = world.attach_unit(owner, kind, at);
    if let Some(produced) = world.units.get_mut(unit) {
        produced.remaining_movement = 0;
    }

    tracing::debug!(city = city_id.get(), unit = unit.get(), %kind, "unit produced");
    out_events.push(Event::UnitProduced {
        unit,
        city: city_id,
        kind,
    });
    Ok(unit)
}

/// Turns the settler standing on `at` into a city and garrisons it with a
/// free scout when the new reserve allows.
pub(crate) fn found_city(
    world: &mut World,
    at: Coord,
    out_events: &mut Vec<Event>,
) -> Result<bool, RuleViolation> {
    let acting = world.acting_player()?;
    let tile = world.grid.tile(at).ok_or(RuleViolation::OutOfBounds)?;
    let settler = tile
        .occupant()
        .and_then(|id| world.units.get(id))
        .filter(|unit| unit.kind() == UnitKind::Settler)
        .ok_or(RuleViolation::NoSettler)?;
    if settler.owner() != acting {
        return Err(RuleViolation::NotYourTurn);
    }
    if !settler.can_found() {
        return Err(RuleViolation::NoCharge);
    }
    if tile.owner_city().is_some() {
        return Err(RuleViolation::TerritoryClaimed);
    }

    let (settler_id, owner) = (settler.id(), settler.owner());
    if let Some(settler) = world.units.get_mut(settler_id) {
        settler.can_found = false;
    }
    let _ = world.detach_unit(settler_id);

    let city = establish_city(world, owner, at, out_events);
    if let Err(reason) = produce(world, city, UnitKind::Scout, out_events) {
        tracing::debug!(city = city.get(), %reason, "no free scout");
    }
    Ok(true)
}

/// Creates a city on the tile, claims the tile and applies city modifiers.
pub(crate) fn establish_city(
    world: &mut World,
    owner: PlayerId,
    at: Coord,
    out_events: &mut Vec<Event>,
) -> CityId {
    let id = world.cities.allocate();
    world.cities.insert(id, City::new(id, owner, at));

    let mut unlocks = Vec::new();
    if let Some(tile) = world.grid.tile_mut(at) {
        tile.is_city = true;
        tile.owner_city = Some(id);
        tile.movement_modifier = CITY_MOVEMENT_MODIFIER;
        tile.attack_modifier = CITY_ATTACK_MODIFIER;
        if let Some(resource) = tile.resource() {
            unlocks.push(resource.unlocks());
        }
    }
    if let Some(player) = world.player_mut(owner) {
        player.cities.push(id);
    }

    tracing::info!(city = id.get(), owner = owner.get(), %at, "city founded");
    out_events.push(Event::CityFounded {
        city: id,
        owner,
        at,
    });
    out_events.push(Event::TileClaimed { city: id, at });
    unlock(world, id, unlocks, out_events);
    id
}
