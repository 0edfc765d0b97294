//! Attack resolution between units and against cities.

use frontier_core::{CityId, Event, UnitId};

use crate::{Tile, World};

/// Result of a unit attacking another unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AttackOutcome {
    /// The defender died. `occupy` is `false` when it stood on a city tile.
    DefenderDestroyed {
        /// Whether the attacker may move onto the vacated tile.
        occupy: bool,
    },
    /// Both units survived the exchange.
    Exchanged,
    /// The counterattack killed the attacker.
    AttackerDestroyed,
}

/// Damage a unit deals from the tile it stands on.
fn strike(world: &World, unit: UnitId) -> f64 {
    world.units.get(unit).map_or(0.0, |unit| {
        let modifier = world
            .grid
            .tile(unit.position())
            .map_or(1.0, Tile::attack_modifier);
        unit.attack() * modifier
    })
}

pub(crate) fn attack_unit(
    world: &mut World,
    attacker: UnitId,
    defender: UnitId,
    out_events: &mut Vec<Event>,
) -> AttackOutcome {
    let damage = strike(world, attacker);
    let Some(target) = world.units.get_mut(defender) else {
        return AttackOutcome::Exchanged;
    };
    target.hp -= damage;
    let defender_dead = target.is_dead();
    let defender_at = target.position();

    if defender_dead {
        let on_city = world.grid.tile(defender_at).is_some_and(Tile::is_city);
        out_events.push(Event::UnitAttacked {
            attacker,
            defender,
            damage,
            counter_damage: None,
        });
        tracing::debug!(
            attacker = attacker.get(),
            defender = defender.get(),
            damage,
            "defender destroyed"
        );
        remove_unit(world, defender, out_events);
        return AttackOutcome::DefenderDestroyed { occupy: !on_city };
    }

    let counter = strike(world, defender);
    out_events.push(Event::UnitAttacked {
        attacker,
        defender,
        damage,
        counter_damage: Some(counter),
    });
    tracing::debug!(
        attacker = attacker.get(),
        defender = defender.get(),
        damage,
        counter,
        "attack exchanged"
    );

    let attacker_dead = match world.units.get_mut(attacker) {
        Some(unit) => {
            unit.hp -= counter;
            unit.remaining_movement = 0;
            unit.is_dead()
        }
        None => true,
    };
    if attacker_dead {
        remove_unit(world, attacker, out_events);
        AttackOutcome::AttackerDestroyed
    } else {
        AttackOutcome::Exchanged
    }
}

pub(crate) fn attack_city(
    world: &mut World,
    attacker: UnitId,
    city_id: CityId,
    out_events: &mut Vec<Event>,
) {
    let damage = strike(world, attacker);
    if let Some(unit) = world.units.get_mut(attacker) {
        unit.remaining_movement = 0;
    }
    let Some(city) = world.cities.get_mut(city_id) else {
        return;
    };
    city.hp -= damage;
    let destroyed = city.is_destroyed();

    out_events.push(Event::CityAttacked {
        attacker,
        city: city_id,
        damage,
    });
    tracing::debug!(
        attacker = attacker.get(),
        city = city_id.get(),
        damage,
        "city attacked"
    );

    if destroyed {
        destroy_city(world, city_id, out_events);
    }
}

/// Removes a unit from the board and announces its death.
pub(crate) fn remove_unit(world: &mut World, id: UnitId, out_events: &mut Vec<Event>) {
    if let Some(unit) = world.detach_unit(id) {
        out_events.push(Event::UnitDestroyed {
            unit: id,
            owner: unit.owner(),
            at: unit.position(),
        });
    }
}

/// Razes the city and eliminates its owner when it was their last city.
///
/// Only the city's own tile is cleared; the rest of its territory stays
/// claimed.
fn destroy_city(world: &mut World, city_id: CityId, out_events: &mut Vec<Event>) {
    let Some(city) = world.cities.remove(city_id) else {
        return;
    };
    let (owner, at) = (city.owner(), city.coord());

    if let Some(tile) = world.grid.tile_mut(at) {
        tile.is_city = false;
        tile.owner_city = None;
    }

    let remaining = world.player_mut(owner).map_or(0, |player| {
        player.cities.retain(|entry| *entry != city_id);
        player.cities.len()
    });

    tracing::info!(city = city_id.get(), owner = owner.get(), %at, "city destroyed");
    out_events.push(Event::CityDestroyed {
        city: city_id,
        owner,
        at,
    });

    if remaining == 0 && world.rotation.remove(owner) {
        tracing::info!(player = owner.get(), "player eliminated");
        out_events.push(Event::PlayerEliminated { player: owner });
        if world.rotation.len() == 1 {
            if let Some(winner) = world.rotation.current() {
                tracing::info!(winner = winner.get(), "game over");
                out_events.push(Event::GameOver { winner });
            }
        }
    }
}
