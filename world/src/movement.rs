//! Move validation and the single move-or-act entry point.

use frontier_core::{Coord, Event, RuleViolation, UnitId};

use crate::{
    combat::{self, AttackOutcome},
    visibility, Unit, World,
};

/// Neighbouring destinations the unit may move to or attack, x-major then
/// y-minor.
pub(crate) fn valid_moves(world: &World, unit: &Unit) -> Vec<Coord> {
    unit.position()
        .neighbours()
        .filter(|destination| is_legal_destination(world, unit, *destination))
        .collect()
}

fn is_legal_destination(world: &World, unit: &Unit, destination: Coord) -> bool {
    let Some(tile) = world.grid.tile(destination) else {
        return false;
    };
    if tile.movement_cost() > unit.remaining_movement() {
        return false;
    }
    tile.occupant()
        .and_then(|id| world.units.get(id))
        .map_or(true, |occupant| occupant.owner() != unit.owner())
}

/// Moves the unit one tile or resolves the attack the destination implies.
///
/// `Ok(false)` reports an accepted action that cost the attacker its life.
pub(crate) fn move_or_act(
    world: &mut World,
    unit_id: UnitId,
    to: Coord,
    out_events: &mut Vec<Event>,
) -> Result<bool, RuleViolation> {
    let acting = world.acting_player()?;
    let unit = world.units.get(unit_id).ok_or(RuleViolation::UnknownUnit)?;
    if unit.owner() != acting {
        return Err(RuleViolation::NotYourTurn);
    }

    let from = unit.position();
    let (dx, dy) = from.delta_to(to);
    if dx.unsigned_abs() > 1 || dy.unsigned_abs() > 1 || (dx == 0 && dy == 0) {
        return Err(RuleViolation::NotAdjacent);
    }

    let tile = world.grid.tile(to).ok_or(RuleViolation::OutOfBounds)?;
    let cost = tile.movement_cost();
    if cost > unit.remaining_movement() {
        return Err(RuleViolation::InsufficientMovement);
    }

    let owner = unit.owner();
    if let Some(defender) = tile.occupant() {
        if world.units.get(defender).map(Unit::owner) == Some(owner) {
            return Err(RuleViolation::FriendlyOccupied);
        }
        return Ok(
            match combat::attack_unit(world, unit_id, defender, out_events) {
                AttackOutcome::DefenderDestroyed { occupy: true } => {
                    relocate(world, unit_id, to, cost, out_events);
                    if let Some(unit) = world.units.get_mut(unit_id) {
                        unit.remaining_movement = 0;
                    }
                    true
                }
                AttackOutcome::DefenderDestroyed { occupy: false } | AttackOutcome::Exchanged => {
                    true
                }
                AttackOutcome::AttackerDestroyed => false,
            },
        );
    }

    let enemy_city = tile
        .owner_city()
        .filter(|_| tile.is_city())
        .filter(|city| world.cities.get(*city).map(|city| city.owner()) != Some(owner));
    if let Some(city) = enemy_city {
        combat::attack_city(world, unit_id, city, out_events);
        return Ok(true);
    }

    relocate(world, unit_id, to, cost, out_events);
    Ok(true)
}

fn relocate(world: &mut World, unit_id: UnitId, to: Coord, cost: i32, out_events: &mut Vec<Event>) {
    let Some(unit) = world.units.get_mut(unit_id) else {
        return;
    };
    let from = unit.position;
    unit.position = to;
    unit.remaining_movement = (unit.remaining_movement - cost).max(0);
    let (owner, sight) = (unit.owner(), unit.sight());

    if let Some(tile) = world.grid.tile_mut(from) {
        tile.occupant = None;
    }
    if let Some(tile) = world.grid.tile_mut(to) {
        tile.occupant = Some(unit_id);
    }
    let _ = visibility::reveal(&mut world.grid, owner, to, sight);

    tracing::trace!(unit = unit_id.get(), %from, %to, "unit moved");
    out_events.push(Event::UnitMoved {
        unit: unit_id,
        from,
        to,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use frontier_core::{
        GameSetup, MapLayout, MapSource, PlayerId, PlayerSetup, Terrain, TileSpec, UnitKind,
    };

    fn world_with(layout: MapLayout) -> World {
        World::new_game(&GameSetup {
            players: vec![PlayerSetup::human("A"), PlayerSetup::human("B")],
            map: MapSource::Layout { layout },
            starts: vec![Coord::new(0, 0), Coord::new(7, 7)],
        })
        .expect("setup succeeds")
    }

    #[test]
    fn relocation_updates_tiles_and_spends_movement() {
        let mut layout = MapLayout::filled(12, Terrain::Field);
        let _ = layout.set_tile(Coord::new(3, 4), TileSpec::plain(Terrain::Hill));
        let mut world = world_with(layout);
        let scout = world
            .place_unit(PlayerId::new(0), UnitKind::Scout, Coord::new(3, 3))
            .expect("placed");
        assert!(!query::is_revealed(&world, Coord::new(7, 8), PlayerId::new(0)));
        let mut events = Vec::new();

        let moved = move_or_act(&mut world, scout, Coord::new(3, 4), &mut events);
        assert_eq!(moved, Ok(true));

        let unit = query::unit(&world, scout).expect("unit alive");
        assert_eq!(unit.position(), Coord::new(3, 4));
        assert_eq!(unit.remaining_movement(), 2);
        assert!(query::unit_at(&world, Coord::new(3, 3)).is_none());
        assert!(query::is_revealed(&world, Coord::new(7, 8), PlayerId::new(0)));
        assert_eq!(
            events,
            vec![Event::UnitMoved {
                unit: scout,
                from: Coord::new(3, 3),
                to: Coord::new(3, 4)
            }]
        );
    }

    #[test]
    fn long_range_and_expensive_moves_are_rejected() {
        let mut layout = MapLayout::filled(8, Terrain::Field);
        let _ = layout.set_tile(Coord::new(4, 4), TileSpec::plain(Terrain::Swamp));
        let mut world = world_with(layout);
        let militia = world
            .place_unit(PlayerId::new(0), UnitKind::Militia, Coord::new(3, 3))
            .expect("placed");
        let mut events = Vec::new();

        assert_eq!(
            move_or_act(&mut world, militia, Coord::new(5, 3), &mut events),
            Err(RuleViolation::NotAdjacent)
        );
        assert_eq!(
            move_or_act(&mut world, militia, Coord::new(3, 3), &mut events),
            Err(RuleViolation::NotAdjacent)
        );
        assert_eq!(
            move_or_act(&mut world, militia, Coord::new(4, 4), &mut events),
            Err(RuleViolation::InsufficientMovement)
        );
        assert_eq!(
            move_or_act(&mut world, UnitId::new(99), Coord::new(4, 4), &mut events),
            Err(RuleViolation::UnknownUnit)
        );
        assert!(events.is_empty());
    }

    #[test]
    fn friendly_units_block_the_destination() {
        let mut world = world_with(MapLayout::filled(8, Terrain::Field));
        let owner = PlayerId::new(0);
        let warrior = world
            .place_unit(owner, UnitKind::Warrior, Coord::new(3, 3))
            .expect("placed");
        let _ = world
            .place_unit(owner, UnitKind::Scout, Coord::new(4, 3))
            .expect("placed");
        let mut events = Vec::new();

        assert!(!query::valid_moves(&world, warrior).contains(&Coord::new(4, 3)));
        assert_eq!(
            move_or_act(&mut world, warrior, Coord::new(4, 3), &mut events),
            Err(RuleViolation::FriendlyOccupied)
        );
    }

    #[test]
    fn units_walk_into_their_own_empty_city() {
        let mut world = world_with(MapLayout::filled(8, Terrain::Field));
        let owner = PlayerId::new(0);
        let _ = world.place_city(owner, Coord::new(4, 4)).expect("city");
        let warrior = world
            .place_unit(owner, UnitKind::Warrior, Coord::new(3, 3))
            .expect("placed");
        let mut events = Vec::new();

        assert_eq!(
            move_or_act(&mut world, warrior, Coord::new(4, 4), &mut events),
            Ok(true)
        );
        assert_eq!(
            query::unit_at(&world, Coord::new(4, 4)).map(Unit::id),
            Some(warrior)
        );
    }
}
