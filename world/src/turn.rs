//! Turn-start housekeeping and turn hand-over.

use frontier_core::{Event, PlayerId, RuleViolation};

use crate::{economy, TurnMarker, World};

/// Runs housekeeping for the current player unless it already ran this turn.
pub(crate) fn start_turn(
    world: &mut World,
    out_events: &mut Vec<Event>,
) -> Result<bool, RuleViolation> {
    let player = world.acting_player()?;
    let round = world.rotation.round();
    let marker = TurnMarker { round, player };
    if world.turn_marker == Some(marker) {
        return Ok(false);
    }
    world.turn_marker = Some(marker);

    housekeeping(world, player, out_events);

    tracing::info!(player = player.get(), round, "turn started");
    out_events.push(Event::TurnStarted { player, round });
    Ok(true)
}

fn housekeeping(world: &mut World, player: PlayerId, out_events: &mut Vec<Event>) {
    let Some((units, cities)) = world
        .player(player)
        .map(|player| (player.units().to_vec(), player.cities().to_vec()))
    else {
        return;
    };

    for id in units {
        if let Some(unit) = world.units.get_mut(id) {
            unit.reset_movement();
            unit.heal();
        }
    }

    for id in cities {
        if let Some(city) = world.cities.get_mut(id) {
            if economy::increment(city) {
                let population = city.population();
                tracing::info!(city = id.get(), population, "city grew");
                out_events.push(Event::CityGrew {
                    city: id,
                    population,
                });
            }
        }
        economy::claim_territory(world, id, out_events);
    }
}

/// Passes the turn to the next surviving player and starts their turn.
///
/// Once the game is over the rotation no longer advances; the call reports
/// the winner again and returns `false`.
pub(crate) fn end_turn(
    world: &mut World,
    out_events: &mut Vec<Event>,
) -> Result<bool, RuleViolation> {
    if world.is_game_over() {
        if let Some(winner) = world.rotation.current() {
            out_events.push(Event::GameOver { winner });
        }
        return Ok(false);
    }

    if world.rotation.advance() {
        let round = world.rotation.round();
        tracing::info!(round, "round advanced");
        out_events.push(Event::RoundAdvanced { round });
    }
    let _ = start_turn(world, out_events)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use frontier_core::{
        Coord, GameSetup, MapLayout, MapSource, PlayerSetup, Terrain, UnitKind,
    };

    fn three_player_world() -> World {
        World::new_game(&GameSetup {
            players: vec![
                PlayerSetup::human("A"),
                PlayerSetup::human("B"),
                PlayerSetup::human("C"),
            ],
            map: MapSource::Layout {
                layout: MapLayout::filled(10, Terrain::Field),
            },
            starts: vec![Coord::new(1, 1), Coord::new(8, 8), Coord::new(8, 1)],
        })
        .expect("setup succeeds")
    }

    #[test]
    fn start_turn_runs_once_per_player_turn() {
        let mut world = three_player_world();
        let mut events = Vec::new();

        assert_eq!(start_turn(&mut world, &mut events), Ok(true));
        assert_eq!(start_turn(&mut world, &mut events), Ok(false));
        assert_eq!(
            events,
            vec![Event::TurnStarted {
                player: PlayerId::new(0),
                round: 0
            }]
        );
        assert!(query::turn_started(&world));
    }

    #[test]
    fn ending_turns_walks_the_rotation_and_counts_rounds() {
        let mut world = three_player_world();
        let mut events = Vec::new();
        let _ = start_turn(&mut world, &mut events);

        let mut seen = Vec::new();
        for _ in 0..6 {
            assert_eq!(end_turn(&mut world, &mut events), Ok(true));
            seen.push(query::current_player(&world).map(|player| player.get()));
        }
        assert_eq!(
            seen,
            vec![Some(1), Some(2), Some(0), Some(1), Some(2), Some(0)]
        );
        assert_eq!(query::round(&world), 2);
        let rounds = events
            .iter()
            .filter(|event| matches!(event, Event::RoundAdvanced { .. }))
            .count();
        assert_eq!(rounds, 2);
    }

    #[test]
    fn housekeeping_restores_movement_and_heals() {
        let mut world = three_player_world();
        let warrior = world
            .place_unit(PlayerId::new(1), UnitKind::Warrior, Coord::new(5, 5))
            .expect("placed");
        if let Some(unit) = world.units.get_mut(warrior) {
            unit.hp = 40.0;
            unit.remaining_movement = 0;
        }
        let mut events = Vec::new();
        let _ = start_turn(&mut world, &mut events);
        let _ = end_turn(&mut world, &mut events);

        let unit = query::unit(&world, warrior).expect("alive");
        assert_eq!(unit.remaining_movement(), unit.max_movement());
        assert_eq!(unit.hp(), 45.0);
    }

    #[test]
    fn finished_games_stop_rotating() {
        let mut world = three_player_world();
        let _ = world.rotation.remove(PlayerId::new(1));
        let _ = world.rotation.remove(PlayerId::new(2));
        let mut events = Vec::new();

        assert_eq!(end_turn(&mut world, &mut events), Ok(false));
        assert_eq!(
            events,
            vec![Event::GameOver {
                winner: PlayerId::new(0)
            }]
        );
        assert_eq!(
            start_turn(&mut world, &mut events),
            Err(RuleViolation::GameOver)
        );
    }
}
