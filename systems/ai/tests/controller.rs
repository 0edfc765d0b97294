use frontier_core::{
    Command, Coord, Event, GameSetup, MapLayout, MapSource, PlayerId, PlayerSetup, Terrain,
    UnitKind,
};
use frontier_system_ai::AiController;
use frontier_world::{apply, query, Unit, World};

const CPU: PlayerId = PlayerId::new(0);
const HUMAN: PlayerId = PlayerId::new(1);

fn cpu_first_world() -> World {
    World::new_game(&GameSetup {
        players: vec![PlayerSetup::computer("CPU Player"), PlayerSetup::human("Player 1")],
        map: MapSource::Layout {
            layout: MapLayout::filled(12, Terrain::Field),
        },
        starts: vec![Coord::new(2, 2), Coord::new(10, 10)],
    })
    .expect("setup succeeds")
}

fn warriors_of(world: &World, player: PlayerId) -> Vec<&Unit> {
    query::units_of(world, player)
        .filter(|unit| unit.kind() == UnitKind::Warrior)
        .collect()
}

/// Runs one computer turn followed by an idle human turn.
fn play_round(ai: &mut AiController, world: &mut World, events: &mut Vec<Event>) {
    ai.take_turn(world, events);
    assert_eq!(query::current_player(world), Some(HUMAN));
    let _ = apply(world, Command::EndTurn, events);
    assert_eq!(query::current_player(world), Some(CPU));
}

#[test]
fn settler_founds_on_the_first_turn_and_the_turn_passes() {
    let mut world = cpu_first_world();
    let mut ai = AiController::new();
    let mut events = Vec::new();

    ai.take_turn(&mut world, &mut events);

    let city = query::city_at(&world, Coord::new(2, 2)).expect("city founded");
    assert_eq!(city.owner(), CPU);
    let scout = query::unit_at(&world, Coord::new(2, 2)).expect("free scout");
    assert_eq!(scout.kind(), UnitKind::Scout);
    assert_eq!(query::current_player(&world), Some(HUMAN));
    assert!(events.contains(&Event::TurnStarted {
        player: HUMAN,
        round: 0
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. })));
}

#[test]
fn cities_produce_a_warrior_once_the_reserve_allows() {
    let mut world = cpu_first_world();
    let _ = world.place_city(CPU, Coord::new(6, 6)).expect("city");
    let mut ai = AiController::new();
    let mut events = Vec::new();

    for _ in 0..3 {
        play_round(&mut ai, &mut world, &mut events);
    }
    assert!(warriors_of(&world, CPU).is_empty());

    ai.take_turn(&mut world, &mut events);
    let warriors = warriors_of(&world, CPU);
    assert_eq!(warriors.len(), 1);
    assert_eq!(warriors[0].position(), Coord::new(6, 6));
    let reserve =
        |world: &World| query::city_at(world, Coord::new(6, 6)).map(|city| city.reserve());
    assert_eq!(reserve(&world), Some(0));

    let _ = apply(&mut world, Command::EndTurn, &mut events);
    assert_eq!(reserve(&world), Some(50));
}

#[test]
fn defenders_leave_the_city_but_stay_beside_it() {
    let mut world = cpu_first_world();
    let _ = world.place_city(CPU, Coord::new(6, 6)).expect("city");
    let mut ai = AiController::new();
    let mut events = Vec::new();

    for _ in 0..4 {
        play_round(&mut ai, &mut world, &mut events);
    }
    ai.take_turn(&mut world, &mut events);

    let warriors = warriors_of(&world, CPU);
    assert_eq!(warriors.len(), 1);
    let (guard, id) = (warriors[0].position(), warriors[0].id());
    assert_ne!(guard, Coord::new(6, 6));
    assert!(guard.chebyshev_distance(Coord::new(6, 6)) <= 1);
    assert_eq!(warriors[0].remaining_movement(), 0);

    let _ = apply(&mut world, Command::EndTurn, &mut events);
    let warrior = query::unit(&world, id).expect("alive");
    assert_eq!(warrior.position(), guard);
    assert_eq!(warrior.remaining_movement(), warrior.max_movement());
}

#[test]
fn defenders_attack_enemies_beside_their_city() {
    let mut world = cpu_first_world();
    let _ = world.place_city(CPU, Coord::new(6, 6)).expect("city");
    let warrior = world
        .place_unit(CPU, UnitKind::Warrior, Coord::new(5, 6))
        .expect("placed");
    let militia = world
        .place_unit(HUMAN, UnitKind::Militia, Coord::new(5, 7))
        .expect("placed");
    let mut ai = AiController::new();
    let mut events = Vec::new();

    ai.take_turn(&mut world, &mut events);

    assert!(events.contains(&Event::UnitAttacked {
        attacker: warrior,
        defender: militia,
        damage: 25.0,
        counter_damage: Some(10.0),
    }));
    let guard = query::unit(&world, warrior).expect("alive");
    assert_eq!(guard.position(), Coord::new(5, 6));
    assert_eq!(guard.hp(), 90.0);
    assert_eq!(guard.remaining_movement(), 0);
    assert_eq!(
        query::unit(&world, militia).map(Unit::position),
        Some(Coord::new(5, 7))
    );
}

#[test]
fn settlers_on_claimed_ground_walk_away_without_fighting() {
    let mut world = cpu_first_world();
    let rival = world.place_city(HUMAN, Coord::new(4, 4)).expect("city");
    let guard = world
        .place_unit(HUMAN, UnitKind::Warrior, Coord::new(6, 6))
        .expect("placed");
    let mut events = Vec::new();

    for _ in 0..20 {
        if query::city(&world, rival).map(|city| city.control_radius()) == Some(1)
            && query::current_player(&world) == Some(CPU)
        {
            break;
        }
        let _ = apply(&mut world, Command::EndTurn, &mut events);
    }
    assert_eq!(
        query::tile_at(&world, Coord::new(5, 5)).and_then(|tile| tile.owner_city()),
        Some(rival)
    );

    let settler = world
        .place_unit(CPU, UnitKind::Settler, Coord::new(5, 5))
        .expect("placed");
    let mut ai = AiController::new();
    events.clear();
    ai.take_turn(&mut world, &mut events);

    assert_eq!(query::cities_of(&world, CPU).count(), 1);
    assert!(query::city_at(&world, Coord::new(2, 2)).is_some());
    let walker = query::unit(&world, settler).expect("settler alive");
    assert!(walker.can_found());
    assert_eq!(walker.remaining_movement(), 0);
    assert!(walker.position().chebyshev_distance(Coord::new(4, 4)) >= 2);
    assert!(query::city_at(&world, walker.position()).is_none());

    assert!(!events.iter().any(|event| matches!(
        event,
        Event::UnitAttacked { attacker, .. } | Event::CityAttacked { attacker, .. }
            if *attacker == settler
    )));
    assert_eq!(query::unit(&world, guard).map(Unit::hp), Some(100.0));
    assert_eq!(query::city(&world, rival).map(|city| city.hp()), Some(110.0));
}

#[test]
fn attackers_march_on_the_nearest_enemy_city() {
    let mut world = cpu_first_world();
    let _ = world.place_city(HUMAN, Coord::new(9, 6)).expect("city");
    let _ = world.place_city(HUMAN, Coord::new(2, 10)).expect("city");
    let warrior = world
        .place_unit(CPU, UnitKind::Warrior, Coord::new(3, 6))
        .expect("placed");
    let mut ai = AiController::with_defenders(0);
    let mut events = Vec::new();

    ai.take_turn(&mut world, &mut events);

    let unit = query::unit(&world, warrior).expect("alive");
    assert_eq!(unit.position(), Coord::new(2, 8));
    assert_eq!(unit.remaining_movement(), 0);
}

#[test]
fn attackers_hit_cities_without_entering_them() {
    let mut world = cpu_first_world();
    let city = world.place_city(HUMAN, Coord::new(6, 3)).expect("city");
    let _ = world.place_city(CPU, Coord::new(9, 1)).expect("city");
    let swordsman = world
        .place_unit(CPU, UnitKind::Swordsman, Coord::new(5, 3))
        .expect("placed");
    let mut ai = AiController::with_defenders(0);
    let mut events = Vec::new();

    ai.take_turn(&mut world, &mut events);

    assert_eq!(
        query::unit(&world, swordsman).map(Unit::position),
        Some(Coord::new(5, 3))
    );
    assert!(events.contains(&Event::CityAttacked {
        attacker: swordsman,
        city,
        damage: 35.0
    }));
    // The human's turn has already started, regenerating the city by 5.
    assert_eq!(query::city(&world, city).map(|city| city.hp()), Some(70.0));
}

#[test]
fn finished_games_are_left_alone() {
    let mut world = cpu_first_world();
    let _ = world.place_city(CPU, Coord::new(6, 6)).expect("city");
    let city = world.place_city(HUMAN, Coord::new(6, 8)).expect("city");
    let mut ai = AiController::with_defenders(0);
    let mut events = Vec::new();

    for _ in 0..40 {
        if query::is_game_over(&world) {
            break;
        }
        ai.take_turn(&mut world, &mut events);
        if query::current_player(&world) == Some(HUMAN) {
            let _ = apply(&mut world, Command::EndTurn, &mut events);
        }
    }

    assert!(query::city(&world, city).is_none());
    assert_eq!(query::winner(&world), Some(CPU));

    let before = world.clone();
    let mut after_events = Vec::new();
    ai.take_turn(&mut world, &mut after_events);
    assert!(after_events.is_empty());
    assert_eq!(world, before);
}

#[test]
fn identical_games_replay_identically() {
    let setup = GameSetup {
        players: vec![
            PlayerSetup::computer("North"),
            PlayerSetup::computer("South"),
        ],
        map: MapSource::Procedural { size: 14, seed: 11 },
        starts: Vec::new(),
    };
    let play = || {
        let mut world = World::new_game(&setup).expect("setup succeeds");
        let mut ai = AiController::new();
        let mut events = Vec::new();
        for _ in 0..60 {
            ai.take_turn(&mut world, &mut events);
        }
        (world, events)
    };

    let (first_world, first_events) = play();
    let (second_world, second_events) = play();
    assert_eq!(first_events, second_events);
    assert_eq!(first_world, second_world);
    for city in query::cities(&first_world) {
        assert_eq!(city.control_radius(), (city.population() / 2).min(3));
    }
}
