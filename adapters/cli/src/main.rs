#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting maps, running computer-only games
//! and managing saves.

mod render;
mod setup;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use frontier_core::{Controller, Event, PlayerId};
use frontier_persistence::{FileStore, SaveStore};
use frontier_system_ai::{AiController, DEFAULT_DEFENDERS};
use frontier_system_turns::{TurnConfig, TurnEngine, TurnPhase};
use frontier_world::{query, World};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::setup::SetupArgs;

/// Turn-based grid strategy engine.
#[derive(Debug, Parser)]
#[command(name = "frontier", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the map a game would start on.
    Map {
        #[command(flatten)]
        setup: SetupArgs,

        /// Write the map in the description format to FILE.
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Play a game in which every seat belongs to the computer.
    Simulate {
        #[command(flatten)]
        setup: SetupArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Save the final state to FILE.
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
    /// Continue a saved game and write it back.
    Resume {
        /// Save file to continue.
        save: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Describe a saved game.
    Inspect {
        /// Save file to describe.
        save: PathBuf,

        /// Only show tiles this player has revealed.
        #[arg(long)]
        player: Option<u32>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Rounds to play before stopping.
    #[arg(long, default_value_t = 200)]
    rounds: u32,

    /// Units each computer player keeps near its cities.
    #[arg(long, default_value_t = DEFAULT_DEFENDERS)]
    defenders: usize,

    /// Print the final report as JSON.
    #[arg(long)]
    json: bool,
}

/// Machine-readable state of a game.
#[derive(Debug, Serialize)]
struct GameReport {
    round: u32,
    current_player: Option<u32>,
    winner: Option<String>,
    players: Vec<PlayerReport>,
}

#[derive(Debug, Serialize)]
struct PlayerReport {
    id: u32,
    name: String,
    computer: bool,
    units: usize,
    cities: usize,
    revealed_tiles: usize,
    in_rotation: bool,
}

impl GameReport {
    fn from_world(world: &World) -> Self {
        let players = query::players(world)
            .iter()
            .filter_map(|player| query::player_summary(world, player.id()))
            .map(|summary| PlayerReport {
                id: summary.id.get(),
                name: summary.name,
                computer: summary.controller == Controller::Computer,
                units: summary.units,
                cities: summary.cities,
                revealed_tiles: summary.revealed_tiles,
                in_rotation: summary.in_rotation,
            })
            .collect();
        let winner = query::winner(world)
            .and_then(|id| query::player(world, id))
            .map(|player| player.name().to_owned());

        Self {
            round: query::round(world),
            current_player: query::current_player(world).map(|id| id.get()),
            winner,
            players,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Map { setup, export } => map(&setup, export),
        Commands::Simulate { setup, run, save } => simulate(&setup, &run, save),
        Commands::Resume { save, run } => resume(save, &run),
        Commands::Inspect { save, player, json } => inspect(save, player, json),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn map(args: &SetupArgs, export: Option<PathBuf>) -> Result<()> {
    let setup = args.resolve()?;
    let layout = frontier_system_mapgen::layout_for(&setup.map, &setup.starts)
        .context("failed to build the map")?;
    print!("{}", render::render_layout(&layout));

    if let Some(path) = export {
        fs::write(&path, frontier_system_mapgen::describe(&layout))
            .with_context(|| format!("failed to write map description {}", path.display()))?;
        tracing::info!(path = %path.display(), size = layout.size(), "map exported");
    }
    Ok(())
}

fn simulate(args: &SetupArgs, run: &RunArgs, save: Option<PathBuf>) -> Result<()> {
    let setup = setup::computer_only(args.resolve()?);
    let mut world = World::new_game(&setup).context("failed to set up the game")?;
    let events = play(&mut world, run);
    tracing::info!(events = events.len(), "simulation finished");

    if let Some(path) = save {
        let mut store = FileStore::new(path);
        store
            .save(&world)
            .with_context(|| format!("failed to save to {}", store.path().display()))?;
    }
    report(&world, None, run.json)
}

fn resume(save: PathBuf, run: &RunArgs) -> Result<()> {
    let mut store = FileStore::new(save);
    let mut world = store
        .load()
        .with_context(|| format!("failed to load {}", store.path().display()))?;
    let events = play(&mut world, run);
    tracing::info!(events = events.len(), "resumed game paused");
    store
        .save(&world)
        .with_context(|| format!("failed to save to {}", store.path().display()))?;
    report(&world, None, run.json)
}

fn inspect(save: PathBuf, player: Option<u32>, json: bool) -> Result<()> {
    let store = FileStore::new(save);
    let world = store
        .load()
        .with_context(|| format!("failed to load {}", store.path().display()))?;
    report(&world, player.map(PlayerId::new), json)
}

/// Plays up to `run.rounds` rounds; human seats pass their turns.
fn play(world: &mut World, run: &RunArgs) -> Vec<Event> {
    let seats = u32::try_from(query::players(world).len()).unwrap_or(u32::MAX);
    let mut engine = TurnEngine::with_controller(
        TurnConfig::new(seats.max(1)),
        AiController::with_defenders(run.defenders),
    );
    let mut events = Vec::new();
    let last_round = query::round(world).saturating_add(run.rounds);

    let mut phase = engine.resume(world, &mut events);
    while phase != TurnPhase::GameOver && query::round(world) < last_round {
        phase = match phase {
            TurnPhase::AwaitingHumanInput => engine.end_turn(world, &mut events),
            _ => engine.resume(world, &mut events),
        };
    }
    events
}

fn report(world: &World, viewer: Option<PlayerId>, json: bool) -> Result<()> {
    let report = GameReport::from_world(world);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Round {}", report.round);
    match &report.winner {
        Some(name) => println!("Winner: {name}"),
        None => {
            if let Some(current) = query::current_player(world).and_then(|id| query::player(world, id)) {
                println!("Next to move: {}", current.name());
            }
        }
    }
    print!("{}", render::render_summaries(world));
    print!("{}", render::render_world(world, viewer));
    Ok(())
}
