#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn engine that sequences housekeeping, human input and computer turns.
//!
//! The engine owns no game state. It walks an explicit [`TurnPhase`] machine
//! over a [`World`], submitting `StartTurn`/`EndTurn` through
//! [`frontier_world::apply`] and handing computer players to an
//! [`AiController`]. It stops whenever a human must act, the game ends, or
//! the configured number of consecutive computer turns has run.

use frontier_core::{Command, Event};
use frontier_system_ai::AiController;
use frontier_world::{apply, query, World};

/// Consecutive computer turns one engine call may run by default.
pub const DEFAULT_MAX_COMPUTER_TURNS: u32 = 1_000;

/// Configuration parameters required to construct the turn engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnConfig {
    max_computer_turns: u32,
}

impl TurnConfig {
    /// Creates a configuration bounding consecutive computer turns per call.
    #[must_use]
    pub const fn new(max_computer_turns: u32) -> Self {
        Self { max_computer_turns }
    }

    /// Maximum number of computer turns a single engine call runs.
    #[must_use]
    pub const fn max_computer_turns(&self) -> u32 {
        self.max_computer_turns
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMPUTER_TURNS)
    }
}

/// Phase the engine is in for the current player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// Movement, healing and city increments are due for the current player.
    TurnStartHousekeeping,
    /// A human player may submit commands until they end the turn.
    AwaitingHumanInput,
    /// A computer player is due to play its turn.
    ComputerTurnRunning,
    /// The current turn is over and the rotation must advance.
    TurnEnd,
    /// A single player remains; the rotation no longer advances.
    GameOver,
}

/// Orchestrates whose turn it is and drives computer players.
#[derive(Debug)]
pub struct TurnEngine {
    config: TurnConfig,
    phase: TurnPhase,
    ai: AiController,
}

impl TurnEngine {
    /// Creates an engine driving computer players with the default controller.
    #[must_use]
    pub fn new(config: TurnConfig) -> Self {
        Self::with_controller(config, AiController::new())
    }

    /// Creates an engine driving computer players with `ai`.
    #[must_use]
    pub fn with_controller(config: TurnConfig, ai: AiController) -> Self {
        Self {
            config,
            phase: TurnPhase::TurnStartHousekeeping,
            ai,
        }
    }

    /// Phase the engine stopped in.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Starts or resumes play on `world`, for example right after a load.
    ///
    /// Housekeeping for the current player is idempotent, so resuming a turn
    /// that already started does not repeat it.
    pub fn resume(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> TurnPhase {
        self.phase = TurnPhase::TurnStartHousekeeping;
        self.run(world, out_events)
    }

    /// Submits a human command for the current turn.
    ///
    /// Returns `false` without touching the world unless a human is expected
    /// to act. `EndTurn` hands the turn over and runs any computer turns that
    /// follow.
    pub fn submit(
        &mut self,
        world: &mut World,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if self.phase != TurnPhase::AwaitingHumanInput {
            tracing::debug!(phase = ?self.phase, ?command, "command outside human turn");
            return false;
        }
        if command == Command::EndTurn {
            let _ = self.end_turn(world, out_events);
            return true;
        }

        let changed = apply(world, command, out_events);
        if query::is_game_over(world) {
            self.phase = TurnPhase::GameOver;
        }
        changed
    }

    /// Ends the human player's turn and plays until the next human turn.
    pub fn end_turn(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> TurnPhase {
        if self.phase == TurnPhase::AwaitingHumanInput {
            self.phase = TurnPhase::TurnEnd;
            return self.run(world, out_events);
        }
        if self.phase == TurnPhase::GameOver {
            let _ = apply(world, Command::EndTurn, out_events);
        }
        self.phase
    }

    fn run(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> TurnPhase {
        let mut computer_turns = 0;

        loop {
            match self.phase {
                TurnPhase::TurnStartHousekeeping => {
                    if query::is_game_over(world) {
                        self.halt(world);
                        continue;
                    }
                    let _ = apply(world, Command::StartTurn, out_events);
                    self.phase = if query::is_human_turn(world) {
                        TurnPhase::AwaitingHumanInput
                    } else {
                        TurnPhase::ComputerTurnRunning
                    };
                }
                TurnPhase::ComputerTurnRunning => {
                    if computer_turns >= self.config.max_computer_turns {
                        tracing::debug!(computer_turns, "computer turn budget spent");
                        return self.phase;
                    }
                    computer_turns += 1;
                    self.ai.take_turn(world, out_events);
                    self.phase = TurnPhase::TurnStartHousekeeping;
                }
                TurnPhase::TurnEnd => {
                    let _ = apply(world, Command::EndTurn, out_events);
                    self.phase = TurnPhase::TurnStartHousekeeping;
                }
                TurnPhase::AwaitingHumanInput | TurnPhase::GameOver => return self.phase,
            }
        }
    }

    fn halt(&mut self, world: &World) {
        if let Some(winner) = query::winner(world) {
            tracing::info!(winner = winner.get(), round = query::round(world), "game halted");
        }
        self.phase = TurnPhase::GameOver;
    }
}
