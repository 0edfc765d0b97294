//! Game setup loading for the command-line front end.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use frontier_core::{Controller, GameSetup, MapSource, PlayerSetup};

/// Map size used when neither a game file nor a flag provides one.
pub(crate) const DEFAULT_MAP_SIZE: u32 = 16;

/// Seed used when neither a game file nor a flag provides one.
pub(crate) const DEFAULT_SEED: u64 = 1;

/// Flags that select and adjust the game to set up.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct SetupArgs {
    /// TOML file describing players, map source and start coordinates.
    #[arg(long, value_name = "FILE")]
    pub(crate) game: Option<PathBuf>,

    /// Map description file replacing the configured map source.
    #[arg(long, value_name = "FILE")]
    pub(crate) map_file: Option<PathBuf>,

    /// Width and height of a procedural map.
    #[arg(long)]
    pub(crate) size: Option<u32>,

    /// Seed of a procedural map.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Number of computer players when no game file is given.
    #[arg(long, default_value_t = 2)]
    pub(crate) players: usize,
}

impl SetupArgs {
    /// Resolves the flags into a complete game setup.
    pub(crate) fn resolve(&self) -> Result<GameSetup> {
        let mut setup = match &self.game {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read game file {}", path.display()))?;
                parse_game_file(&text)
                    .with_context(|| format!("failed to parse game file {}", path.display()))?
            }
            None => computer_game(self.players),
        };

        if let Some(path) = &self.map_file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read map file {}", path.display()))?;
            setup.map = MapSource::Description { text };
        }

        match &mut setup.map {
            MapSource::Procedural { size, seed } => {
                if let Some(value) = self.size {
                    *size = value;
                }
                if let Some(value) = self.seed {
                    *seed = value;
                }
            }
            MapSource::Description { .. } | MapSource::Layout { .. } => {
                if self.size.is_some() || self.seed.is_some() {
                    tracing::warn!("size and seed only apply to procedural maps");
                }
            }
        }

        if setup.players.is_empty() {
            bail!("the game needs at least one player");
        }
        Ok(setup)
    }
}

/// Deserialises a TOML game file.
pub(crate) fn parse_game_file(text: &str) -> Result<GameSetup> {
    Ok(toml::from_str(text)?)
}

/// Setup in which every seat is played by the computer.
pub(crate) fn computer_game(players: usize) -> GameSetup {
    GameSetup {
        players: (1..=players)
            .map(|index| PlayerSetup::computer(format!("CPU {index}")))
            .collect(),
        map: MapSource::Procedural {
            size: DEFAULT_MAP_SIZE,
            seed: DEFAULT_SEED,
        },
        starts: Vec::new(),
    }
}

/// Hands every human seat to the computer.
pub(crate) fn computer_only(mut setup: GameSetup) -> GameSetup {
    for player in &mut setup.players {
        player.controller = Controller::Computer;
    }
    setup
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_core::Coord;

    const GAME_FILE: &str = r#"
starts = [{ x = 2, y = 2 }, { x = 9, y = 9 }]

[[players]]
name = "North"
controller = "human"

[[players]]
name = "South"
controller = "computer"

[map]
kind = "procedural"
size = 12
seed = 77
"#;

    #[test]
    fn game_files_describe_players_map_and_starts() {
        let setup = parse_game_file(GAME_FILE).expect("valid game file");
        assert_eq!(
            setup.players,
            vec![PlayerSetup::human("North"), PlayerSetup::computer("South")]
        );
        assert_eq!(setup.map, MapSource::Procedural { size: 12, seed: 77 });
        assert_eq!(setup.starts, vec![Coord::new(2, 2), Coord::new(9, 9)]);
    }

    #[test]
    fn flags_override_procedural_size_and_seed() {
        let args = SetupArgs {
            size: Some(20),
            seed: Some(3),
            players: 3,
            ..SetupArgs::default()
        };
        let setup = args.resolve().expect("resolves");
        assert_eq!(setup.map, MapSource::Procedural { size: 20, seed: 3 });
        assert_eq!(setup.players.len(), 3);
        assert!(setup
            .players
            .iter()
            .all(|player| player.controller == Controller::Computer));
    }

    #[test]
    fn zero_players_is_an_error() {
        let args = SetupArgs::default();
        assert!(args.resolve().is_err());
    }

    #[test]
    fn computer_only_replaces_humans() {
        let setup = computer_only(GameSetup::hot_seat(2, 10, 1));
        assert!(setup
            .players
            .iter()
            .all(|player| player.controller == Controller::Computer));
    }
}
