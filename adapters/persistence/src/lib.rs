#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Save and load support for a [`World`].
//!
//! A save is the four magic bytes `FRNT`, a little-endian `u32` format
//! version, and the bincode encoding of the world. The world carries the
//! tile grid with every player's revealed set, the rotation with its current
//! player and round, the start coordinates and the turn-start marker, so a
//! loaded game resumes exactly where it was saved.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use frontier_world::World;
use thiserror::Error;

/// Bytes every save starts with.
pub const SAVE_MAGIC: [u8; 4] = *b"FRNT";

/// Format version written by [`save`].
pub const SAVE_VERSION: u32 = 1;

const HEADER_LEN: usize = SAVE_MAGIC.len() + std::mem::size_of::<u32>();

/// Failures raised while storing or restoring a game.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No save exists where one was expected.
    #[error("no saved game found")]
    NotFound,
    /// The underlying storage failed.
    #[error("save storage failed: {0}")]
    Io(#[from] io::Error),
    /// The bytes are not a readable save.
    #[error("save data is malformed: {reason}")]
    Malformed {
        /// Description of what could not be read.
        reason: String,
    },
    /// The save was written by an incompatible format version.
    #[error("save format version {found} is not supported (expected {})", SAVE_VERSION)]
    UnsupportedVersion {
        /// Version recorded in the save header.
        found: u32,
    },
}

impl From<bincode::Error> for PersistenceError {
    fn from(error: bincode::Error) -> Self {
        Self::Malformed {
            reason: error.to_string(),
        }
    }
}

/// Encodes `world` into a versioned save.
///
/// # Errors
///
/// Returns [`PersistenceError::Malformed`] if the world cannot be encoded.
pub fn save(world: &World) -> Result<Vec<u8>, PersistenceError> {
    let payload = bincode::serialize(world)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&SAVE_MAGIC);
    bytes.extend_from_slice(&SAVE_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Restores a world from bytes produced by [`save`].
///
/// # Errors
///
/// Returns [`PersistenceError::Malformed`] for truncated or foreign data and
/// [`PersistenceError::UnsupportedVersion`] for saves of another version.
pub fn load(bytes: &[u8]) -> Result<World, PersistenceError> {
    if bytes.len() < HEADER_LEN {
        return Err(PersistenceError::Malformed {
            reason: format!("save is {} bytes, shorter than its header", bytes.len()),
        });
    }
    let (magic, rest) = bytes.split_at(SAVE_MAGIC.len());
    if magic != SAVE_MAGIC {
        return Err(PersistenceError::Malformed {
            reason: "missing save magic".to_owned(),
        });
    }
    let (version, payload) = rest.split_at(std::mem::size_of::<u32>());
    let mut raw = [0; 4];
    raw.copy_from_slice(version);
    let found = u32::from_le_bytes(raw);
    if found != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion { found });
    }

    Ok(bincode::deserialize(payload)?)
}

/// Storage that keeps a single saved game.
pub trait SaveStore {
    /// Replaces the stored game with `world`.
    ///
    /// # Errors
    ///
    /// Returns an error if the world cannot be encoded or written.
    fn save(&mut self, world: &World) -> Result<(), PersistenceError>;

    /// Restores the stored game.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] when nothing has been saved.
    fn load(&self) -> Result<World, PersistenceError>;
}

/// Save slot backed by a file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store reading and writing `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the save file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for FileStore {
    fn save(&mut self, world: &World) -> Result<(), PersistenceError> {
        let bytes = save(world)?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &bytes)?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "game saved");
        Ok(())
    }

    fn load(&self) -> Result<World, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound)
            }
            Err(error) => return Err(error.into()),
        };
        let world = load(&bytes)?;
        tracing::info!(path = %self.path.display(), "game loaded");
        Ok(world)
    }
}

/// Save slot held in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    bytes: Option<Vec<u8>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded save currently held, if any.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn save(&mut self, world: &World) -> Result<(), PersistenceError> {
        self.bytes = Some(save(world)?);
        Ok(())
    }

    fn load(&self) -> Result<World, PersistenceError> {
        let bytes = self.bytes.as_deref().ok_or(PersistenceError::NotFound)?;
        load(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_core::GameSetup;

    fn world() -> World {
        World::new_game(&GameSetup::single_player(10, 4)).expect("setup")
    }

    #[test]
    fn saves_start_with_magic_and_version() {
        let bytes = save(&world()).expect("save");
        assert_eq!(&bytes[..4], b"FRNT");
        assert_eq!(&bytes[4..8], &SAVE_VERSION.to_le_bytes());
    }

    #[test]
    fn foreign_bytes_are_malformed() {
        assert!(matches!(
            load(b"ENSI\x01\x00\x00\x00rest"),
            Err(PersistenceError::Malformed { .. })
        ));
        assert!(matches!(
            load(b"FRN"),
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_payloads_are_malformed() {
        let bytes = save(&world()).expect("save");
        assert!(matches!(
            load(&bytes[..bytes.len() / 2]),
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut bytes = save(&world()).expect("save");
        bytes[4..8].copy_from_slice(&7_u32.to_le_bytes());
        assert!(matches!(
            load(&bytes),
            Err(PersistenceError::UnsupportedVersion { found: 7 })
        ));
    }

    #[test]
    fn empty_memory_store_reports_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.load(), Err(PersistenceError::NotFound)));
        assert!(store.bytes().is_none());
    }
}
