//! Replay persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use game_core::ReplayLog;

use super::RepositoryError;

type Result<T> = std::result::Result<T, RepositoryError>;

/// Storage for the most recent replay.
pub trait ReplayRepository: Send + Sync {
    /// Overwrites the stored replay.
    fn save(&self, replay: &ReplayLog) -> Result<()>;

    /// Loads the stored replay, if any.
    fn load(&self) -> Result<Option<ReplayLog>>;
}

/// File-based implementation of [`ReplayRepository`].
///
/// # File Format
///
/// `u32 seed`, `u64 count`, then `count` fixed 15-byte command records,
/// all little-endian. See [`ReplayLog`].
pub struct FileReplayRepository {
    path: PathBuf,
}

impl FileReplayRepository {
    pub const DEFAULT_FILE_NAME: &'static str = "replay.sav";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `replay.sav` inside `dir`, creating the directory if needed.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self::new(dir.join(Self::DEFAULT_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReplayRepository for FileReplayRepository {
    fn save(&self, replay: &ReplayLog) -> Result<()> {
        let bytes = replay.encode()?;
        let temp_path = self.path.with_extension("sav.tmp");

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            seed = replay.seed,
            commands = replay.commands.len(),
            "replay saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<ReplayLog>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let replay = ReplayLog::decode(&bytes)?;
        tracing::debug!(path = %self.path.display(), commands = replay.commands.len(), "replay loaded");
        Ok(Some(replay))
    }
}

/// In-memory implementation of [`ReplayRepository`], for tests and
/// embedders that keep replays elsewhere.
#[derive(Default)]
pub struct InMemoryReplayRepository {
    replay: RwLock<Option<ReplayLog>>,
}

impl InMemoryReplayRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayRepository for InMemoryReplayRepository {
    fn save(&self, replay: &ReplayLog) -> Result<()> {
        let mut current = self
            .replay
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *current = Some(replay.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<ReplayLog>> {
        let current = self
            .replay
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use game_core::{CharacterId, Command, Position};

    use super::*;

    fn sample() -> ReplayLog {
        ReplayLog::new(
            42,
            vec![
                Command::Move {
                    actor: CharacterId(1),
                    destination: Position::new(3, 2),
                },
                Command::Wait {
                    actor: CharacterId(2),
                },
            ],
        )
    }

    #[test]
    fn file_repository_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileReplayRepository::in_dir(dir.path().join("saves")).unwrap();
        assert_eq!(repo.load().unwrap(), None);

        repo.save(&sample()).unwrap();
        let bytes = fs::read(repo.path()).unwrap();
        assert_eq!(bytes.len(), 4 + 8 + 2 * 15);
        assert_eq!(&bytes[..4], &42u32.to_le_bytes());

        let shorter = ReplayLog::new(7, Vec::new());
        repo.save(&shorter).unwrap();
        assert_eq!(repo.load().unwrap(), Some(shorter));
    }

    #[test]
    fn truncated_files_are_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileReplayRepository::in_dir(dir.path()).unwrap();
        let mut bytes = sample().encode().unwrap();
        bytes.truncate(bytes.len() - 3);
        fs::write(repo.path(), bytes).unwrap();
        assert!(matches!(repo.load(), Err(RepositoryError::Corrupted(_))));
    }

    #[test]
    fn memory_repository_keeps_the_last_save() {
        let repo = InMemoryReplayRepository::new();
        repo.save(&sample()).unwrap();
        assert_eq!(repo.load().unwrap(), Some(sample()));
    }
}
