//! File-backed high score.
//!
//! The record is a small JSON document under the platform data directory,
//! e.g. `~/.local/share/ecorunner/high_score.json`. Last write wins.

use ecorunner_common::PersistenceError;
use ecorunner_gameplay::HighScoreStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::APP_DIR_NAME;

/// High score file name.
pub const HIGH_SCORE_FILE_NAME: &str = "high_score.json";

/// On-disk record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u64,
}

/// High score persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    /// Record location
    path: PathBuf,
}

impl FileHighScoreStore {
    /// Open a store at `path`, creating its parent directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("High score store at {}", path.display());
        Ok(Self { path })
    }

    /// Returns the default record path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        match dirs::data_dir() {
            Some(data_dir) => data_dir.join(APP_DIR_NAME).join(HIGH_SCORE_FILE_NAME),
            None => PathBuf::from(HIGH_SCORE_FILE_NAME),
        }
    }

    /// Returns the record path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> Result<u64, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(PersistenceError::Missing),
            Err(e) => return Err(e.into()),
        };
        let record: HighScoreRecord = serde_json::from_str(&contents)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        Ok(record.high_score)
    }

    fn save(&mut self, high_score: u64) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&HighScoreRecord { high_score })
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        fs::write(&self.path, json)?;
        info!(high_score, "High score saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileHighScoreStore::open(temp_dir.path().join("scores").join("hs.json"))
            .expect("open store");
        assert!(matches!(store.load(), Err(PersistenceError::Missing)));
        assert!(temp_dir.path().join("scores").is_dir());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(HIGH_SCORE_FILE_NAME);

        let mut store = FileHighScoreStore::open(&path).expect("open store");
        store.save(420).expect("save");
        store.save(1337).expect("save again");

        let reopened = FileHighScoreStore::open(&path).expect("reopen store");
        assert_eq!(reopened.load().expect("load"), 1337);
    }

    #[test]
    fn test_corrupt_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(HIGH_SCORE_FILE_NAME);
        fs::write(&path, "not json").expect("write");

        let store = FileHighScoreStore::open(&path).expect("open store");
        assert!(matches!(store.load(), Err(PersistenceError::Corrupt(_))));
    }

    #[test]
    fn test_default_path_names_file() {
        assert!(FileHighScoreStore::default_path().ends_with(HIGH_SCORE_FILE_NAME));
    }
}
