//! Best-score persistence.
//!
//! A single integer survives between runs.  The file store keeps it as a
//! small JSON document; an absent or unreadable file counts as zero.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the best score lives between sessions.
pub trait ScoreStore {
    /// Stored best score; 0 when nothing has been stored yet.
    fn load(&self) -> u32;
    fn save(&mut self, score: u32) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    best_score: u32,
}

/// JSON file on disk, `{"best_score": N}`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    /// `$HOME/.space_shooter.json`, or the working directory without a home.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".space_shooter.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for FileStore {
    fn load(&self) -> u32 {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No best score at {}, starting fresh", self.path.display());
                return 0;
            }
            Err(e) => {
                log::warn!("Could not read {}: {}", self.path.display(), e);
                return 0;
            }
        };
        match serde_json::from_str::<Record>(&text) {
            Ok(record) => record.best_score,
            Err(e) => {
                log::warn!("Ignoring corrupt score file {}: {}", self.path.display(), e);
                0
            }
        }
    }

    fn save(&mut self, score: u32) -> Result<()> {
        let json = serde_json::to_string(&Record { best_score: score })?;
        std::fs::write(&self.path, json).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Keeps the score in memory only; used by tests and `--no-save` runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub best_score: u32,
    /// Number of successful saves.
    pub saves: usize,
}

impl MemoryStore {
    pub fn with_best(best_score: u32) -> Self {
        MemoryStore {
            best_score,
            saves: 0,
        }
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.best_score
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.best_score = score;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn saved_score_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        let mut store = FileStore::new(&path);
        store.save(8).unwrap();

        assert_eq!(FileStore::new(&path).load(), 8);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, r#"{"best_score":8}"#);
    }

    #[test]
    fn corrupt_file_loads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FileStore::new(&path).load(), 0);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("missing").join("best.json"));
        assert!(matches!(store.save(3), Err(Error::Write { .. })));
    }
}
