//! Persisted match documents
//!
//! Each match is one JSON document holding the whole state and a version
//! number. Saving names the version the caller loaded; if the stored
//! version has moved on since, the save fails with `VersionConflict` and
//! the caller must reload.

use crate::game::ExtendedGameState;
use crate::{DuelError, Result};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A stored match with its concurrency token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGame {
    pub version: u64,
    pub saved_at: DateTime<Utc>,
    pub state: ExtendedGameState,
}

impl StoredGame {
    fn encode(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DuelError::SerializationError(e.to_string()))
    }

    fn decode(game_id: &str, text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DuelError::StateCorruption(format!("game {game_id}: {e}")))
    }
}

/// Reads just the version of a stored document
#[derive(Deserialize)]
struct VersionHeader {
    version: u64,
}

fn stored_version(game_id: &str, text: &str) -> Result<u64> {
    serde_json::from_str::<VersionHeader>(text)
        .map(|h| h.version)
        .map_err(|e| DuelError::StateCorruption(format!("game {game_id}: {e}")))
}

fn check_version(game_id: &str, expected: u64, found: u64) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(DuelError::VersionConflict {
            game_id: game_id.to_string(),
            expected,
            found,
        })
    }
}

#[allow(async_fn_in_trait)]
pub trait GameStore {
    /// Store a new match at version 1
    async fn create(&self, game_id: &str, state: &ExtendedGameState) -> Result<StoredGame>;

    async fn load(&self, game_id: &str) -> Result<StoredGame>;

    /// Replace a match, provided it is still at `expected_version`
    async fn save(&self, game_id: &str, expected_version: u64, state: &ExtendedGameState) -> Result<StoredGame>;

    /// Ids of all stored matches, sorted
    async fn list(&self) -> Result<Vec<String>>;
}

/// Documents held in memory as JSON text
#[derive(Debug, Clone, Default)]
pub struct MemoryGameStore {
    documents: Arc<RwLock<FxHashMap<String, String>>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a document's raw text
    pub async fn put_raw(&self, game_id: &str, text: String) {
        self.documents.write().await.insert(game_id.to_string(), text);
    }
}

impl GameStore for MemoryGameStore {
    async fn create(&self, game_id: &str, state: &ExtendedGameState) -> Result<StoredGame> {
        let mut docs = self.documents.write().await;
        if docs.contains_key(game_id) {
            return Err(DuelError::GameAlreadyExists(game_id.to_string()));
        }
        let stored = StoredGame {
            version: 1,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        docs.insert(game_id.to_string(), stored.encode()?);
        Ok(stored)
    }

    async fn load(&self, game_id: &str) -> Result<StoredGame> {
        let docs = self.documents.read().await;
        let text = docs
            .get(game_id)
            .ok_or_else(|| DuelError::GameNotFound(game_id.to_string()))?;
        StoredGame::decode(game_id, text)
    }

    async fn save(&self, game_id: &str, expected_version: u64, state: &ExtendedGameState) -> Result<StoredGame> {
        let mut docs = self.documents.write().await;
        let text = docs
            .get(game_id)
            .ok_or_else(|| DuelError::GameNotFound(game_id.to_string()))?;
        check_version(game_id, expected_version, stored_version(game_id, text)?)?;

        let stored = StoredGame {
            version: expected_version + 1,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        docs.insert(game_id.to_string(), stored.encode()?);
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.documents.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// One `<game_id>.json` file per match in a directory
#[derive(Debug, Clone)]
pub struct FileGameStore {
    dir: PathBuf,
    /// Serializes read-check-write cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl FileGameStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileGameStore {
            dir: dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, game_id: &str) -> Result<PathBuf> {
        let valid = !game_id.is_empty()
            && game_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DuelError::GameNotFound(format!("invalid game id '{game_id}'")));
        }
        Ok(self.dir.join(format!("{game_id}.json")))
    }

    async fn read(&self, game_id: &str) -> Result<String> {
        let path = self.path_for(game_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DuelError::GameNotFound(game_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temporary file so readers never see half a document
    async fn write(&self, game_id: &str, stored: &StoredGame) -> Result<()> {
        let path = self.path_for(game_id)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, stored.encode()?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

impl GameStore for FileGameStore {
    async fn create(&self, game_id: &str, state: &ExtendedGameState) -> Result<StoredGame> {
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(self.path_for(game_id)?).await? {
            return Err(DuelError::GameAlreadyExists(game_id.to_string()));
        }
        let stored = StoredGame {
            version: 1,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        self.write(game_id, &stored).await?;
        Ok(stored)
    }

    async fn load(&self, game_id: &str) -> Result<StoredGame> {
        let text = self.read(game_id).await?;
        StoredGame::decode(game_id, &text)
    }

    async fn save(&self, game_id: &str, expected_version: u64, state: &ExtendedGameState) -> Result<StoredGame> {
        let _guard = self.write_lock.lock().await;
        let text = self.read(game_id).await?;
        check_version(game_id, expected_version, stored_version(game_id, &text)?)?;

        let stored = StoredGame {
            version: expected_version + 1,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        self.write(game_id, &stored).await?;
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Phase;

    fn state() -> ExtendedGameState {
        let mut state = ExtendedGameState::new(11, 20);
        state.turn_number = 1;
        state.current_phase = Phase::PreCombatMain;
        state
    }

    #[tokio::test]
    async fn test_memory_store_versions() {
        let store = MemoryGameStore::new();
        let created = store.create("g1", &state()).await.unwrap();
        assert_eq!(created.version, 1);

        let saved = store.save("g1", 1, &state()).await.unwrap();
        assert_eq!(saved.version, 2);

        let stale = store.save("g1", 1, &state()).await.unwrap_err();
        assert!(matches!(
            stale,
            DuelError::VersionConflict {
                expected: 1,
                found: 2,
                ..
            }
        ));

        let loaded = store.load("g1").await.unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.state, state());
    }

    #[tokio::test]
    async fn test_memory_store_errors() {
        let store = MemoryGameStore::new();
        assert!(matches!(store.load("nope").await, Err(DuelError::GameNotFound(_))));

        store.create("g1", &state()).await.unwrap();
        assert!(matches!(
            store.create("g1", &state()).await,
            Err(DuelError::GameAlreadyExists(_))
        ));

        store.put_raw("g1", "{\"version\": 3, \"state\": 17}".to_string()).await;
        assert!(matches!(store.load("g1").await, Err(DuelError::StateCorruption(_))));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("duel-store-{}", std::process::id()));
        let store = FileGameStore::new(&dir);

        store.create("match-a", &state()).await.unwrap();
        let saved = store.save("match-a", 1, &state()).await.unwrap();
        assert_eq!(saved.version, 2);
        assert_eq!(store.load("match-a").await.unwrap().version, 2);
        assert_eq!(store.list().await.unwrap(), vec!["match-a".to_string()]);

        assert!(store.load("../etc/passwd").await.is_err());
        assert!(store.save("match-a", 1, &state()).await.is_err());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
