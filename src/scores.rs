use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::StoreError;
use crate::games::GameId;

/// Minimal durable key-value contract used for best scores.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A flat JSON object of string values on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("festplay").join("scores.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Score/persistence adapter: monotonic best score per game.
///
/// The first store failure is logged and the adapter drops to session-only
/// tracking; games never see the error.
pub struct BestScores {
    store: Option<Box<dyn KeyValueStore>>,
    best: HashMap<GameId, u32>,
}

impl BestScores {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store: Some(store),
            best: HashMap::new(),
        }
    }

    pub fn session_only() -> Self {
        Self {
            store: None,
            best: HashMap::new(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Best known score. Reads through to the store on first use.
    pub fn load_best(&mut self, game: GameId) -> u32 {
        if let Some(&best) = self.best.get(&game) {
            return best;
        }
        let best = game.best_key().map_or(0, |key| self.read(key));
        self.best.insert(game, best);
        best
    }

    /// Cached best without touching the store.
    pub fn best(&self, game: GameId) -> u32 {
        self.best.get(&game).copied().unwrap_or(0)
    }

    /// Records `score` if it beats the previous best. Returns whether it did.
    pub fn save_best(&mut self, game: GameId, score: u32) -> bool {
        let Some(key) = game.best_key() else {
            return false;
        };
        if score <= self.load_best(game) {
            return false;
        }
        self.best.insert(game, score);
        info!(game = game.name(), score, "new best score");
        let written = self.store.as_mut().map(|store| store.set(key, &score.to_string()));
        if let Some(Err(err)) = written {
            self.degrade(err);
        }
        true
    }

    fn read(&mut self, key: &str) -> u32 {
        let Some(read) = self.store.as_ref().map(|store| store.get(key)) else {
            return 0;
        };
        match read {
            Ok(None) => 0,
            Ok(Some(value)) => match value.trim().parse() {
                Ok(score) => score,
                Err(_) => {
                    warn!(
                        "{}",
                        StoreError::Malformed {
                            key: key.to_string(),
                            value
                        }
                    );
                    0
                }
            },
            Err(err) => {
                self.degrade(err);
                0
            }
        }
    }

    fn degrade(&mut self, err: StoreError) {
        warn!(%err, "best scores fall back to this session only");
        self.store = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl KeyValueStore for Broken {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::other("disk gone").into())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk gone").into())
        }
    }

    #[test]
    fn only_higher_scores_replace_the_best() {
        let mut scores = BestScores::new(Box::new(MemoryStore::default()));
        assert_eq!(scores.load_best(GameId::Snake), 0);
        assert!(scores.save_best(GameId::Snake, 12));
        assert!(!scores.save_best(GameId::Snake, 12));
        assert!(!scores.save_best(GameId::Snake, 3));
        assert!(scores.save_best(GameId::Snake, 13));
        assert_eq!(scores.best(GameId::Snake), 13);
    }

    #[test]
    fn games_without_a_key_are_not_recorded() {
        let mut scores = BestScores::new(Box::new(MemoryStore::default()));
        assert!(!scores.save_best(GameId::TicTacToe, 5));
        assert_eq!(scores.load_best(GameId::Memory), 0);
    }

    #[test]
    fn broken_store_degrades_to_session_memory() {
        let mut scores = BestScores::new(Box::new(Broken));
        assert_eq!(scores.load_best(GameId::Flappy), 0);
        assert!(!scores.is_persistent());
        assert!(scores.save_best(GameId::Flappy, 4));
        assert_eq!(scores.load_best(GameId::Flappy), 4);
        assert!(!scores.save_best(GameId::Flappy, 2));
    }

    #[test]
    fn file_store_round_trips_between_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");

        let mut first = BestScores::new(Box::new(JsonFileStore::new(&path)));
        assert!(first.save_best(GameId::Flappy, 7));
        assert!(first.save_best(GameId::Snake, 3));

        let mut second = BestScores::new(Box::new(JsonFileStore::new(&path)));
        assert_eq!(second.load_best(GameId::Flappy), 7);
        assert_eq!(second.load_best(GameId::Snake), 3);
        assert!(second.is_persistent());

        let raw = JsonFileStore::new(&path).get("flappyBirdHighScore").unwrap();
        assert_eq!(raw.as_deref(), Some("7"));
    }

    #[test]
    fn corrupt_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{ not json").unwrap();

        let mut scores = BestScores::new(Box::new(JsonFileStore::new(&path)));
        assert_eq!(scores.load_best(GameId::Snake), 0);
        assert!(!scores.is_persistent());
        assert!(scores.save_best(GameId::Snake, 1));
    }

    #[test]
    fn malformed_value_reads_as_zero() {
        let mut store = MemoryStore::default();
        store.set("snakeHighScore", "lots").unwrap();
        let mut scores = BestScores::new(Box::new(store));
        assert_eq!(scores.load_best(GameId::Snake), 0);
        assert!(scores.is_persistent());
    }
}
