use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::error::{Result, SnakeError};

pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Flat JSON object on disk. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(SnakeError::StoreIo { path: self.path.clone(), source }),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking the write
        let mut values = match self.load() {
            Ok(values) => values,
            Err(SnakeError::StoreFormat(e)) => {
                warn!("Replacing malformed store {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_owned(), value.to_owned());

        let text = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, text)
            .map_err(|source| SnakeError::StoreIo { path: self.path.clone(), source })
    }
}

/// Best score across runs, backed by a store. Store failures never reach the
/// caller: reads fall back to zero, failed writes are dropped.
pub struct HighScore<S: KeyValueStore> {
    store: S,
    best: u32,
}

impl<S: KeyValueStore> HighScore<S> {
    pub fn load(store: S) -> Self {
        let mut high = HighScore { store, best: 0 };
        high.reload();
        high
    }

    /// Re-reads the stored value, as done at the start of every run.
    pub fn reload(&mut self) {
        self.best = match self.store.get(HIGH_SCORE_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring unparseable high score {:?}", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!("Could not read high score: {}", e);
                0
            }
        };
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Records a finished run. Returns true when `score` is a new best.
    pub fn submit(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }

        self.best = score;
        info!("New high score {}", score);
        if let Err(e) = self.store.set(HIGH_SCORE_KEY, &score.to_string()) {
            warn!("Could not save high score: {}", e);
        }
        true
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(SnakeError::Config("offline".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(SnakeError::Config("offline".into()))
        }
    }

    #[test]
    fn missing_score_reads_as_zero() {
        let high = HighScore::load(MemoryStore::new());
        assert_eq!(high.best(), 0);
    }

    #[test]
    fn only_higher_scores_are_saved() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "12").unwrap();
        let mut high = HighScore::load(store);

        assert!(!high.submit(12));
        assert!(!high.submit(3));
        assert!(high.submit(20));
        assert_eq!(high.store().get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("20"));
    }

    #[test]
    fn garbage_reads_as_zero() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        assert_eq!(HighScore::load(store).best(), 0);
    }

    #[test]
    fn store_failures_are_not_fatal() {
        let mut high = HighScore::load(BrokenStore);
        assert_eq!(high.best(), 0);
        assert!(high.submit(4));
        assert_eq!(high.best(), 4);
    }

    #[test]
    fn file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut store = FileStore::new(&path);
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap(), None);
        store.set(HIGH_SCORE_KEY, "7").unwrap();
        store.set("other", "x").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("7"));
        assert_eq!(HighScore::load(reopened).best(), 7);
    }

    #[test]
    fn corrupt_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{ broken").unwrap();

        let mut store = FileStore::new(&path);
        store.set(HIGH_SCORE_KEY, "3").unwrap();
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn unreadable_store_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file
        let mut store = FileStore::new(dir.path());

        let err = store.set(HIGH_SCORE_KEY, "3").unwrap_err();
        assert!(matches!(err, SnakeError::StoreIo { .. }), "{}", err);
        assert!(dir.path().is_dir());
    }

    #[test]
    fn corrupt_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "not json").unwrap();

        assert!(FileStore::new(&path).get(HIGH_SCORE_KEY).is_err());
        assert_eq!(HighScore::load(FileStore::new(&path)).best(), 0);
    }
}
