use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use crate::model::{Location, UnitSystem};

pub const FAVORITES_KEY: &str = "favorites";
pub const UNIT_KEY: &str = "unit";

/// Flat key→string persistence port. Reads happen once at startup,
/// writes after every mutation; last write wins and there is no
/// durability guarantee beyond that.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key under the platform data directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }

    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.dir.join(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write preference file: {}", path.display()))
    }
}

/// In-memory store for tests and embedders that bring their own
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Favorites are a JSON array of locations. Anything unreadable loads
/// as an empty list rather than an error.
pub fn load_favorites(store: &dyn KeyValueStore) -> Vec<Location> {
    store
        .get(FAVORITES_KEY)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub fn save_favorites(store: &dyn KeyValueStore, favorites: &[Location]) -> Result<()> {
    let raw = serde_json::to_string(favorites).context("Failed to serialize favorites")?;
    store.set(FAVORITES_KEY, &raw)
}

/// The unit preference is the plain string `celsius` or `fahrenheit`.
/// Anything unreadable loads as the default.
pub fn load_unit(store: &dyn KeyValueStore) -> UnitSystem {
    store
        .get(UNIT_KEY)
        .and_then(|raw| UnitSystem::try_from(raw.trim()).ok())
        .unwrap_or_default()
}

pub fn save_unit(store: &dyn KeyValueStore, unit: UnitSystem) -> Result<()> {
    store.set(UNIT_KEY, unit.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str, lat: f64, lon: f64) -> Location {
        Location {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            country: None,
            admin1: None,
        }
    }

    #[test]
    fn favorites_round_trip_preserves_order() {
        let store = MemoryStore::default();
        let favorites = vec![loc("London", 51.5, -0.12), loc("Cebu", 10.3, 123.9)];

        save_favorites(&store, &favorites).expect("save should succeed");
        let loaded = load_favorites(&store);

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "London");
        assert_eq!(loaded[1].name, "Cebu");
    }

    #[test]
    fn missing_favorites_load_as_empty() {
        let store = MemoryStore::default();
        assert!(load_favorites(&store).is_empty());
    }

    #[test]
    fn corrupt_favorites_load_as_empty() {
        let store = MemoryStore::default();
        store
            .set(FAVORITES_KEY, "not json at all")
            .expect("set should succeed");
        assert!(load_favorites(&store).is_empty());
    }

    #[test]
    fn unit_round_trips_and_defaults() {
        let store = MemoryStore::default();
        assert_eq!(load_unit(&store), UnitSystem::Celsius);

        save_unit(&store, UnitSystem::Fahrenheit).expect("save should succeed");
        assert_eq!(load_unit(&store), UnitSystem::Fahrenheit);

        store.set(UNIT_KEY, "kelvin").expect("set should succeed");
        assert_eq!(load_unit(&store), UnitSystem::Celsius);
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("prefs"));

        assert_eq!(store.get(UNIT_KEY), None);
        store.set(UNIT_KEY, "fahrenheit").expect("set should succeed");
        assert_eq!(store.get(UNIT_KEY).as_deref(), Some("fahrenheit"));
    }
}
