// ============================================
// World Registry - Хранилища всех загруженных миров
// ============================================
// Мир -> WorldStore. Создание при загрузке мира, закрытие при выгрузке.
// Обращение к незарегистрированному миру - ошибка, а не молчаливое создание.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path};

use rayon::prelude::*;

use crate::storage::{
    BlockPos, BlockValue, RocksStore, StoreError, StoreResult, WorldStats, WorldStore,
};

/// Реестр хранилищ по имени мира
pub struct WorldRegistry {
    worlds: HashMap<String, WorldStore<RocksStore>>,
}

impl WorldRegistry {
    pub fn new() -> Self {
        Self {
            worlds: HashMap::new(),
        }
    }

    /// Открыть хранилище мира в `<root>/<world>/`. Повторный вызов ничего не делает.
    pub fn register(&mut self, world: &str, root: impl AsRef<Path>) -> StoreResult<()> {
        if self.worlds.contains_key(world) {
            log::debug!("World '{}' already registered", world);
            return Ok(());
        }

        let dir = root.as_ref().join(world);
        if !is_plain_name(world) {
            return Err(StoreError::init(&dir, "world name must be a single path component"));
        }
        fs::create_dir_all(&dir).map_err(|e| StoreError::init(&dir, e))?;
        let store = RocksStore::open(&dir)?;

        self.worlds.insert(world.to_string(), WorldStore::new(world, store));
        log::info!("Opened block data for world '{}' at {}", world, dir.display());
        Ok(())
    }

    /// Финальный сброс и закрытие мира. Незарегистрированный мир - no-op.
    pub fn unregister(&mut self, world: &str) -> StoreResult<()> {
        match self.worlds.remove(world) {
            Some(store) => store.close(),
            None => Ok(()),
        }
    }

    /// Сбросить отложенные записи мира. Незарегистрированный мир - no-op.
    pub fn flush(&mut self, world: &str) -> StoreResult<()> {
        match self.worlds.get_mut(world) {
            Some(store) => store.flush_all(),
            None => Ok(()),
        }
    }

    /// Сбросить все миры. Пробуем каждый, возвращаем первую ошибку.
    pub fn flush_all(&mut self) -> StoreResult<()> {
        let mut first_error = None;
        for (name, store) in self.worlds.iter_mut() {
            if let Err(e) = store.flush_all() {
                log::error!("Failed to flush world '{}': {}", name, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Хранилище мира или NotRegistered
    pub fn with_world(&mut self, world: &str) -> StoreResult<&mut WorldStore<RocksStore>> {
        self.worlds
            .get_mut(world)
            .ok_or_else(|| StoreError::NotRegistered(world.to_string()))
    }

    /// Закрыть все миры (остановка хоста). Миры независимы - закрываем параллельно.
    pub fn close_all(&mut self) {
        if self.worlds.is_empty() {
            return;
        }

        let worlds: Vec<(String, WorldStore<RocksStore>)> = self.worlds.drain().collect();
        let total = worlds.len();

        let failures: Vec<(String, StoreError)> = worlds
            .into_par_iter()
            .filter_map(|(name, store)| store.close().err().map(|e| (name, e)))
            .collect();

        for (name, e) in &failures {
            log::error!("Failed to close world '{}': {}", name, e);
        }
        log::info!("Closed {} worlds ({} with errors)", total, failures.len());
    }

    // ========== Data API ==========

    pub fn set(
        &mut self,
        world: &str,
        x: i32,
        y: i32,
        z: i32,
        value: impl Into<BlockValue>,
    ) -> StoreResult<()> {
        self.with_world(world)?.set(BlockPos::new(x, y, z), value.into())
    }

    pub fn get(&mut self, world: &str, x: i32, y: i32, z: i32) -> StoreResult<Option<BlockValue>> {
        Ok(self.with_world(world)?.get(BlockPos::new(x, y, z))?.cloned())
    }

    pub fn has(&mut self, world: &str, x: i32, y: i32, z: i32) -> StoreResult<bool> {
        self.with_world(world)?.has(BlockPos::new(x, y, z))
    }

    pub fn remove(&mut self, world: &str, x: i32, y: i32, z: i32) -> StoreResult<()> {
        self.with_world(world)?.remove(BlockPos::new(x, y, z));
        Ok(())
    }

    // ========== Introspection ==========

    pub fn is_registered(&self, world: &str) -> bool {
        self.worlds.contains_key(world)
    }

    /// Имена зарегистрированных миров
    pub fn worlds(&self) -> impl Iterator<Item = &str> {
        self.worlds.keys().map(String::as_str)
    }

    pub fn stats(&self, world: &str) -> Option<WorldStats> {
        self.worlds.get(world).map(WorldStore::stats)
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }
}

/// Имя мира = ровно одна обычная компонента пути (без `..`, `/`, корня)
fn is_plain_name(world: &str) -> bool {
    let mut components = Path::new(world).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == world
    )
}

impl Default for WorldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorldRegistry {
    fn drop(&mut self) {
        if !self.worlds.is_empty() {
            log::warn!("WorldRegistry dropped with {} open worlds, closing", self.worlds.len());
            self.close_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_with(world: &str) -> (TempDir, WorldRegistry) {
        let tmp = TempDir::new().expect("create temp dir");
        let mut registry = WorldRegistry::new();
        registry.register(world, tmp.path()).expect("register failed");
        (tmp, registry)
    }

    #[test]
    fn test_register_creates_nested_directory() {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("plugins").join("data");
        let mut registry = WorldRegistry::new();

        registry.register("world_nether", &root).unwrap();

        assert!(root.join("world_nether").is_dir());
        assert!(registry.is_registered("world_nether"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_twice_keeps_existing_state() {
        let (tmp, mut registry) = registry_with("world");
        registry.set("world", 1, 2, 3, "cached").unwrap();

        registry.register("world", tmp.path()).unwrap();

        let stats = registry.stats("world").unwrap();
        assert_eq!(stats.cached_cells, 1);
        assert_eq!(stats.pending_writes, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_data_api_on_unregistered_world_fails() {
        let mut registry = WorldRegistry::new();

        assert!(matches!(registry.get("nowhere", 0, 0, 0), Err(StoreError::NotRegistered(_))));
        assert!(matches!(registry.set("nowhere", 0, 0, 0, 1), Err(StoreError::NotRegistered(_))));
        assert!(matches!(registry.has("nowhere", 0, 0, 0), Err(StoreError::NotRegistered(_))));
        assert!(matches!(registry.remove("nowhere", 0, 0, 0), Err(StoreError::NotRegistered(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_flush_and_unregister_unknown_world_are_noops() {
        let mut registry = WorldRegistry::new();
        registry.flush("ghost").unwrap();
        registry.unregister("ghost").unwrap();
    }

    #[test]
    fn test_round_trip_across_reopen() {
        let (tmp, mut registry) = registry_with("world");
        let value = BlockValue::map()
            .with("owner", "alice")
            .with("level", 3)
            .with("history", vec!["placed", "claimed"]);

        registry.set("world", -100, 64, 250, value.clone()).unwrap();
        registry.set("world", 0, 0, 0, 42).unwrap();
        registry.flush("world").unwrap();
        registry.unregister("world").unwrap();
        assert!(!registry.is_registered("world"));

        // Свежий хэндл поверх той же директории
        registry.register("world", tmp.path()).unwrap();
        assert_eq!(registry.get("world", -100, 64, 250).unwrap(), Some(value));
        assert_eq!(registry.get("world", 0, 0, 0).unwrap(), Some(BlockValue::Integer(42)));
        assert_eq!(registry.stats("world").unwrap().store_reads, 2);
    }

    #[test]
    fn test_unregister_flushes_pending_writes() {
        let (tmp, mut registry) = registry_with("world");
        registry.set("world", 5, 5, 5, true).unwrap();
        registry.remove("world", 6, 6, 6).unwrap();

        registry.unregister("world").unwrap();
        registry.register("world", tmp.path()).unwrap();

        assert!(registry.has("world", 5, 5, 5).unwrap());
        assert!(!registry.has("world", 6, 6, 6).unwrap());
    }

    #[test]
    fn test_worlds_are_independent() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut registry = WorldRegistry::new();
        registry.register("overworld", tmp.path()).unwrap();
        registry.register("nether", tmp.path()).unwrap();

        registry.set("overworld", 0, 0, 0, 42).unwrap();
        registry.set("nether", 0, 0, 0, "hello").unwrap();

        assert_eq!(registry.get("overworld", 0, 0, 0).unwrap(), Some(BlockValue::Integer(42)));
        assert_eq!(registry.get("nether", 0, 0, 0).unwrap(), Some(BlockValue::from("hello")));

        let mut names: Vec<&str> = registry.worlds().collect();
        names.sort();
        assert_eq!(names, vec!["nether", "overworld"]);
    }

    #[test]
    fn test_close_all_persists_every_world() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut registry = WorldRegistry::new();
        for name in ["a", "b", "c"] {
            registry.register(name, tmp.path()).unwrap();
            registry.set(name, 1, 1, 1, name).unwrap();
        }

        registry.close_all();
        assert!(registry.is_empty());

        for name in ["a", "b", "c"] {
            registry.register(name, tmp.path()).unwrap();
            assert_eq!(registry.get(name, 1, 1, 1).unwrap(), Some(BlockValue::from(name)));
        }
        registry.flush_all().unwrap();
    }

    #[test]
    fn test_register_fails_when_root_is_a_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let file = tmp.path().join("occupied");
        fs::write(&file, b"x").unwrap();

        let mut registry = WorldRegistry::new();
        let result = registry.register("world", &file);

        assert!(matches!(result, Err(StoreError::StorageInit { .. })));
        assert!(!registry.is_registered("world"));
    }

    #[test]
    fn test_register_rejects_names_outside_root() {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("data");
        let mut registry = WorldRegistry::new();

        for name in ["../escape", "/abs", "a/b", "..", ".", "", "world/"] {
            let result = registry.register(name, &root);
            assert!(
                matches!(result, Err(StoreError::StorageInit { .. })),
                "name {:?} must be rejected",
                name
            );
        }

        assert!(registry.is_empty());
        assert!(!tmp.path().join("escape").exists());
        assert!(!root.exists());

        registry.register("world_the_end", &root).unwrap();
        assert!(root.join("world_the_end").is_dir());
    }
}
