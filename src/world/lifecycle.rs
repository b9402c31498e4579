// ============================================
// World Lifecycle - События хоста -> вызовы реестра
// ============================================
// Каждое событие = один детерминированный вызов, без шины событий.
// Ошибки здесь некому вернуть: логируем и продолжаем.

use std::path::{Path, PathBuf};

use crate::config::DataConfig;
use crate::storage::{BlockPos, ChunkKey};

use super::registry::WorldRegistry;

/// Причина разрушения блока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestroyCause {
    Break,
    Explode,
    Burn,
    Decay,
}

/// Адаптер жизненного цикла: владеет реестром
pub struct WorldLifecycle {
    registry: WorldRegistry,
    data_root: PathBuf,
    auto_cleanup: bool,
}

impl WorldLifecycle {
    /// `base` - директория хоста, от которой считается корень по умолчанию
    pub fn new(config: &DataConfig, base: impl Into<PathBuf>) -> Self {
        let data_root = config.data_root(base.into());
        log::debug!(
            "Block data root: {} (auto cleanup: {})",
            data_root.display(),
            config.auto_cleanup
        );
        Self {
            registry: WorldRegistry::new(),
            data_root,
            auto_cleanup: config.auto_cleanup,
        }
    }

    pub fn registry(&self) -> &WorldRegistry {
        &self.registry
    }

    /// Реестр для data API (set/get/has/remove)
    pub fn registry_mut(&mut self) -> &mut WorldRegistry {
        &mut self.registry
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    // ========== World events ==========

    pub fn world_loaded(&mut self, world: &str) {
        if let Err(e) = self.registry.register(world, &self.data_root) {
            log::error!("Cannot open block data for world '{}': {}", world, e);
        }
    }

    pub fn world_unloaded(&mut self, world: &str) {
        if let Err(e) = self.registry.unregister(world) {
            log::error!("Failed to close block data for world '{}': {}", world, e);
        }
    }

    /// Сохранение мира. Учитывается только при включённом автосохранении.
    pub fn world_save_requested(&mut self, world: &str, auto_save: bool) {
        if !auto_save {
            log::trace!("Skipping save of world '{}': auto-save disabled", world);
            return;
        }
        if let Err(e) = self.registry.flush(world) {
            log::error!("Failed to save block data for world '{}': {}", world, e);
        }
    }

    // ========== Chunk events ==========

    pub fn chunk_loaded(&mut self, world: &str, cx: i32, cz: i32) {
        match self.registry.with_world(world) {
            Ok(store) => store.mark_chunk_loaded(ChunkKey::new(cx, cz)),
            Err(_) => log::trace!("Chunk ({}, {}) loaded in unknown world '{}'", cx, cz, world),
        }
    }

    pub fn chunk_unloaded(&mut self, world: &str, cx: i32, cz: i32) {
        let Ok(store) = self.registry.with_world(world) else {
            log::trace!("Chunk ({}, {}) unloaded in unknown world '{}'", cx, cz, world);
            return;
        };
        if let Err(e) = store.unload_chunk(ChunkKey::new(cx, cz)) {
            log::error!(
                "Failed to flush chunk ({}, {}) of world '{}' before eviction: {}",
                cx,
                cz,
                world,
                e
            );
        }
    }

    /// Остановка хоста: закрыть все миры
    pub fn owner_shutting_down(&mut self) {
        self.registry.close_all();
    }

    // ========== Destruction cleanup ==========

    pub fn auto_cleanup(&self) -> bool {
        self.auto_cleanup
    }

    /// Блок разрушен. Данные удаляются только при auto_cleanup.
    pub fn block_destroyed(&mut self, world: &str, pos: BlockPos, cause: DestroyCause) {
        if !self.auto_cleanup {
            return;
        }
        log::trace!("Block {:?} destroyed by {:?} in '{}'", pos, cause, world);
        self.cleanup(world, std::iter::once(pos));
    }

    /// Взрыв: пачка разрушенных блоков
    pub fn blocks_exploded(&mut self, world: &str, positions: &[BlockPos]) {
        if !self.auto_cleanup {
            return;
        }
        self.cleanup(world, positions.iter().copied());
    }

    fn cleanup(&mut self, world: &str, positions: impl Iterator<Item = BlockPos>) {
        match self.registry.with_world(world) {
            Ok(store) => positions.for_each(|pos| store.remove(pos)),
            Err(e) => log::debug!("Skipping cleanup: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BlockValue;
    use tempfile::TempDir;

    fn lifecycle(auto_cleanup: bool) -> (TempDir, WorldLifecycle) {
        let tmp = TempDir::new().expect("create temp dir");
        let config = DataConfig {
            auto_cleanup,
            storage_root: None,
        };
        let lifecycle = WorldLifecycle::new(&config, tmp.path());
        (tmp, lifecycle)
    }

    #[test]
    fn test_world_load_uses_default_root() {
        let (tmp, mut lc) = lifecycle(false);
        lc.world_loaded("world");

        assert!(lc.registry().is_registered("world"));
        assert!(tmp.path().join("blockdata").join("world").is_dir());
    }

    #[test]
    fn test_storage_root_override() {
        let tmp = TempDir::new().expect("create temp dir");
        let config = DataConfig {
            auto_cleanup: false,
            storage_root: Some(tmp.path().join("custom")),
        };
        let mut lc = WorldLifecycle::new(&config, "/unused");
        lc.world_loaded("world");

        assert!(tmp.path().join("custom").join("world").is_dir());
    }

    #[test]
    fn test_save_honored_only_with_auto_save() {
        let (_tmp, mut lc) = lifecycle(false);
        lc.world_loaded("world");
        lc.registry_mut().set("world", 0, 0, 0, 1).unwrap();

        lc.world_save_requested("world", false);
        assert_eq!(lc.registry().stats("world").unwrap().pending_writes, 1);

        lc.world_save_requested("world", true);
        assert_eq!(lc.registry().stats("world").unwrap().pending_writes, 0);

        // Мир не загружен - тихо игнорируется
        lc.world_save_requested("other", true);
    }

    #[test]
    fn test_chunk_unload_evicts_and_persists() {
        let (_tmp, mut lc) = lifecycle(false);
        lc.world_loaded("world");
        lc.chunk_loaded("world", 0, 0);
        lc.registry_mut().set("world", 3, 70, 3, "chest").unwrap();
        lc.registry_mut().set("world", 100, 70, 100, "door").unwrap();

        lc.chunk_unloaded("world", 0, 0);

        let stats = lc.registry().stats("world").unwrap();
        assert_eq!(stats.cached_cells, 1);
        assert_eq!(stats.pending_writes, 1);
        assert_eq!(stats.tracked_chunks, 1);

        let reg = lc.registry_mut();
        assert_eq!(reg.get("world", 3, 70, 3).unwrap(), Some(BlockValue::from("chest")));
    }

    #[test]
    fn test_chunk_events_for_unknown_world_are_ignored() {
        let (_tmp, mut lc) = lifecycle(false);
        lc.chunk_loaded("ghost", 1, 1);
        lc.chunk_unloaded("ghost", 1, 1);
        assert!(lc.registry().is_empty());
    }

    #[test]
    fn test_destruction_cleanup_respects_toggle() {
        let (_tmp, mut lc) = lifecycle(false);
        lc.world_loaded("world");
        lc.registry_mut().set("world", 1, 1, 1, "sign").unwrap();

        lc.block_destroyed("world", BlockPos::new(1, 1, 1), DestroyCause::Break);
        assert!(lc.registry_mut().has("world", 1, 1, 1).unwrap());

        let (_tmp2, mut lc) = lifecycle(true);
        lc.world_loaded("world");
        lc.registry_mut().set("world", 1, 1, 1, "sign").unwrap();
        lc.registry_mut().set("world", 2, 1, 1, "tnt").unwrap();
        lc.registry_mut().set("world", 3, 1, 1, "log").unwrap();

        lc.block_destroyed("world", BlockPos::new(1, 1, 1), DestroyCause::Burn);
        lc.blocks_exploded("world", &[BlockPos::new(2, 1, 1), BlockPos::new(9, 9, 9)]);

        let reg = lc.registry_mut();
        assert!(!reg.has("world", 1, 1, 1).unwrap());
        assert!(!reg.has("world", 2, 1, 1).unwrap());
        assert!(reg.has("world", 3, 1, 1).unwrap());
    }

    #[test]
    fn test_unload_and_shutdown_close_worlds() {
        let (tmp, mut lc) = lifecycle(false);
        lc.world_loaded("a");
        lc.world_loaded("b");
        lc.registry_mut().set("a", 0, 0, 0, 42).unwrap();

        lc.world_unloaded("a");
        assert!(!lc.registry().is_registered("a"));
        lc.world_unloaded("a");

        lc.owner_shutting_down();
        assert!(lc.registry().is_empty());

        let mut fresh = WorldLifecycle::new(&DataConfig::default(), tmp.path());
        fresh.world_loaded("a");
        assert_eq!(
            fresh.registry_mut().get("a", 0, 0, 0).unwrap(),
            Some(BlockValue::Integer(42))
        );
    }
}
