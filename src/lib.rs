// ============================================
// Block Data - Значения, привязанные к блокам мира
// ============================================
// Один RocksDB на мир, кэш в памяти, выгрузка по чанкам.
//
// Использование:
//   let mut lifecycle = WorldLifecycle::new(&config, host_dir);
//   lifecycle.world_loaded("world");
//   lifecycle.registry_mut().set("world", x, y, z, value)?;

pub mod config;
pub mod storage;
pub mod world;

pub use config::{ConfigError, DataConfig, DEFAULT_DATA_DIR};
pub use storage::{
    BlockPos, BlockValue, ChunkKey, KeyedStore, StoreError, StoreResult, WorldStats, WorldStore,
};
pub use world::{DestroyCause, WorldLifecycle, WorldRegistry};
