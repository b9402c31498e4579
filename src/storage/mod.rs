// ============================================
// Storage Module - Данные блоков мира
// ============================================
// Ленивый read-through кэш + write-behind буфер поверх RocksDB.
// Память освобождается по чанкам при их выгрузке.

pub mod backend;
mod codec;
mod error;
mod keys;
mod value;
mod world_store;

pub use backend::{BatchOp, KeyedStore, MemoryStore, RocksStore};
pub use codec::ValueCodec;
pub use error::{StoreError, StoreResult};
pub use keys::{BlockPos, ChunkKey, BLOCK_RECORD_TAG, CHUNK_SIZE, RECORD_KEY_LEN};
pub use value::{BlockValue, MAX_NESTING};
pub use world_store::{WorldStats, WorldStore};
