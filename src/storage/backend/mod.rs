// ============================================
// Keyed Store - Граница с персистентным хранилищем
// ============================================
//
// Хранилище непрозрачно: байтовый ключ -> байтовое значение,
// точечное чтение + атомарный батч put/delete.
//
// Две реализации:
// - RocksStore: RocksDB на диске (по директории на мир)
// - MemoryStore: BTreeMap в памяти (без диска, для тестов)

mod memory;
mod rocks;

pub use memory::MemoryStore;
pub use rocks::RocksStore;

use super::error::StoreResult;

/// Одна операция батча
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Упорядоченное key-value хранилище с атомарными батчами.
/// Доступ однопоточный: один писатель на экземпляр.
pub trait KeyedStore {
    /// Точечное чтение
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Применить батч целиком или не применить вовсе
    fn write_batch(&mut self, ops: Vec<BatchOp>) -> StoreResult<()>;

    /// Освободить ресурсы хранилища
    fn close(self) -> StoreResult<()>
    where
        Self: Sized;
}
