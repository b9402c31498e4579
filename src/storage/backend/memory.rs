// ============================================
// Memory Store - Хранилище в памяти
// ============================================

use std::collections::BTreeMap;

use super::{BatchOp, KeyedStore};
use crate::storage::error::StoreResult;

/// Хранилище на BTreeMap. Ничего не переживает процесс.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Количество записей
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Записать байты в обход кэша (импорт, тесты битых записей)
    pub fn insert_raw(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.records.insert(key, value);
    }
}

impl KeyedStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn write_batch(&mut self, ops: Vec<BatchOp>) -> StoreResult<()> {
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    self.records.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    self.records.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn close(self) -> StoreResult<()> {
        Ok(())
    }
}
