// ============================================
// Rocks Store - RocksDB хранилище мира
// ============================================
// Одна база на мир: <data_root>/<world>/
// Блоки сжимаются встроенным ZSTD

use std::path::{Path, PathBuf};

use rocksdb::{DBCompressionType, Options, WriteBatch, DB};

use super::{BatchOp, KeyedStore};
use crate::storage::error::{StoreError, StoreResult};

/// Персистентное хранилище поверх RocksDB
pub struct RocksStore {
    db: DB,
    path: PathBuf,
}

impl RocksStore {
    /// Открыть (или создать) базу в директории
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(DBCompressionType::Zstd);

        let db = DB::open(&opts, path).map_err(|e| StoreError::init(path, e))?;
        log::debug!("Opened block store at {}", path.display());

        Ok(Self { db, path: path.to_path_buf() })
    }
}

impl KeyedStore for RocksStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.db.get(key).map_err(|e| StoreError::io("get", e))
    }

    fn write_batch(&mut self, ops: Vec<BatchOp>) -> StoreResult<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let count = ops.len();
        let mut batch = WriteBatch::default();
        for op in ops {
            match op {
                BatchOp::Put { key, value } => batch.put(key, value),
                BatchOp::Delete { key } => batch.delete(key),
            }
        }

        self.db.write(batch).map_err(|e| StoreError::io("write_batch", e))?;
        log::trace!("WRITE batch of {} ops to {}", count, self.path.display());
        Ok(())
    }

    fn close(self) -> StoreResult<()> {
        // Сбрасываем memtable, сам DB закрывается в Drop
        self.db.flush().map_err(|e| StoreError::io("close", e))?;
        log::debug!("Closed block store at {}", self.path.display());
        Ok(())
    }
}
