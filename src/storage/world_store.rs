// ============================================
// World Store - Кэш данных блоков одного мира
// ============================================
//
// Три карты поверх KeyedStore:
// - cache:  BlockPos -> значение (только присутствующие, отсутствие не кэшируется)
// - dirty:  BlockPos -> отложенная операция (Put/Delete), последняя запись побеждает
// - chunks: ChunkKey -> позиции, увиденные в чанке (для выгрузки за O(размер чанка))
//
// Чтение: кэш, иначе read-through. Запись: сразу в кэш, в хранилище - батчем при flush.

use std::collections::{HashMap, HashSet};

use super::backend::{BatchOp, KeyedStore};
use super::codec::ValueCodec;
use super::error::StoreResult;
use super::keys::{BlockPos, ChunkKey};
use super::value::BlockValue;

/// Отложенная операция над блоком
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingOp {
    /// Уже закодированное значение
    Put(Vec<u8>),
    Delete,
}

impl PendingOp {
    fn to_batch(&self, pos: BlockPos) -> BatchOp {
        let key = pos.record_key().to_vec();
        match self {
            PendingOp::Put(value) => BatchOp::Put { key, value: value.clone() },
            PendingOp::Delete => BatchOp::Delete { key },
        }
    }
}

/// Снимок размеров карт и счётчиков I/O
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub cached_cells: usize,
    pub pending_writes: usize,
    pub tracked_chunks: usize,
    /// Точечные чтения из хранилища
    pub store_reads: u64,
    /// Отправленные батчи
    pub batch_writes: u64,
}

/// Кэш данных блоков одного мира.
/// Однопоточный: внешняя синхронизация, если нужна, на стороне вызывающего.
pub struct WorldStore<S: KeyedStore> {
    name: String,
    store: S,
    cache: HashMap<BlockPos, BlockValue>,
    dirty: HashMap<BlockPos, PendingOp>,
    chunks: HashMap<ChunkKey, HashSet<BlockPos>>,
    store_reads: u64,
    batch_writes: u64,
}

impl<S: KeyedStore> WorldStore<S> {
    pub fn new(name: impl Into<String>, store: S) -> Self {
        Self {
            name: name.into(),
            store,
            cache: HashMap::new(),
            dirty: HashMap::new(),
            chunks: HashMap::new(),
            store_reads: 0,
            batch_writes: 0,
        }
    }

    /// Имя мира
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Получить значение блока. Промах идёт в хранилище; найденное кэшируется,
    /// отсутствие - нет.
    pub fn get(&mut self, pos: BlockPos) -> StoreResult<Option<&BlockValue>> {
        if !self.cache.contains_key(&pos) {
            // Несброшенное удаление перекрывает то, что лежит на диске
            if matches!(self.dirty.get(&pos), Some(PendingOp::Delete)) {
                return Ok(None);
            }
            let Some(value) = self.read_through(pos)? else {
                return Ok(None);
            };
            self.track(pos);
            self.cache.insert(pos, value);
        }
        Ok(self.cache.get(&pos))
    }

    /// Есть ли значение у блока
    pub fn has(&mut self, pos: BlockPos) -> StoreResult<bool> {
        Ok(self.get(pos)?.is_some())
    }

    /// Установить значение. Непредставимое значение отклоняется до любых изменений.
    pub fn set(&mut self, pos: BlockPos, value: BlockValue) -> StoreResult<()> {
        let encoded = ValueCodec::encode(&value)?;

        self.cache.insert(pos, value);
        self.dirty.insert(pos, PendingOp::Put(encoded));
        self.track(pos);
        Ok(())
    }

    /// Удалить значение блока
    pub fn remove(&mut self, pos: BlockPos) {
        self.cache.remove(&pos);
        self.dirty.insert(pos, PendingOp::Delete);
        self.track(pos);
    }

    /// Завести (возможно пустую) запись индекса для загруженного чанка
    pub fn mark_chunk_loaded(&mut self, chunk: ChunkKey) {
        self.chunks.entry(chunk).or_default();
    }

    /// Сбросить все отложенные операции одним батчем.
    /// При ошибке dirty не трогается - можно повторить.
    pub fn flush_all(&mut self) -> StoreResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        let ops = self.dirty.iter().map(|(pos, op)| op.to_batch(*pos)).collect();
        self.submit(ops)?;

        log::trace!("Flushed {} pending writes in world '{}'", self.dirty.len(), self.name);
        self.dirty.clear();
        Ok(())
    }

    /// Сбросить отложенные операции только этого чанка
    pub fn flush_chunk(&mut self, chunk: ChunkKey) -> StoreResult<()> {
        let Some(cells) = self.chunks.get(&chunk) else {
            return Ok(());
        };

        let pending: Vec<BlockPos> = cells
            .iter()
            .filter(|pos| self.dirty.contains_key(*pos))
            .copied()
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let ops = pending
            .iter()
            .filter_map(|pos| self.dirty.get(pos).map(|op| op.to_batch(*pos)))
            .collect();
        self.submit(ops)?;

        for pos in &pending {
            self.dirty.remove(pos);
        }
        log::trace!(
            "Flushed {} pending writes of chunk ({}, {}) in world '{}'",
            pending.len(),
            chunk.x,
            chunk.z,
            self.name
        );
        Ok(())
    }

    /// Выкинуть чанк из памяти: кэш, dirty и индекс.
    /// Несброшенные записи чанка теряются.
    pub fn evict_chunk(&mut self, chunk: ChunkKey) {
        let Some(cells) = self.chunks.remove(&chunk) else {
            return;
        };

        let mut dropped = 0usize;
        for pos in &cells {
            self.cache.remove(pos);
            if self.dirty.remove(pos).is_some() {
                dropped += 1;
            }
        }

        if dropped > 0 {
            log::warn!(
                "Evicted chunk ({}, {}) in world '{}' with {} unflushed writes; they are lost",
                chunk.x,
                chunk.z,
                self.name,
                dropped
            );
        }
    }

    /// flush_chunk + evict_chunk. Выгрузка происходит всегда,
    /// ошибка сброса возвращается вызывающему.
    pub fn unload_chunk(&mut self, chunk: ChunkKey) -> StoreResult<()> {
        let flushed = self.flush_chunk(chunk);
        self.evict_chunk(chunk);
        flushed
    }

    /// Финальный сброс и закрытие хранилища. Карты освобождаются в любом случае.
    pub fn close(mut self) -> StoreResult<()> {
        let flushed = self.flush_all();
        if let Err(ref e) = flushed {
            log::error!(
                "Final flush of world '{}' failed, {} writes lost: {}",
                self.name,
                self.dirty.len(),
                e
            );
        }

        let WorldStore { name, store, .. } = self;
        let closed = store.close();
        log::info!("Closed block data for world '{}'", name);

        flushed.and(closed)
    }

    /// Размеры карт и счётчики I/O
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            cached_cells: self.cache.len(),
            pending_writes: self.dirty.len(),
            tracked_chunks: self.chunks.len(),
            store_reads: self.store_reads,
            batch_writes: self.batch_writes,
        }
    }

    /// Лежит ли значение в кэше (без обращения к хранилищу)
    pub fn contains_cached(&self, pos: BlockPos) -> bool {
        self.cache.contains_key(&pos)
    }

    /// Есть ли у блока несброшенная операция
    pub fn is_dirty(&self, pos: BlockPos) -> bool {
        self.dirty.contains_key(&pos)
    }

    /// Сколько позиций отслеживается в чанке
    pub fn tracked_in_chunk(&self, chunk: ChunkKey) -> Option<usize> {
        self.chunks.get(&chunk).map(HashSet::len)
    }

    fn read_through(&mut self, pos: BlockPos) -> StoreResult<Option<BlockValue>> {
        self.store_reads += 1;
        let Some(bytes) = self.store.get(&pos.record_key())? else {
            return Ok(None);
        };
        Ok(ValueCodec::decode(&bytes))
    }

    fn track(&mut self, pos: BlockPos) {
        self.chunks.entry(pos.chunk_key()).or_default().insert(pos);
    }

    fn submit(&mut self, ops: Vec<BatchOp>) -> StoreResult<()> {
        self.batch_writes += 1;
        self.store.write_batch(ops)
    }
}
