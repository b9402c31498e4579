// ============================================
// Keys - Ключи блоков, чанков и записей
// ============================================
// BlockPos - ключ кэша, ChunkKey - группа для выгрузки,
// record key - байтовый ключ записи в хранилище

/// Размер чанка по горизонтали
pub const CHUNK_SIZE: i32 = 16;

/// Префикс записи значения блока
pub const BLOCK_RECORD_TAG: u8 = 0x01;

/// Длина ключа записи: тег + 3 координаты по 4 байта
pub const RECORD_KEY_LEN: usize = 1 + 12;

/// Позиция блока в мире
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(arr: [i32; 3]) -> Self {
        Self { x: arr[0], y: arr[1], z: arr[2] }
    }

    /// Ключ чанка, которому принадлежит блок
    #[inline]
    pub fn chunk_key(&self) -> ChunkKey {
        ChunkKey::from_block_pos(self.x, self.z)
    }

    /// Ключ записи в хранилище: тег + big-endian координаты с инвертированным знаком.
    /// Порядок байт совпадает с числовым порядком координат.
    pub fn record_key(&self) -> [u8; RECORD_KEY_LEN] {
        let mut key = [0u8; RECORD_KEY_LEN];
        key[0] = BLOCK_RECORD_TAG;
        key[1..5].copy_from_slice(&ordered_bytes(self.x));
        key[5..9].copy_from_slice(&ordered_bytes(self.y));
        key[9..13].copy_from_slice(&ordered_bytes(self.z));
        key
    }

    /// Обратное преобразование ключа записи
    pub fn from_record_key(key: &[u8]) -> Option<Self> {
        if key.len() != RECORD_KEY_LEN || key[0] != BLOCK_RECORD_TAG {
            return None;
        }
        Some(Self {
            x: from_ordered_bytes(&key[1..5]),
            y: from_ordered_bytes(&key[5..9]),
            z: from_ordered_bytes(&key[9..13]),
        })
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from(arr: [i32; 3]) -> Self {
        Self::from_array(arr)
    }
}

#[inline]
fn ordered_bytes(v: i32) -> [u8; 4] {
    ((v as u32) ^ 0x8000_0000).to_be_bytes()
}

#[inline]
fn from_ordered_bytes(bytes: &[u8]) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    (u32::from_be_bytes(buf) ^ 0x8000_0000) as i32
}

/// Ключ чанка (координаты чанка 16x16)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    #[inline]
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Из мировых координат блока (эквивалентно x >> 4, z >> 4)
    #[inline]
    pub fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE),
            z: block_z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Содержит ли чанк данный блок
    #[inline]
    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.chunk_key() == *self
    }
}
