// ============================================
// Value Codec - Значение <-> байты записи
// ============================================
// Формат записи: JSON (serde_json).
// Битые записи не ошибка: считаем, что их нет.

use super::error::{StoreError, StoreResult};
use super::value::BlockValue;

/// Кодек значений блоков
pub struct ValueCodec;

impl ValueCodec {
    /// Закодировать значение. Непредставимые значения отклоняются.
    pub fn encode(value: &BlockValue) -> StoreResult<Vec<u8>> {
        if let Some(why) = value.find_unrepresentable() {
            return Err(StoreError::UnsupportedValue(why));
        }
        serde_json::to_vec(value).map_err(|e| StoreError::UnsupportedValue(e.to_string()))
    }

    /// Декодировать запись. Битые байты -> None.
    pub fn decode(bytes: &[u8]) -> Option<BlockValue> {
        match serde_json::from_slice::<BlockValue>(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring malformed block record ({} bytes): {}", bytes.len(), e);
                None
            }
        }
    }
}
