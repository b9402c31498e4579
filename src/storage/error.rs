// ============================================
// Store Errors - Ошибки хранилища
// ============================================

use thiserror::Error;

/// Ошибки хранилища данных блоков
#[derive(Debug, Error)]
pub enum StoreError {
    /// Не удалось создать директорию или открыть хранилище мира.
    /// Касается только этого мира, остальные продолжают работать.
    #[error("failed to open store at {path}: {message}")]
    StorageInit { path: String, message: String },

    /// Ошибка чтения или записи батча на уровне хранилища
    #[error("storage I/O failed during {op}: {message}")]
    Io { op: &'static str, message: String },

    /// Значение нельзя сохранить (null, NaN, бесконечность)
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// Мир не зарегистрирован (или уже выгружен)
    #[error("world '{0}' is not registered")]
    NotRegistered(String),
}

impl StoreError {
    pub(crate) fn io(op: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Io { op, message: err.to_string() }
    }

    pub(crate) fn init(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        StoreError::StorageInit {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
