// ============================================
// Config - Настройки хранилища данных блоков
// ============================================
// Задаются один раз при инициализации, формат - JSON

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Корень хранилища по умолчанию (относительно директории хоста)
pub const DEFAULT_DATA_DIR: &str = "blockdata";

/// Ошибки загрузки конфига
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Настройки хранилища
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DataConfig {
    /// Удалять данные блока при его разрушении (break/explode/burn/decay)
    pub auto_cleanup: bool,
    /// Переопределение корня хранилища
    pub storage_root: Option<PathBuf>,
}

impl DataConfig {
    /// Загрузить из JSON строки
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Загрузить из файла. Нет файла - настройки по умолчанию.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Итоговый корень хранилища: переопределение или `<base>/blockdata`
    pub fn data_root(&self, base: impl AsRef<Path>) -> PathBuf {
        match &self.storage_root {
            Some(root) => root.clone(),
            None => base.as_ref().join(DEFAULT_DATA_DIR),
        }
    }
}
